//! Line parser: folds game-server output into a [`ServerState`].
//!
//! Each line is tested against an ordered list of rules. The first rule
//! whose predicate matches consumes the line: its extractor pulls the
//! values out of the text and its mutation writes them into the state.
//! Lines no rule matches leave the state untouched.
//!
//! Counters are overwritten, never accumulated; each reflects the most
//! recent matching line.

mod rules;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::ParseError;
use crate::state::{ServerState, StateStore};

static RULES: LazyLock<Vec<ParseRule>> = LazyLock::new(rules::build);

/// Source of the "now" timestamp recorded by time-stamped rules.
pub type Clock = fn() -> DateTime<Utc>;

/// Values available to mutations besides the extracted text.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext {
    pub now: DateTime<Utc>,
}

pub(crate) type Apply = fn(&mut ServerState, &[&str], &ParseContext);

/// Cheap textual test deciding whether a rule claims a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Contains(&'static str),
    EndsWith(&'static str),
}

impl Predicate {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Contains(needle) => line.contains(needle),
            Self::EndsWith(suffix) => line.ends_with(suffix),
        }
    }
}

#[derive(Debug)]
pub(crate) enum Extractor {
    /// The rule carries no value.
    Flag,
    /// Everything after the last occurrence of the delimiter (whole line if absent).
    AfterLast(char),
    /// First capture group of every pattern; all of them must match.
    Captures(Vec<Regex>),
}

impl Extractor {
    fn extract<'a>(&self, line: &'a str) -> Option<Vec<&'a str>> {
        match self {
            Self::Flag => Some(Vec::new()),
            Self::AfterLast(delimiter) => line.rsplit(*delimiter).next().map(|tail| vec![tail]),
            Self::Captures(patterns) => patterns
                .iter()
                .map(|re| re.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str()))
                .collect(),
        }
    }
}

pub(crate) enum Mutation {
    Text(fn(&mut ServerState) -> &mut Option<String>),
    Counter(fn(&mut ServerState) -> &mut u32),
    Custom(Apply),
}

/// One entry of the rule chain.
pub struct ParseRule {
    pub id: &'static str,
    pub predicate: Predicate,
    extractor: Extractor,
    mutation: Mutation,
}

impl ParseRule {
    fn apply(
        &self,
        state: &mut ServerState,
        line: &str,
        ctx: &ParseContext,
    ) -> Result<(), ParseError> {
        let Some(values) = self.extractor.extract(line) else {
            tracing::debug!(rule = self.id, line, "rule matched but extraction failed");
            return Ok(());
        };

        match self.mutation {
            Mutation::Text(field) => {
                if let Some(value) = values.first() {
                    *field(state) = Some((*value).to_string());
                }
            }
            Mutation::Counter(field) => {
                if let Some(value) = values.first() {
                    let parsed = value.parse::<u32>().map_err(|_| ParseError::Numeric {
                        rule: self.id,
                        value: (*value).to_string(),
                    })?;
                    *field(state) = parsed;
                }
            }
            Mutation::Custom(apply) => apply(state, &values, ctx),
        }
        Ok(())
    }
}

impl std::fmt::Debug for ParseRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseRule")
            .field("id", &self.id)
            .field("predicate", &self.predicate)
            .finish_non_exhaustive()
    }
}

/// Rule ids in evaluation order.
pub fn rules() -> Vec<&'static str> {
    RULES.iter().map(|r| r.id).collect()
}

/// First-match evaluator over the static rule table.
#[derive(Debug, Clone, Copy)]
pub struct LineParser {
    clock: Clock,
}

impl Default for LineParser {
    fn default() -> Self {
        Self { clock: Utc::now }
    }
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser whose time-stamped rules read `clock` instead of the wall clock.
    pub const fn with_clock(clock: Clock) -> Self {
        Self { clock }
    }

    /// The rule that would consume `line`, if any.
    pub fn matching_rule(&self, line: &str) -> Option<&'static ParseRule> {
        RULES.iter().find(|r| r.predicate.matches(line))
    }

    /// Apply `line` to `state`, returning the id of the rule that consumed it.
    ///
    /// On `Err` the state is unchanged.
    pub fn apply(
        &self,
        state: &mut ServerState,
        line: &str,
    ) -> Result<Option<&'static str>, ParseError> {
        let Some(rule) = self.matching_rule(line) else {
            return Ok(None);
        };
        let ctx = ParseContext {
            now: (self.clock)(),
        };
        rule.apply(state, line, &ctx)?;
        Ok(Some(rule.id))
    }

    /// Apply `line` to the shared store as one atomic update.
    pub fn ingest(
        &self,
        store: &StateStore,
        line: &str,
    ) -> Result<Option<&'static str>, ParseError> {
        store.update(|state| self.apply(state, line))
    }
}
