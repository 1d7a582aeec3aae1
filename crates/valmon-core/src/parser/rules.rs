//! The ordered rule table.
//!
//! Predicates overlap (`" streams"` and `" locations"` are plain suffixes,
//! `"Rivers:"` is a plain substring), so table order is part of the
//! contract. New rules go where their predicate cannot shadow or be
//! shadowed by an earlier one.

use regex::Regex;

use super::{Extractor, Mutation, ParseRule, Predicate};
use crate::state::ServerState;

// Rule patterns are string literals; a failure here is a bug caught by any test run.
fn pattern(source: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|e| panic!("invalid rule pattern {source:?}: {e}"))
}

fn captures(sources: &[&str]) -> Extractor {
    Extractor::Captures(sources.iter().map(|s| pattern(s)).collect())
}

fn counter(
    id: &'static str,
    predicate: Predicate,
    source: &str,
    field: fn(&mut ServerState) -> &mut u32,
) -> ParseRule {
    ParseRule {
        id,
        predicate,
        extractor: captures(&[source]),
        mutation: Mutation::Counter(field),
    }
}

fn text(
    id: &'static str,
    predicate: Predicate,
    extractor: Extractor,
    field: fn(&mut ServerState) -> &mut Option<String>,
) -> ParseRule {
    ParseRule {
        id,
        predicate,
        extractor,
        mutation: Mutation::Text(field),
    }
}

fn custom(
    id: &'static str,
    predicate: Predicate,
    extractor: Extractor,
    apply: super::Apply,
) -> ParseRule {
    ParseRule {
        id,
        predicate,
        extractor,
        mutation: Mutation::Custom(apply),
    }
}

pub(super) fn build() -> Vec<ParseRule> {
    use Predicate::{Contains, EndsWith};

    vec![
        // Initialize engine version: 2019.4.20f1 (6dd1c08eedfa)
        text(
            "engine_version",
            Contains("Initialize engine version"),
            captures(&[r"version: ([0-9a-z\.]+)"]),
            |s| &mut s.engine_version,
        ),
        // Initializing world generator seed:WTwHcgt9uL ( -2014396962 )   menu:False  worldgen version:1
        custom(
            "world_generator",
            Contains("Initializing world generator"),
            captures(&[r"seed:([^)]+\))", r"worldgen version:([0-9]+)"]),
            |s, values, _| {
                s.world_seed = Some(values[0].to_string());
                s.world_gen_version = Some(values[1].to_string());
            },
        ),
        // Render threading mode:SingleThreaded
        text(
            "render_mode",
            Contains("Render threading mode"),
            Extractor::AfterLast(':'),
            |s| &mut s.render_threading_mode,
        ),
        // Get create world Sigfrej
        custom(
            "world_name",
            Contains("Get create world"),
            Extractor::AfterLast(' '),
            |s, values, _| s.world = values[0].to_string(),
        ),
        // Server ID 90071992547409920
        text(
            "server_id",
            Contains("Server ID"),
            Extractor::AfterLast(' '),
            |s| &mut s.server_id,
        ),
        custom(
            "steam_ready",
            Contains("Steam game server initialized"),
            Extractor::Flag,
            |s, _, _| s.is_steam_game_server_initialized = true,
        ),
        counter(
            "zonesystem",
            Contains("Zonesystem Awake"),
            r"Zonesystem Awake ([0-9]+)",
            |s| &mut s.zone_system,
        ),
        counter(
            "dungeon_db",
            Contains("DungeonDB Awake"),
            r"DungeonDB Awake ([0-9]+)",
            |s| &mut s.dungeon_db,
        ),
        counter(
            "mountain_distance",
            Contains("Using mountain distance"),
            r"Using mountain distance: ([0-9]+)",
            |s| &mut s.mountain_distance,
        ),
        // Found 556 mountain points
        counter(
            "mountain_points",
            EndsWith("mountain points"),
            r"Found ([0-9]+)",
            |s| &mut s.mountain_points,
        ),
        counter(
            "remaining_mountains",
            Contains("Remaining mountains"),
            r"Remaining mountains:([0-9]+)",
            |s| &mut s.remaining_mountains,
        ),
        counter(
            "lake_points",
            EndsWith("lake points"),
            r"Found ([0-9]+)",
            |s| &mut s.lake_points,
        ),
        counter(
            "remaining_lakes",
            Contains("Remaining lakes"),
            r"Remaining lakes:([0-9]+)",
            |s| &mut s.remaining_lakes,
        ),
        counter(
            "rivers",
            Contains("Rivers:"),
            r"Rivers:([0-9]+)",
            |s| &mut s.rivers,
        ),
        counter(
            "river_buckets",
            Contains("River buckets"),
            r"River buckets ([0-9]+)",
            |s| &mut s.river_buckets,
        ),
        // Placed 1883 streams
        counter(
            "streams_placed",
            EndsWith(" streams"),
            r"Placed ([0-9]+)",
            |s| &mut s.streams_placed,
        ),
        // Loaded 7115 locations
        counter(
            "locations_loaded",
            EndsWith(" locations"),
            r"Loaded ([0-9]+)",
            |s| &mut s.locations_loaded,
        ),
        custom(
            "game_server_connected",
            Contains("Game server connected"),
            Extractor::Flag,
            |s, _, _| s.mark_connected(),
        ),
        // World saved ( 597,4449ms )
        custom(
            "world_saved",
            Contains("World saved"),
            Extractor::Flag,
            |s, _, ctx| s.last_game_save = Some(ctx.now),
        ),
        // Time 392275,57418574, day:217    nextm:392670,000010729  skipspeed:32,8688187490528
        counter("day", Contains(", day:"), r"day:([0-9]+)", |s| &mut s.day),
        // Got connection SteamID 76561198000887816
        custom(
            "connection",
            Contains("Got connection SteamID"),
            captures(&[r"Got connection SteamID ([0-9]+)"]),
            |s, values, _| s.add_player(values[0]),
        ),
        // Recognised so no later rule claims it; carries nothing the snapshot keeps.
        custom(
            "handshake",
            Contains("Got handshake from client"),
            Extractor::Flag,
            |_, _, _| {},
        ),
        // VERSION check their:0.147.3  mine:0.147.3
        custom(
            "version_check",
            Contains("VERSION check"),
            captures(&[r"their:([0-9\.]+)"]),
            |s, values, _| {
                if let Some(player) = s.latest_player_mut() {
                    player.game_version = Some(values[0].to_string());
                } else {
                    tracing::debug!("version check without a connected session");
                }
            },
        ),
        // Got character ZDOID from Proud : 229722225:1
        custom(
            "character",
            Contains("Got character ZDOID from"),
            captures(&[r" : ([0-9:]+)", r"from (\S+)"]),
            |s, values, _| {
                if let Some(player) = s.latest_player_mut() {
                    player.character_zdoid = Some(values[0].to_string());
                    player.name = Some(values[1].to_string());
                } else {
                    tracing::debug!("character line without a connected session");
                }
            },
        ),
        // Closing socket 76561198000887816
        custom(
            "socket_closed",
            Contains("Closing socket"),
            captures(&[r"Closing socket ([0-9]+)"]),
            |s, values, _| {
                s.remove_players(values[0]);
            },
        ),
    ]
}
