//! The supervisor's own interrupt policy.
//!
//! While the gate is open, an operator Ctrl+C becomes a stop request. While
//! an [`InterruptShield`] is alive (the stop protocol's signal-and-wait
//! window) interrupts are swallowed instead, so the supervisor cannot be
//! torn down by the interrupt it is orchestrating.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct GateInner {
    shields: AtomicUsize,
    suppressed: AtomicU64,
}

/// Shared interrupt policy; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct InterruptGate {
    inner: Arc<GateInner>,
}

impl InterruptGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress interrupts until the returned guard drops.
    pub fn shield(&self) -> InterruptShield {
        self.inner.shields.fetch_add(1, Ordering::SeqCst);
        InterruptShield { gate: self.clone() }
    }

    pub fn is_shielded(&self) -> bool {
        self.inner.shields.load(Ordering::SeqCst) > 0
    }

    /// Interrupts swallowed so far.
    pub fn suppressed_count(&self) -> u64 {
        self.inner.suppressed.load(Ordering::SeqCst)
    }

    /// Classify an interrupt received by this process.
    ///
    /// Returns `true` when it should be handled normally (as a stop request).
    pub fn admit(&self) -> bool {
        if self.is_shielded() {
            self.inner.suppressed.fetch_add(1, Ordering::SeqCst);
            info!("Interrupt suppressed while the game server is stopping");
            false
        } else {
            true
        }
    }

    /// Listen for Ctrl+C and forward admitted interrupts as stop requests.
    ///
    /// Must be called inside a tokio runtime. Once installed, Ctrl+C no
    /// longer terminates the supervisor directly.
    pub fn listen(&self) -> mpsc::UnboundedReceiver<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        let gate = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Unable to listen for Ctrl+C");
                    break;
                }
                if gate.admit() && tx.send(()).is_err() {
                    break;
                }
            }
        });
        rx
    }
}

/// Guard returned by [`InterruptGate::shield`]; dropping it restores normal handling.
#[derive(Debug)]
pub struct InterruptShield {
    gate: InterruptGate,
}

impl Drop for InterruptShield {
    fn drop(&mut self) {
        self.gate.inner.shields.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_gate_admits() {
        let gate = InterruptGate::new();
        assert!(!gate.is_shielded());
        assert!(gate.admit());
        assert_eq!(gate.suppressed_count(), 0);
    }

    #[test]
    fn shield_suppresses_until_dropped() {
        let gate = InterruptGate::new();
        let shield = gate.shield();
        assert!(gate.is_shielded());
        assert!(!gate.admit());
        assert_eq!(gate.suppressed_count(), 1);

        drop(shield);
        assert!(!gate.is_shielded());
        assert!(gate.admit());
    }

    #[test]
    fn nested_shields() {
        let gate = InterruptGate::new();
        let outer = gate.shield();
        let inner = gate.clone().shield();
        drop(outer);
        assert!(gate.is_shielded());
        drop(inner);
        assert!(!gate.is_shielded());
    }
}
