//! Round protocol
//!
//! One [`RoundProtocol`] instance tracks a single migration round through
//! `Idle → Evolving → Exporting → Exchanging → Importing → RoundComplete`.
//! Only forward transitions to the next phase are legal.
//!
//! [`ExportGate`] is the barrier's enforcement point on the coordinator side:
//! exports run under a shared guard, and closing the gate waits for in-flight
//! exports before rejecting any that arrive late.

use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, MigrationResult};

/// Phase of a migration round
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundPhase {
    /// Round not started
    Idle,
    /// Islands run their local optimizers; no migration traffic
    Evolving,
    /// Islands push selected migrants to their outgoing neighbors
    Exporting,
    /// Barrier: every island has finished exporting
    Exchanging,
    /// Islands drain their pools and apply replacement
    Importing,
    /// Terminal state
    RoundComplete,
}

impl RoundPhase {
    /// The phase that legally follows this one
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Evolving),
            Self::Evolving => Some(Self::Exporting),
            Self::Exporting => Some(Self::Exchanging),
            Self::Exchanging => Some(Self::Importing),
            Self::Importing => Some(Self::RoundComplete),
            Self::RoundComplete => None,
        }
    }

    /// Whether the round has finished
    pub fn is_terminal(self) -> bool {
        self == Self::RoundComplete
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Evolving => "evolving",
            Self::Exporting => "exporting",
            Self::Exchanging => "exchanging",
            Self::Importing => "importing",
            Self::RoundComplete => "round-complete",
        };
        f.write_str(name)
    }
}

/// State machine for one round
#[derive(Clone, Debug)]
pub struct RoundProtocol {
    round: usize,
    phase: RoundPhase,
}

impl RoundProtocol {
    /// Start round `round` in [`RoundPhase::Idle`]
    pub fn new(round: usize) -> Self {
        Self {
            round,
            phase: RoundPhase::Idle,
        }
    }

    /// Round number
    pub fn round(&self) -> usize {
        self.round
    }

    /// Current phase
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Move to `to`, which must be the phase directly after the current one
    pub fn advance(&mut self, to: RoundPhase) -> MigrationResult<()> {
        if self.phase.next() != Some(to) {
            return Err(MigrationError::ProtocolViolation {
                round: self.round,
                from: self.phase.to_string(),
                to: to.to_string(),
            });
        }
        tracing::trace!(round = self.round, from = %self.phase, to = %to, "round phase");
        self.phase = to;
        Ok(())
    }
}

/// Admission control for exports within one round
#[derive(Debug)]
pub struct ExportGate {
    open: RwLock<bool>,
}

impl ExportGate {
    /// An open gate
    pub fn new() -> Self {
        Self {
            open: RwLock::new(true),
        }
    }

    /// Run `export` if the gate is still open
    ///
    /// Returns `None` without running it once the gate has closed. Closing
    /// waits for every export already admitted.
    pub fn admit<T>(&self, export: impl FnOnce() -> T) -> Option<T> {
        let open = self.open.read();
        if *open {
            Some(export())
        } else {
            None
        }
    }

    /// Close the gate, waiting for admitted exports to finish
    pub fn close(&self) {
        *self.open.write() = false;
    }

    /// Whether exports are still admitted
    pub fn is_open(&self) -> bool {
        *self.open.read()
    }
}

impl Default for ExportGate {
    fn default() -> Self {
        Self::new()
    }
}
