//! Error types for archipelago-evo
//!
//! This module defines all error types used throughout the library.

use std::fmt;

use thiserror::Error;

use crate::round::protocol::RoundPhase;

/// Protocol phase in which a pool lookup failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolPhase {
    /// Migrant push from a source island
    Push,
    /// Drain-and-replace on the destination island
    Pull,
    /// Pool cleared for an island that did not import
    Clear,
    /// Capacity (re)declaration
    Define,
}

impl fmt::Display for PoolPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Push => "push",
            Self::Pull => "pull",
            Self::Clear => "clear",
            Self::Define => "define",
        };
        f.write_str(name)
    }
}

/// Error reported by an optimizer running inside an island
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizerError {
    /// Evolution could not complete its generation budget
    #[error("Evolution failed: {0}")]
    EvolutionFailed(String),

    /// The objective could not be evaluated
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    /// The optimizer was asked to build an empty population
    #[error("Population size must be positive")]
    EmptyPopulation,
}

/// Top-level error type for migration coordination
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Mutually exclusive or missing options, unknown names, bad parameters
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Push/pull against an island that has no pool
    #[error("Unknown destination island {island} during {phase}")]
    UnknownDestination { island: String, phase: PoolPhase },

    /// `define_pools` was called on a coordinator that already has pools
    #[error("Migrant pools are already defined")]
    PoolsAlreadyDefined,

    /// Structural topology error
    #[error("Topology error: {0}")]
    Topology(String),

    /// An island's optimizer failed during a round
    #[error("Island {island} failed in round {round}: {reason}")]
    IslandFailure {
        island: String,
        round: usize,
        reason: String,
    },

    /// A fatal error raised on behalf of one island
    #[error("Island {island} aborted round {round} while {phase}: {source}")]
    Island {
        island: String,
        round: usize,
        phase: RoundPhase,
        #[source]
        source: Box<MigrationError>,
    },

    /// The barrier was not reached within the configured bound
    #[error(
        "Round {round} timed out waiting for {} island(s): {}",
        .pending.len(),
        .pending.join(", ")
    )]
    RoundTimeout { round: usize, pending: Vec<String> },

    /// Illegal round state transition
    #[error("Round {round}: illegal transition {from} -> {to}")]
    ProtocolViolation {
        round: usize,
        from: String,
        to: String,
    },

    /// Migrant vector does not match the population's dimensionality
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Replacement targeted a slot outside the population
    #[error("Index {index} out of bounds for population of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// IO error while persisting results
    #[error("IO error: {0}")]
    Persistence(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MigrationError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Shorthand for an unknown destination error
    pub fn unknown_destination(island: impl fmt::Display, phase: PoolPhase) -> Self {
        Self::UnknownDestination {
            island: island.to_string(),
            phase,
        }
    }

    /// Attach the island, round and phase an error was raised in
    ///
    /// Errors that already name their island are returned unchanged.
    pub fn in_island(self, island: impl fmt::Display, round: usize, phase: RoundPhase) -> Self {
        match self {
            Self::Island { .. } | Self::IslandFailure { .. } | Self::RoundTimeout { .. } => self,
            other => Self::Island {
                island: island.to_string(),
                round,
                phase,
                source: Box::new(other),
            },
        }
    }

    /// Whether the error must abort the run
    ///
    /// Island failures are recovered by the round driver; everything else is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::IslandFailure { .. })
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_destination_display() {
        let err = MigrationError::unknown_destination("island-7", PoolPhase::Push);
        assert_eq!(
            err.to_string(),
            "Unknown destination island island-7 during push"
        );
    }

    #[test]
    fn test_round_timeout_display() {
        let err = MigrationError::RoundTimeout {
            round: 3,
            pending: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Round 3 timed out waiting for 2 island(s): a, b"
        );
    }

    #[test]
    fn test_island_failure_is_not_fatal() {
        let err = MigrationError::IslandFailure {
            island: "x".to_string(),
            round: 1,
            reason: "diverged".to_string(),
        };
        assert!(!err.is_fatal());
        assert!(MigrationError::PoolsAlreadyDefined.is_fatal());
        assert!(MigrationError::config("bad").is_fatal());
    }

    #[test]
    fn test_in_island_adds_context_once() {
        let err = MigrationError::DimensionMismatch { expected: 2, actual: 3 }
            .in_island("x", 4, RoundPhase::Importing);
        assert_eq!(
            err.to_string(),
            "Island x aborted round 4 while importing: Dimension mismatch: expected 2, got 3"
        );
        assert!(err.is_fatal());
        assert!(std::error::Error::source(&err).is_some());

        let again = err.in_island("y", 5, RoundPhase::Exporting);
        assert!(matches!(
            again,
            MigrationError::Island { ref island, round: 4, .. } if island == "x"
        ));
    }

    #[test]
    fn test_optimizer_error_display() {
        let err = OptimizerError::EvolutionFailed("nan in population".to_string());
        assert_eq!(err.to_string(), "Evolution failed: nan in population");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: MigrationError = io.into();
        assert!(matches!(err, MigrationError::Persistence(_)));
    }
}
