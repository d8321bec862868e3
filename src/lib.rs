//! # archipelago-evo
//!
//! Island-model migration coordination for population-based optimizers.
//!
//! Independent optimizers ("islands") each evolve their own population and
//! periodically exchange individuals ("migrants") along the edges of a
//! topology. This crate provides the pieces that make that exchange
//! deterministic under concurrency:
//!
//! - **Topologies**: rings, chains, lollipops, rims, stars, complete graphs,
//!   hypercubes and randomized families, built by a factory that pairs every
//!   node with an island.
//! - **Policies**: best-N selection on export, fair replacement on import.
//! - **Coordinator**: one bounded, best-keeping migrant pool per destination,
//!   safe under concurrent pushes.
//! - **Round driver**: evolve, export, barrier, import; repeated for N rounds
//!   with failure and timeout handling, monitoring and a results record.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use archipelago_evo::prelude::*;
//! use std::sync::Arc;
//!
//! let factory = TopologyFactory::new(20).with_seed(42);
//! let search = GaussianSearch::new(Rastrigin::new(10), 0.3);
//! let archipelago = factory.bidir_ring(8, &IslandConstructor::seeded(search, 7))?;
//!
//! let outcome = RoundDriver::builder(SequentialEngine)
//!     .selection(Arc::new(BestSelection::count(2)))
//!     .replacement(Arc::new(FairReplacement))
//!     .pool_capacity(4)
//!     .rounds(10)
//!     .generations(50)
//!     .build()?
//!     .run(archipelago)?;
//!
//! println!("best: {:?}", outcome.champions.min());
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod migration;
pub mod monitor;
pub mod optimizer;
pub mod population;
pub mod results;
pub mod round;
pub mod telemetry;
pub mod topology;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::execution::prelude::*;
    pub use crate::migration::prelude::*;
    pub use crate::monitor::prelude::*;
    pub use crate::optimizer::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::results::prelude::*;
    pub use crate::round::prelude::*;
    pub use crate::telemetry::{init_tracing, LogFormat};
    pub use crate::topology::prelude::*;
}
