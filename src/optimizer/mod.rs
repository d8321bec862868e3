//! Optimizer boundary
//!
//! The algorithm running inside an island is a black box to migration: it
//! builds an initial population and evolves it for a generation budget. The
//! island owns the population between rounds, so getting and setting it is
//! just handing out the island's [`Population`].

pub mod gaussian;
pub mod objective;

use crate::error::OptimizerError;
use crate::population::population::Population;

/// Optimizer executed inside an island
pub trait Optimizer: Send {
    /// Algorithm name
    fn name(&self) -> &str;

    /// Build the island's initial population of `size` individuals
    fn initialize(&mut self, size: usize) -> Result<Population, OptimizerError>;

    /// Evolve `population` in place for `budget` generations
    fn evolve(&mut self, population: &mut Population, budget: usize) -> Result<(), OptimizerError>;

    /// Objective evaluations performed so far
    fn evaluations(&self) -> usize;

    /// Restart the random stream from `seed`
    ///
    /// Called once per island when one configuration is cloned into many;
    /// deterministic optimizers can ignore it.
    fn reseed(&mut self, _seed: u64) {}
}

pub mod prelude {
    pub use super::gaussian::*;
    pub use super::objective::*;
    pub use super::Optimizer;
}
