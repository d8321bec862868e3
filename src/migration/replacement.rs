//! Replacement policies
//!
//! A replacement policy decides which local individuals are overwritten by
//! incoming migrants.

use std::cmp::Ordering;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, MigrationResult};
use crate::migration::migrant::Migrant;
use crate::population::individual::fitness_cmp;
use crate::population::population::PopulationView;
use crate::topology::graph::IslandId;

/// Outcome of one attempted replacement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedReplacement {
    /// Local population slot that was considered
    pub slot: usize,
    /// Island that exported the migrant
    pub source: IslandId,
    /// Whether the slot was overwritten
    pub replaced: bool,
    /// Fitness of the local individual before replacement
    pub previous_fitness: f64,
    /// Fitness of the migrant
    pub migrant_fitness: f64,
    /// Fitness improvement (`previous - migrant`), zero when not replaced
    pub delta: f64,
}

/// Decides which local individuals to overwrite with migrants
pub trait ReplacementPolicy: Send + Sync + Debug {
    /// Policy name
    fn name(&self) -> &'static str;

    /// Apply `migrants` to `population`, reporting every attempted slot
    fn replace(
        &self,
        population: &mut dyn PopulationView,
        migrants: Vec<Migrant>,
    ) -> MigrationResult<Vec<AppliedReplacement>>;
}

/// Fair replacement
///
/// Pairs the worst local individuals with the best migrants and replaces a
/// slot only when the migrant is strictly better. Ties are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FairReplacement;

impl FairReplacement {
    /// Create a fair replacement policy
    pub fn new() -> Self {
        Self
    }
}

impl ReplacementPolicy for FairReplacement {
    fn name(&self) -> &'static str {
        "fair"
    }

    fn replace(
        &self,
        population: &mut dyn PopulationView,
        mut migrants: Vec<Migrant>,
    ) -> MigrationResult<Vec<AppliedReplacement>> {
        let Some(dimension) = population.dimension() else {
            return Ok(Vec::new());
        };
        if let Some(bad) = migrants.iter().find(|m| m.dimension() != dimension) {
            return Err(MigrationError::DimensionMismatch {
                expected: dimension,
                actual: bad.dimension(),
            });
        }

        // Worst first; among equals the later index goes first.
        let mut slots: Vec<usize> = (0..population.len()).collect();
        slots.sort_by(|&a, &b| {
            fitness_cmp(population.fitness(b), population.fitness(a)).then(b.cmp(&a))
        });
        migrants.sort_by(|a, b| fitness_cmp(a.fitness(), b.fitness()));

        let mut applied = Vec::with_capacity(migrants.len().min(slots.len()));
        for (slot, migrant) in slots.into_iter().zip(migrants) {
            let previous = population.fitness(slot);
            let better = fitness_cmp(migrant.fitness(), previous) == Ordering::Less;
            let (genome, fitness, source) = migrant.into_parts();
            if better {
                population.replace(slot, genome, fitness)?;
            }
            applied.push(AppliedReplacement {
                slot,
                source,
                replaced: better,
                previous_fitness: previous,
                migrant_fitness: fitness,
                delta: if better { previous - fitness } else { 0.0 },
            });
        }
        Ok(applied)
    }
}
