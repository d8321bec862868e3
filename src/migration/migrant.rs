//! Migrant type

use serde::{Deserialize, Serialize};

use crate::topology::graph::IslandId;

/// A candidate solution in transit between islands
///
/// Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Migrant {
    genome: Vec<f64>,
    fitness: f64,
    source: IslandId,
}

impl Migrant {
    /// Create a migrant exported by `source`
    pub fn new(genome: Vec<f64>, fitness: f64, source: IslandId) -> Self {
        Self {
            genome,
            fitness,
            source,
        }
    }

    /// Decision vector
    pub fn genome(&self) -> &[f64] {
        &self.genome
    }

    /// Fitness (lower is better)
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Island that exported this migrant
    pub fn source(&self) -> &IslandId {
        &self.source
    }

    /// Decision vector dimensionality
    pub fn dimension(&self) -> usize {
        self.genome.len()
    }

    /// Split into genome, fitness and source
    pub fn into_parts(self) -> (Vec<f64>, f64, IslandId) {
        (self.genome, self.fitness, self.source)
    }
}
