//! Selection policies
//!
//! A selection policy decides which individuals an island exports.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, MigrationResult};
use crate::migration::migrant::Migrant;
use crate::population::individual::fitness_cmp;
use crate::population::population::PopulationView;
use crate::topology::graph::IslandId;

/// Chooses the migrants an island exports
pub trait SelectionPolicy: Send + Sync + Debug {
    /// Policy name
    fn name(&self) -> &'static str;

    /// Select migrants from `population`, tagged with `source`
    ///
    /// The result is ordered best to worst.
    fn select(&self, population: &dyn PopulationView, source: &IslandId) -> Vec<Migrant>;
}

/// How many individuals a selection takes
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrantQuota {
    /// A fixed number of individuals
    Count(usize),
    /// `floor(population_size * fraction)` individuals
    Fraction(f64),
}

impl MigrantQuota {
    /// Number of migrants for a population of `len`
    pub fn resolve(&self, len: usize) -> usize {
        match *self {
            Self::Count(n) => n.min(len),
            Self::Fraction(f) => ((len as f64) * f).floor() as usize,
        }
    }
}

/// Population indices ordered best first, ties by original index
pub fn rank_ascending(population: &dyn PopulationView) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..population.len()).collect();
    indices.sort_by(|&a, &b| {
        fitness_cmp(population.fitness(a), population.fitness(b)).then(a.cmp(&b))
    });
    indices
}

/// Best-N selection
///
/// Exports the best individuals by fitness. Single objective only.
#[derive(Clone, Debug, PartialEq)]
pub struct BestSelection {
    quota: MigrantQuota,
}

impl BestSelection {
    /// Select a fixed number of individuals
    pub fn count(n: usize) -> Self {
        Self {
            quota: MigrantQuota::Count(n),
        }
    }

    /// Select a fraction of the population
    pub fn fraction(fraction: f64) -> MigrationResult<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(MigrationError::config(format!(
                "selection fraction must be in [0, 1], got {fraction}"
            )));
        }
        Ok(Self {
            quota: MigrantQuota::Fraction(fraction),
        })
    }

    /// Build from optional count and fraction; exactly one must be given
    pub fn from_options(count: Option<usize>, fraction: Option<f64>) -> MigrationResult<Self> {
        match (count, fraction) {
            (Some(n), None) => Ok(Self::count(n)),
            (None, Some(f)) => Self::fraction(f),
            (Some(_), Some(_)) => Err(MigrationError::config(
                "specify either selection count or selection fraction, not both",
            )),
            (None, None) => Err(MigrationError::config(
                "specify either selection count or selection fraction",
            )),
        }
    }

    /// The configured quota
    pub fn quota(&self) -> MigrantQuota {
        self.quota
    }
}

impl SelectionPolicy for BestSelection {
    fn name(&self) -> &'static str {
        "best"
    }

    fn select(&self, population: &dyn PopulationView, source: &IslandId) -> Vec<Migrant> {
        let take = self.quota.resolve(population.len());
        rank_ascending(population)
            .into_iter()
            .take(take)
            .map(|i| {
                Migrant::new(
                    population.genome(i).to_vec(),
                    population.fitness(i),
                    source.clone(),
                )
            })
            .collect()
    }
}
