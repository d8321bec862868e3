//! Population type
//!
//! This module provides the population container and the [`PopulationView`]
//! contract that migration policies operate on.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, MigrationResult};
use crate::population::individual::{fitness_cmp, Individual};

/// The view of an island's population that migration needs
///
/// An ordered sequence of individuals with constant dimensionality. The only
/// mutation is in-place replacement of one individual; no insertion or removal.
pub trait PopulationView {
    /// Number of individuals
    fn len(&self) -> usize;

    /// Whether the population is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decision vector dimensionality, `None` for an empty population
    fn dimension(&self) -> Option<usize>;

    /// Decision vector at `index`
    fn genome(&self, index: usize) -> &[f64];

    /// Fitness at `index`
    fn fitness(&self, index: usize) -> f64;

    /// Replace the individual at `index`
    fn replace(&mut self, index: usize, genome: Vec<f64>, fitness: f64) -> MigrationResult<()>;
}

/// A population of individuals
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a population from a vector of individuals
    ///
    /// Fails if the individuals do not share one dimensionality.
    pub fn from_individuals(individuals: Vec<Individual>) -> MigrationResult<Self> {
        if let Some(first) = individuals.first() {
            let expected = first.dimension();
            if let Some(bad) = individuals.iter().find(|i| i.dimension() != expected) {
                return Err(MigrationError::DimensionMismatch {
                    expected,
                    actual: bad.dimension(),
                });
            }
        }
        Ok(Self { individuals })
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get an individual by index
    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// Get the underlying slice of individuals
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Take the individuals out of this population
    pub fn into_individuals(self) -> Vec<Individual> {
        self.individuals
    }

    /// Index of the best individual, ties broken by lowest index
    pub fn champion_index(&self) -> Option<usize> {
        self.individuals
            .iter()
            .enumerate()
            .min_by(|(ia, a), (ib, b)| fitness_cmp(a.fitness, b.fitness).then(ia.cmp(ib)))
            .map(|(i, _)| i)
    }

    /// The best individual in the population
    pub fn champion(&self) -> Option<&Individual> {
        self.champion_index().map(|i| &self.individuals[i])
    }

    /// Fitness of the best individual
    pub fn champion_fitness(&self) -> Option<f64> {
        self.champion().map(|c| c.fitness)
    }

    /// Mean fitness of the population
    pub fn mean_fitness(&self) -> Option<f64> {
        if self.individuals.is_empty() {
            return None;
        }
        let sum: f64 = self.individuals.iter().map(|i| i.fitness).sum();
        Some(sum / self.individuals.len() as f64)
    }
}

impl PopulationView for Population {
    fn len(&self) -> usize {
        Population::len(self)
    }

    fn dimension(&self) -> Option<usize> {
        self.individuals.first().map(Individual::dimension)
    }

    fn genome(&self, index: usize) -> &[f64] {
        &self.individuals[index].genome
    }

    fn fitness(&self, index: usize) -> f64 {
        self.individuals[index].fitness
    }

    fn replace(&mut self, index: usize, genome: Vec<f64>, fitness: f64) -> MigrationResult<()> {
        let len = self.individuals.len();
        let expected = self.dimension();
        let slot = self
            .individuals
            .get_mut(index)
            .ok_or(MigrationError::IndexOutOfBounds { index, len })?;
        if let Some(expected) = expected {
            if genome.len() != expected {
                return Err(MigrationError::DimensionMismatch {
                    expected,
                    actual: genome.len(),
                });
            }
        }
        slot.genome = genome;
        slot.fitness = fitness;
        Ok(())
    }
}

impl Index<usize> for Population {
    type Output = Individual;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<T: IntoIterator<Item = Individual>>(iter: T) -> Self {
        Self {
            individuals: iter.into_iter().collect(),
        }
    }
}
