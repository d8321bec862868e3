//! Individual type
//!
//! A candidate solution: a real-valued decision vector with its scalar fitness.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// An individual in a population
///
/// Fitness is minimized: lower values are better.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Decision vector
    pub genome: Vec<f64>,
    /// Objective value (lower is better)
    pub fitness: f64,
}

impl Individual {
    /// Create a new individual
    pub fn new(genome: Vec<f64>, fitness: f64) -> Self {
        Self { genome, fitness }
    }

    /// Dimensionality of the decision vector
    pub fn dimension(&self) -> usize {
        self.genome.len()
    }

    /// Check if this individual is strictly better than another
    pub fn is_better_than(&self, other: &Self) -> bool {
        fitness_cmp(self.fitness, other.fitness) == Ordering::Less
    }

    /// Take the genome out of this individual
    pub fn into_genome(self) -> Vec<f64> {
        self.genome
    }
}

/// Total order on fitness values, best (lowest) first
///
/// NaN sorts after every number so it is never preferred.
pub fn fitness_cmp(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_individual_new() {
        let ind = Individual::new(vec![1.0, 2.0, 3.0], 4.5);
        assert_eq!(ind.dimension(), 3);
        assert_eq!(ind.fitness, 4.5);
    }

    #[test]
    fn test_is_better_than_minimizes() {
        let a = Individual::new(vec![0.0], 1.0);
        let b = Individual::new(vec![0.0], 2.0);
        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
        assert!(!a.is_better_than(&a.clone()));
    }

    #[test]
    fn test_fitness_cmp_nan_is_worst() {
        assert_eq!(fitness_cmp(f64::NAN, 1e300), Ordering::Greater);
        assert_eq!(fitness_cmp(f64::INFINITY, f64::NAN), Ordering::Less);
        assert_eq!(fitness_cmp(-0.0, 0.0), Ordering::Less);
    }

    #[test]
    fn test_serialization() {
        let ind = Individual::new(vec![1.5, -2.0], 0.25);
        let json = serde_json::to_string(&ind).unwrap();
        let back: Individual = serde_json::from_str(&json).unwrap();
        assert_eq!(ind, back);
    }
}
