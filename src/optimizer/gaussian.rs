//! Gaussian perturbation search
//!
//! A minimal optimizer: every generation, each individual is perturbed with
//! per-gene Gaussian noise, clamped to the objective's bounds and replaced
//! when the perturbed copy is strictly better.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::OptimizerError;
use crate::optimizer::objective::Objective;
use crate::optimizer::Optimizer;
use crate::population::individual::Individual;
use crate::population::population::{Population, PopulationView};

/// Greedy Gaussian perturbation search over an [`Objective`]
#[derive(Clone, Debug)]
pub struct GaussianSearch<O> {
    objective: O,
    sigma: f64,
    mutation_probability: Option<f64>,
    seed: Option<u64>,
    rng: Option<StdRng>,
    evaluations: usize,
}

impl<O: Objective> GaussianSearch<O> {
    /// Create a search with noise standard deviation `sigma`
    pub fn new(objective: O, sigma: f64) -> Self {
        Self {
            objective,
            sigma,
            mutation_probability: None,
            seed: None,
            rng: None,
            evaluations: 0,
        }
    }

    /// Seed the random number generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.rng = None;
        self
    }

    /// Set a fixed mutation probability per gene (default `1 / dimension`)
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.mutation_probability = Some(probability);
        self
    }

    /// The objective being minimized
    pub fn objective(&self) -> &O {
        &self.objective
    }

    fn rng(&mut self) -> &mut StdRng {
        let seed = self.seed;
        self.rng.get_or_insert_with(|| match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        })
    }

    fn evaluate(&mut self, x: &[f64]) -> Result<f64, OptimizerError> {
        self.evaluations += 1;
        let f = self.objective.evaluate(x);
        if f.is_nan() {
            return Err(OptimizerError::EvaluationFailed(format!(
                "{} returned NaN",
                self.objective.name()
            )));
        }
        Ok(f)
    }
}

impl<O: Objective> Optimizer for GaussianSearch<O> {
    fn name(&self) -> &str {
        "gaussian-search"
    }

    fn initialize(&mut self, size: usize) -> Result<Population, OptimizerError> {
        if size == 0 {
            return Err(OptimizerError::EmptyPopulation);
        }
        let (lo, hi) = self.objective.bounds();
        let dimension = self.objective.dimension();
        let mut individuals = Vec::with_capacity(size);
        for _ in 0..size {
            let rng = self.rng();
            let genome: Vec<f64> = (0..dimension).map(|_| rng.gen_range(lo..=hi)).collect();
            let fitness = self.evaluate(&genome)?;
            individuals.push(Individual::new(genome, fitness));
        }
        Ok(individuals.into_iter().collect())
    }

    fn evolve(&mut self, population: &mut Population, budget: usize) -> Result<(), OptimizerError> {
        let normal = Normal::new(0.0, self.sigma)
            .map_err(|e| OptimizerError::EvolutionFailed(e.to_string()))?;
        let (lo, hi) = self.objective.bounds();

        for _ in 0..budget {
            for i in 0..population.len() {
                let mut candidate = population.genome(i).to_vec();
                let prob = self
                    .mutation_probability
                    .unwrap_or(1.0 / candidate.len().max(1) as f64);
                let rng = self.rng();
                for gene in candidate.iter_mut() {
                    if rng.gen::<f64>() < prob {
                        *gene = (*gene + normal.sample(rng)).clamp(lo, hi);
                    }
                }
                let fitness = self.evaluate(&candidate)?;
                if fitness < population.fitness(i) {
                    population
                        .replace(i, candidate, fitness)
                        .map_err(|e| OptimizerError::EvolutionFailed(e.to_string()))?;
                }
            }
        }
        Ok(())
    }

    fn reseed(&mut self, seed: u64) {
        self.seed = Some(seed);
        self.rng = None;
    }

    fn evaluations(&self) -> usize {
        self.evaluations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::objective::Sphere;

    #[test]
    fn test_initialize_within_bounds() {
        let mut search = GaussianSearch::new(Sphere::new(3), 0.5).with_seed(1);
        let pop = search.initialize(10).unwrap();
        assert_eq!(pop.len(), 10);
        assert_eq!(search.evaluations(), 10);
        for ind in pop.iter() {
            assert_eq!(ind.dimension(), 3);
            assert!(ind.genome.iter().all(|g| (-5.12..=5.12).contains(g)));
        }
    }

    #[test]
    fn test_evolve_never_worsens_champion() {
        let mut search = GaussianSearch::new(Sphere::new(4), 0.3).with_seed(2);
        let mut pop = search.initialize(8).unwrap();
        let before = pop.champion_fitness().unwrap();
        search.evolve(&mut pop, 20).unwrap();
        let after = pop.champion_fitness().unwrap();
        assert!(after <= before);
        assert_eq!(search.evaluations(), 8 + 8 * 20);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            let mut search = GaussianSearch::new(Sphere::new(2), 0.3).with_seed(5);
            let mut pop = search.initialize(4).unwrap();
            search.evolve(&mut pop, 5).unwrap();
            pop
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut search = GaussianSearch::new(Sphere::new(2), 0.3);
        assert_eq!(search.initialize(0), Err(OptimizerError::EmptyPopulation));
    }
}
