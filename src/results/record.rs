//! Run records
//!
//! The append-only summary written once at the end of a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::population::individual::fitness_cmp;
use crate::topology::graph::IslandId;

/// Best individual of one island at the end of a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    /// Island the champion lives on
    pub island: IslandId,
    /// Decision vector
    pub genome: Vec<f64>,
    /// Fitness (lower is better)
    pub fitness: f64,
}

/// Per-island champions ordered best first, with their min and mean
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChampionSummary {
    champions: Vec<Champion>,
    min: Option<f64>,
    mean: Option<f64>,
}

impl ChampionSummary {
    /// Sort `champions` ascending by fitness and compute min and mean
    pub fn new(mut champions: Vec<Champion>) -> Self {
        champions.sort_by(|a, b| fitness_cmp(a.fitness, b.fitness));
        let min = champions.first().map(|c| c.fitness);
        let mean = if champions.is_empty() {
            None
        } else {
            Some(champions.iter().map(|c| c.fitness).sum::<f64>() / champions.len() as f64)
        };
        Self {
            champions,
            min,
            mean,
        }
    }

    /// Champions, best first
    pub fn champions(&self) -> &[Champion] {
        &self.champions
    }

    /// Global best
    pub fn best(&self) -> Option<&Champion> {
        self.champions.first()
    }

    /// Fitness of the global best
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Mean of the per-island best fitness values
    pub fn mean(&self) -> Option<f64> {
        self.mean
    }

    /// Number of champions
    pub fn len(&self) -> usize {
        self.champions.len()
    }

    /// Whether there are no champions
    pub fn is_empty(&self) -> bool {
        self.champions.is_empty()
    }
}

/// One completed run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Benchmark or experiment name
    pub benchmark: String,
    /// Unique run identifier
    pub run_id: Uuid,
    /// Monitoring domain the run reported under
    pub metric_id: String,
    /// Free-form description
    pub description: String,
    /// Suite the run belongs to, for correlating related runs
    pub suite_run_id: Option<String>,
    /// Topology identifier
    pub topology_id: String,
    /// Topology generator label
    pub topology_label: String,
    /// Rounds completed
    pub rounds: usize,
    /// Generations per round
    pub generations: usize,
    /// Champions, best first
    pub champions: Vec<Champion>,
    /// Best champion fitness
    pub min_score: Option<f64>,
    /// Mean champion fitness
    pub average_score: Option<f64>,
    /// Whether champions were scored on a validation set
    pub validation_mode: bool,
    /// Number of validation points
    pub validation_points: usize,
    /// Run start
    pub time_start: DateTime<Utc>,
    /// Run end
    pub time_end: DateTime<Utc>,
}

impl RunRecord {
    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.time_end - self.time_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn champion(island: &str, fitness: f64) -> Champion {
        Champion {
            island: IslandId::from(island),
            genome: vec![fitness],
            fitness,
        }
    }

    #[test]
    fn test_summary_sorts_and_aggregates() {
        let summary = ChampionSummary::new(vec![
            champion("a", 3.0),
            champion("b", 1.0),
            champion("c", 2.0),
        ]);
        let order: Vec<&str> = summary.champions().iter().map(|c| c.island.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(summary.min(), Some(1.0));
        assert_eq!(summary.mean(), Some(2.0));
        assert_eq!(summary.best().map(|c| c.fitness), Some(1.0));
    }

    #[test]
    fn test_empty_summary() {
        let summary = ChampionSummary::new(Vec::new());
        assert!(summary.is_empty());
        assert_eq!(summary.min(), None);
        assert_eq!(summary.mean(), None);
    }
}
