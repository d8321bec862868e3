//! Round and run reports

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::migration::replacement::AppliedReplacement;
use crate::results::record::{ChampionSummary, RunRecord};
use crate::topology::graph::IslandId;

/// Outcome of one island in one round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum IslandStatus {
    /// Evolved, exported and imported
    Completed,
    /// The optimizer failed; the island skipped export and import
    Failed(String),
    /// A previous failure retired the island
    Retired,
}

impl IslandStatus {
    /// Short label used for monitoring
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed(_) => "failed",
            Self::Retired => "retired",
        }
    }

    /// Whether the island took part in migration
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for IslandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

/// One island's log entry for one round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IslandRoundLog {
    /// Round number, starting at 1
    pub round: usize,
    /// Island outcome
    pub status: IslandStatus,
    /// Champion fitness after import
    pub champion_fitness: Option<f64>,
    /// Every slot the replacement policy considered
    pub replacements: Vec<AppliedReplacement>,
    /// Migrants this island exported (per destination)
    pub exported: usize,
}

impl IslandRoundLog {
    /// Fitness improvements of the slots that were replaced
    pub fn deltas(&self) -> Vec<f64> {
        self.replacements
            .iter()
            .filter(|r| r.replaced)
            .map(|r| r.delta)
            .collect()
    }

    /// Source islands of the migrants that were accepted
    pub fn sources(&self) -> Vec<&IslandId> {
        self.replacements
            .iter()
            .filter(|r| r.replaced)
            .map(|r| &r.source)
            .collect()
    }

    /// Number of accepted migrants
    pub fn accepted(&self) -> usize {
        self.replacements.iter().filter(|r| r.replaced).count()
    }
}

/// Where an island's work ran
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInfo {
    /// Host name
    pub host: String,
    /// Worker thread name
    pub thread: String,
}

impl WorkerInfo {
    /// Describe the calling thread
    pub fn current() -> Self {
        let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let thread = std::thread::current()
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{:?}", std::thread::current().id()));
        Self { host, thread }
    }
}

/// Everything one island reports at the end of a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IslandResult {
    /// Island identifier
    pub island: IslandId,
    /// Worker that ran the island's last round
    pub worker: WorkerInfo,
    /// Per-round log
    pub log: Vec<IslandRoundLog>,
    /// Objective evaluations performed by the island's optimizer
    pub evaluations: usize,
}

impl IslandResult {
    /// Most recent log entry
    pub fn last(&self) -> Option<&IslandRoundLog> {
        self.log.last()
    }
}

/// Summary of one round across the archipelago
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number, starting at 1
    pub round: usize,
    /// Islands that completed the round
    pub completed: Vec<IslandId>,
    /// Islands whose optimizer failed this round
    pub failed: Vec<IslandId>,
    /// Retired islands that sat the round out
    pub retired: Vec<IslandId>,
    /// Islands dropped from the run for missing the deadline
    pub excluded: Vec<IslandId>,
    /// Migrants pushed to the coordinator
    pub migrants_pushed: usize,
    /// Migrants accepted by a replacement policy
    pub migrants_accepted: usize,
    /// Best champion fitness after import
    pub best_fitness: Option<f64>,
}

/// Result of a complete run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Run identifier
    pub run_id: Uuid,
    /// Topology identifier
    pub topology_id: String,
    /// Topology generator label
    pub topology_label: String,
    /// Rounds completed
    pub rounds: usize,
    /// Generations per round
    pub generations: usize,
    /// Per-island results, in topology order
    pub islands: Vec<IslandResult>,
    /// Per-round reports
    pub reports: Vec<RoundReport>,
    /// Islands dropped from the run
    pub excluded: Vec<IslandId>,
    /// Champions of the surviving islands
    pub champions: ChampionSummary,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    /// Build the persistent record of this run
    pub fn to_record(&self, benchmark: &str, metric_id: &str, description: &str) -> RunRecord {
        RunRecord {
            benchmark: benchmark.to_string(),
            run_id: self.run_id,
            metric_id: metric_id.to_string(),
            description: description.to_string(),
            suite_run_id: None,
            topology_id: self.topology_id.clone(),
            topology_label: self.topology_label.clone(),
            rounds: self.rounds,
            generations: self.generations,
            champions: self.champions.champions().to_vec(),
            min_score: self.champions.min(),
            average_score: self.champions.mean(),
            validation_mode: false,
            validation_points: 0,
            time_start: self.started_at,
            time_end: self.finished_at,
        }
    }

    /// Total objective evaluations across islands
    pub fn evaluations(&self) -> usize {
        self.islands.iter().map(|i| i.evaluations).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(source: &str, replaced: bool, delta: f64) -> AppliedReplacement {
        AppliedReplacement {
            slot: 0,
            source: IslandId::from(source),
            replaced,
            previous_fitness: 1.0,
            migrant_fitness: 1.0 - delta,
            delta,
        }
    }

    #[test]
    fn test_log_reports_only_accepted_migrants() {
        let log = IslandRoundLog {
            round: 1,
            status: IslandStatus::Completed,
            champion_fitness: Some(0.5),
            replacements: vec![applied("a", true, 0.5), applied("b", false, 0.0)],
            exported: 1,
        };
        assert_eq!(log.deltas(), vec![0.5]);
        assert_eq!(log.sources(), vec![&IslandId::from("a")]);
        assert_eq!(log.accepted(), 1);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&IslandStatus::Failed("nan".to_string())).unwrap();
        assert_eq!(json, r#"{"status":"failed","reason":"nan"}"#);
        assert_eq!(IslandStatus::Retired.to_string(), "retired");
    }
}
