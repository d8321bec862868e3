//! Run monitoring
//!
//! Advisory key-value reporting for live dashboards. Every entry carries an
//! expiry and every failure is logged and swallowed: losing monitoring data
//! never affects a run.
//!
//! Keys are qualified by a per-run domain `<name>.<run_id>`:
//!
//! | key | value |
//! |-----|-------|
//! | `<domain>.run` | run id |
//! | `<domain>.run.status` | `active`, `finished` or `failed` |
//! | `<domain>.run.startTime` / `.endTime` | RFC 3339 timestamps |
//! | `<domain>.islandIds` | JSON array of island ids |
//! | `<domain>.round` | last completed round |
//! | `<domain>.island.<id>.round` | island's last completed round |
//! | `<domain>.island.<id>.best_f` | island's champion fitness |
//! | `<domain>.island.<id>.status` | island status |

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::MigrationResult;
use crate::topology::graph::IslandId;

/// Expiry of run-level keys (7 days)
pub const RUN_KEY_TTL: Duration = Duration::from_secs(604_800);

/// Expiry of per-island keys
pub const ISLAND_KEY_TTL: Duration = Duration::from_secs(10_000);

/// Key-value store with expiring entries
pub trait MonitoringSink: Send + Sync {
    /// Store `value` under `key` for `ttl`
    fn set(&self, key: &str, value: &str, ttl: Duration) -> MigrationResult<()>;

    /// Read a live entry
    fn get(&self, key: &str) -> MigrationResult<Option<String>>;
}

/// In-memory sink with lazy expiry
#[derive(Debug, Default)]
pub struct InMemoryMonitor {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryMonitor {
    /// Create an empty monitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not expired
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|(_, expires)| *expires > now)
            .count()
    }

    /// Whether no live entries remain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MonitoringSink for InMemoryMonitor {
    fn set(&self, key: &str, value: &str, ttl: Duration) -> MigrationResult<()> {
        let expires = Instant::now() + ttl;
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    fn get(&self, key: &str) -> MigrationResult<Option<String>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

/// Sink that discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMonitor;

impl MonitoringSink for NullMonitor {
    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> MigrationResult<()> {
        Ok(())
    }

    fn get(&self, _key: &str) -> MigrationResult<Option<String>> {
        Ok(None)
    }
}

/// Run status reported under `<domain>.run.status`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// Rounds in progress
    Active,
    /// All rounds completed
    Finished,
    /// The run aborted
    Failed,
}

impl RunStatus {
    /// Value written to the sink
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }
}

/// A sink bound to one run's key domain
#[derive(Clone)]
pub struct RunMonitor {
    sink: Arc<dyn MonitoringSink>,
    domain: String,
    run_id: Uuid,
}

impl std::fmt::Debug for RunMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunMonitor")
            .field("domain", &self.domain)
            .field("run_id", &self.run_id)
            .finish()
    }
}

impl RunMonitor {
    /// Bind `sink` to the domain `<name>.<run_id>`
    pub fn new(sink: Arc<dyn MonitoringSink>, name: &str, run_id: Uuid) -> Self {
        Self {
            sink,
            domain: format!("{name}.{run_id}"),
            run_id,
        }
    }

    /// Monitor that reports nowhere
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullMonitor), "disabled", Uuid::nil())
    }

    /// Key domain
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Run identifier
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Fully qualified key
    pub fn key(&self, suffix: &str) -> String {
        format!("{}.{}", self.domain, suffix)
    }

    /// Per-island key
    pub fn island_key(&self, island: &IslandId, field: &str) -> String {
        format!("{}.island.{}.{}", self.domain, island, field)
    }

    /// Report run start and the participating islands
    pub fn start(&self, islands: &[IslandId], at: DateTime<Utc>) {
        self.put(&self.key("run"), &self.run_id.to_string(), RUN_KEY_TTL);
        self.status(RunStatus::Active);
        self.put(&self.key("run.startTime"), &at.to_rfc3339(), RUN_KEY_TTL);
        match serde_json::to_string(islands) {
            Ok(ids) => self.put(&self.key("islandIds"), &ids, RUN_KEY_TTL),
            Err(e) => tracing::warn!(error = %e, "cannot encode island ids"),
        }
    }

    /// Report the run's status
    pub fn status(&self, status: RunStatus) {
        self.put(&self.key("run.status"), status.as_str(), RUN_KEY_TTL);
    }

    /// Report a completed round
    pub fn round(&self, round: usize) {
        self.put(&self.key("round"), &round.to_string(), RUN_KEY_TTL);
    }

    /// Report one island's progress
    pub fn island(&self, island: &IslandId, round: usize, best: Option<f64>, status: &str) {
        self.put(&self.island_key(island, "round"), &round.to_string(), ISLAND_KEY_TTL);
        if let Some(best) = best {
            self.put(&self.island_key(island, "best_f"), &best.to_string(), ISLAND_KEY_TTL);
        }
        self.put(&self.island_key(island, "status"), status, ISLAND_KEY_TTL);
    }

    /// Report run end
    pub fn finish(&self, status: RunStatus, at: DateTime<Utc>) {
        self.status(status);
        self.put(&self.key("run.endTime"), &at.to_rfc3339(), RUN_KEY_TTL);
    }

    /// Read back a qualified key
    pub fn get(&self, suffix: &str) -> Option<String> {
        self.sink.get(&self.key(suffix)).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "monitor read failed");
            None
        })
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(e) = self.sink.set(key, value, ttl) {
            tracing::debug!(key, error = %e, "monitor write failed");
        }
    }
}

pub mod prelude {
    pub use super::{
        InMemoryMonitor, MonitoringSink, NullMonitor, RunMonitor, RunStatus, ISLAND_KEY_TTL,
        RUN_KEY_TTL,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrationError;

    #[derive(Clone, Copy, Debug, Default)]
    struct FailingMonitor;

    impl MonitoringSink for FailingMonitor {
        fn set(&self, key: &str, _value: &str, _ttl: Duration) -> MigrationResult<()> {
            Err(MigrationError::Persistence(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                format!("monitoring unavailable for {key}"),
            )))
        }

        fn get(&self, _key: &str) -> MigrationResult<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn test_entries_expire() {
        let monitor = InMemoryMonitor::new();
        monitor.set("k", "v", Duration::from_millis(0)).unwrap();
        monitor.set("live", "v", Duration::from_secs(60)).unwrap();
        assert_eq!(monitor.get("k").unwrap(), None);
        assert_eq!(monitor.get("live").unwrap().as_deref(), Some("v"));
        assert_eq!(monitor.len(), 1);
    }

    #[test]
    fn test_run_monitor_key_layout() {
        let sink = Arc::new(InMemoryMonitor::new());
        let run_id = Uuid::new_v4();
        let monitor = RunMonitor::new(sink.clone(), "sphere", run_id);
        let islands = vec![IslandId::from("i0"), IslandId::from("i1")];

        monitor.start(&islands, Utc::now());
        monitor.island(&islands[0], 2, Some(0.25), "completed");
        monitor.round(2);

        let domain = format!("sphere.{run_id}");
        assert_eq!(monitor.domain(), domain);
        assert_eq!(monitor.get("run.status").as_deref(), Some("active"));
        assert_eq!(monitor.get("islandIds").as_deref(), Some(r#"["i0","i1"]"#));
        assert_eq!(monitor.get("round").as_deref(), Some("2"));
        assert_eq!(
            sink.get(&format!("{domain}.island.i0.best_f")).unwrap().as_deref(),
            Some("0.25")
        );

        monitor.finish(RunStatus::Finished, Utc::now());
        assert_eq!(monitor.get("run.status").as_deref(), Some("finished"));
        assert!(monitor.get("run.endTime").is_some());
    }

    #[test]
    fn test_sink_failures_are_ignored() {
        let monitor = RunMonitor::new(Arc::new(FailingMonitor), "x", Uuid::new_v4());
        monitor.start(&[IslandId::from("a")], Utc::now());
        monitor.finish(RunStatus::Failed, Utc::now());
        assert_eq!(monitor.get("run.status"), None);
    }
}
