//! Results stores

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::record::RunRecord;
use crate::error::MigrationResult;

/// Append-only sink for run records
pub trait ResultsStore: Send + Sync {
    /// Append one record
    fn append(&self, record: &RunRecord) -> MigrationResult<()>;

    /// Every record stored so far, oldest first
    fn records(&self) -> MigrationResult<Vec<RunRecord>>;
}

/// Stores one JSON object per line in a file
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesStore {
    /// Store records in `path`, created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// File the records are written to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultsStore for JsonLinesStore {
    fn append(&self, record: &RunRecord) -> MigrationResult<()> {
        let _guard = self.lock.lock();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        tracing::info!(run_id = %record.run_id, path = %self.path.display(), "run record stored");
        Ok(())
    }

    fn records(&self) -> MigrationResult<Vec<RunRecord>> {
        let _guard = self.lock.lock();
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemoryResultsStore {
    records: Mutex<Vec<RunRecord>>,
}

impl MemoryResultsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultsStore for MemoryResultsStore {
    fn append(&self, record: &RunRecord) -> MigrationResult<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn records(&self) -> MigrationResult<Vec<RunRecord>> {
        Ok(self.records.lock().clone())
    }
}
