//! Rayon-backed engine

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;

use super::{Collected, ExecutionEngine};
use crate::error::{MigrationError, MigrationResult};

/// Runs tasks on a rayon thread pool
///
/// Without a deadline the batch is a plain parallel map. With a deadline each
/// task is spawned separately and results are collected until the deadline
/// passes; late tasks keep running in the background but their results are
/// dropped.
#[derive(Debug, Default)]
pub struct RayonEngine {
    pool: Option<Arc<ThreadPool>>,
}

impl RayonEngine {
    /// Use rayon's global pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a dedicated pool with `num_threads` workers
    pub fn with_threads(num_threads: usize) -> MigrationResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("island-worker-{i}"))
            .build()
            .map_err(|e| MigrationError::config(format!("cannot build thread pool: {e}")))?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    fn spawn<OP>(&self, op: OP)
    where
        OP: FnOnce() + Send + 'static,
    {
        match &self.pool {
            Some(pool) => pool.spawn(op),
            None => rayon::spawn(op),
        }
    }
}

impl ExecutionEngine for RayonEngine {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn submit<T, R, F>(&self, tasks: Vec<T>, work: F, deadline: Option<Duration>) -> Collected<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let Some(deadline) = deadline else {
            let run = || {
                tasks
                    .into_par_iter()
                    .enumerate()
                    .map(|(i, task)| (i, work(task)))
                    .collect::<Vec<_>>()
            };
            let completed = match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            };
            return Collected {
                completed,
                timed_out: Vec::new(),
            };
        };

        let started = Instant::now();
        let total = tasks.len();
        let work = Arc::new(work);
        let (tx, rx) = mpsc::channel();
        for (index, task) in tasks.into_iter().enumerate() {
            let tx = tx.clone();
            let work = Arc::clone(&work);
            self.spawn(move || {
                // receiver gone means the batch already timed out
                let _ = tx.send((index, (*work)(task)));
            });
        }
        drop(tx);

        let mut collected = Collected::new();
        let mut finished = vec![false; total];
        while collected.completed.len() < total {
            let remaining = deadline.saturating_sub(started.elapsed());
            match rx.recv_timeout(remaining) {
                Ok((index, result)) => {
                    finished[index] = true;
                    collected.completed.push((index, result));
                }
                Err(_) => break,
            }
        }
        collected.timed_out = finished
            .iter()
            .enumerate()
            .filter(|(_, done)| !**done)
            .map(|(i, _)| i)
            .collect();
        collected
    }
}
