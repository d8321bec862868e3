//! Single-threaded engine

use std::time::{Duration, Instant};

use super::{Collected, ExecutionEngine};

/// Runs tasks one after another on the calling thread
///
/// A running task is never interrupted; the deadline is checked before each
/// task starts, and everything not yet started when it passes times out.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialEngine;

impl SequentialEngine {
    /// Create a sequential engine
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionEngine for SequentialEngine {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn submit<T, R, F>(&self, tasks: Vec<T>, work: F, deadline: Option<Duration>) -> Collected<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let started = Instant::now();
        let mut collected = Collected::new();
        for (index, task) in tasks.into_iter().enumerate() {
            let expired = deadline.is_some_and(|d| started.elapsed() >= d);
            if expired {
                collected.timed_out.push(index);
                continue;
            }
            collected.completed.push((index, work(task)));
        }
        collected
    }
}
