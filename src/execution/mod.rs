//! Execution engines
//!
//! The round driver hands each phase of a round to an engine as a batch of
//! per-island tasks and gets back whatever finished, tagged with the task's
//! submission index. Result order is not guaranteed to follow submission
//! order.

#[cfg(feature = "parallel")]
pub mod parallel;
pub mod sequential;

use std::time::Duration;

/// Results of one submitted batch
#[derive(Debug)]
pub struct Collected<R> {
    /// `(submission index, result)` pairs, in completion order
    pub completed: Vec<(usize, R)>,
    /// Submission indices that did not finish before the deadline
    pub timed_out: Vec<usize>,
}

impl<R> Collected<R> {
    /// An empty collection
    pub fn new() -> Self {
        Self {
            completed: Vec::new(),
            timed_out: Vec::new(),
        }
    }

    /// Whether every task completed
    pub fn is_complete(&self) -> bool {
        self.timed_out.is_empty()
    }

    /// Completed results sorted by submission index
    pub fn into_ordered(mut self) -> Vec<(usize, R)> {
        self.completed.sort_by_key(|(i, _)| *i);
        self.completed
    }
}

impl<R> Default for Collected<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fans tasks out to workers and collects their results
pub trait ExecutionEngine: Send + Sync {
    /// Engine name for logging
    fn name(&self) -> &'static str;

    /// Run `work` over every task
    ///
    /// Blocks until every task has finished or `deadline` has elapsed since
    /// submission. Tasks still running at the deadline are reported in
    /// [`Collected::timed_out`] and their results are discarded.
    fn submit<T, R, F>(&self, tasks: Vec<T>, work: F, deadline: Option<Duration>) -> Collected<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static;
}

pub mod prelude {
    #[cfg(feature = "parallel")]
    pub use super::parallel::RayonEngine;
    pub use super::sequential::SequentialEngine;
    pub use super::{Collected, ExecutionEngine};
}
