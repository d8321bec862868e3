//! Migrant pool
//!
//! A bounded per-destination buffer that always holds the best `capacity`
//! migrants pushed since the last drain, whatever their arrival order.

use std::cmp::Ordering;

use crate::migration::migrant::Migrant;
use crate::population::individual::fitness_cmp;

/// Push and eviction counters for the current round
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Migrants pushed since the last drain
    pub pushed: usize,
    /// Migrants evicted (or rejected) since the last drain
    pub evicted: usize,
}

/// Bounded buffer of migrants, kept best first
#[derive(Clone, Debug)]
pub struct MigrantPool {
    capacity: usize,
    migrants: Vec<Migrant>,
    stats: PoolStats,
}

impl MigrantPool {
    /// Create an empty pool
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            migrants: Vec::with_capacity(capacity),
            stats: PoolStats::default(),
        }
    }

    /// Declared capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident migrants
    pub fn len(&self) -> usize {
        self.migrants.len()
    }

    /// Whether the pool holds no migrants
    pub fn is_empty(&self) -> bool {
        self.migrants.is_empty()
    }

    /// Resident migrants, best first
    pub fn migrants(&self) -> &[Migrant] {
        &self.migrants
    }

    /// Counters since the last drain
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Add a migrant, evicting the worst resident on overflow
    ///
    /// Returns the evicted migrant, which is `migrant` itself when it is worse
    /// than every resident of a full pool. Among equal fitness the earlier
    /// arrival is kept.
    pub fn push(&mut self, migrant: Migrant) -> Option<Migrant> {
        self.stats.pushed += 1;
        let at = self
            .migrants
            .partition_point(|resident| {
                fitness_cmp(resident.fitness(), migrant.fitness()) != Ordering::Greater
            });
        if at >= self.capacity {
            self.stats.evicted += 1;
            return Some(migrant);
        }
        self.migrants.insert(at, migrant);
        if self.migrants.len() > self.capacity {
            self.stats.evicted += 1;
            return self.migrants.pop();
        }
        None
    }

    /// Empty the pool, returning its contents best first
    ///
    /// Capacity is unchanged and counters reset.
    pub fn drain(&mut self) -> Vec<Migrant> {
        self.stats = PoolStats::default();
        std::mem::take(&mut self.migrants)
    }

    /// Change capacity, returning the migrants that no longer fit
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<Migrant> {
        self.capacity = capacity;
        if self.migrants.len() > capacity {
            let evicted = self.migrants.split_off(capacity);
            self.stats.evicted += evicted.len();
            evicted
        } else {
            Vec::new()
        }
    }
}
