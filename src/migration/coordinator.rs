//! Migration coordinator
//!
//! The coordinator owns every migrant pool of a run and brokers exchange
//! between islands that may run concurrently. Its lifecycle is: pools are
//! defined once from the topology, then each round islands push migrants and,
//! after the round barrier, pull and replace.
//!
//! Each pool has its own mutex, so pushes to different destinations never
//! contend; the pool map lock is held only to look a pool up or add one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{MigrationError, MigrationResult, PoolPhase};
use crate::migration::migrant::Migrant;
use crate::migration::pool::MigrantPool;
use crate::migration::replacement::{AppliedReplacement, ReplacementPolicy};
use crate::population::population::PopulationView;
use crate::topology::graph::{IslandId, Topology};

/// Pool capacity declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolCapacity {
    /// Same capacity for every pool
    Uniform(usize),
    /// Per-island capacities with a fallback
    PerIsland {
        default: usize,
        overrides: HashMap<IslandId, usize>,
    },
}

impl PoolCapacity {
    /// Capacity for `island`
    pub fn for_island(&self, island: &IslandId) -> usize {
        match self {
            Self::Uniform(c) => *c,
            Self::PerIsland { default, overrides } => {
                overrides.get(island).copied().unwrap_or(*default)
            }
        }
    }
}

impl From<usize> for PoolCapacity {
    fn from(capacity: usize) -> Self {
        Self::Uniform(capacity)
    }
}

/// Broker for migrant exchange between islands
///
/// Implementations may live in process or behind a network service; all
/// methods must be safe to call concurrently from many islands.
pub trait MigrationCoordinator: Send + Sync {
    /// Create one pool per island that has an incoming edge
    ///
    /// May be called once; a second call fails with
    /// [`MigrationError::PoolsAlreadyDefined`]. Pools declared earlier through
    /// [`define_migrant_pool`](Self::define_migrant_pool) keep their capacity.
    fn define_pools(&self, topology: &Topology, capacity: &PoolCapacity) -> MigrationResult<()>;

    /// Declare or re-declare the capacity of one island's pool
    ///
    /// Shrinking a pool evicts its worst residents.
    fn define_migrant_pool(&self, island: &IslandId, capacity: usize) -> MigrationResult<()>;

    /// Declare or re-declare capacity for every island with an incoming edge
    fn define_migrant_pools(&self, topology: &Topology, capacity: usize) -> MigrationResult<()> {
        for id in topology.island_ids() {
            if topology.has_incoming(id) {
                self.define_migrant_pool(id, capacity)?;
            }
        }
        Ok(())
    }

    /// Add a migrant to `destination`'s pool
    fn push(&self, destination: &IslandId, migrant: Migrant) -> MigrationResult<()>;

    /// Add a migrant built from its parts to `destination`'s pool
    fn push_migrant(
        &self,
        destination: &IslandId,
        genome: Vec<f64>,
        fitness: f64,
        source: &IslandId,
    ) -> MigrationResult<()> {
        self.push(destination, Migrant::new(genome, fitness, source.clone()))
    }

    /// Drain `island`'s pool and apply `policy` to `population`
    fn pull_and_replace(
        &self,
        island: &IslandId,
        population: &mut dyn PopulationView,
        policy: &dyn ReplacementPolicy,
    ) -> MigrationResult<Vec<AppliedReplacement>>;

    /// Discard `island`'s pool contents, returning how many were dropped
    fn clear_pool(&self, island: &IslandId) -> MigrationResult<usize>;

    /// Declared capacity of `island`'s pool
    fn pool_capacity(&self, island: &IslandId) -> Option<usize>;

    /// Number of migrants waiting for `island`
    fn pool_len(&self, island: &IslandId) -> Option<usize>;

    /// Whether `island` has a pool
    fn has_pool(&self, island: &IslandId) -> bool {
        self.pool_capacity(island).is_some()
    }
}

type SharedPool = Arc<Mutex<MigrantPool>>;

/// Coordinator for islands running in one process
#[derive(Debug, Default)]
pub struct InProcessCoordinator {
    pools: RwLock<HashMap<IslandId, SharedPool>>,
    defined: AtomicBool,
}

impl InProcessCoordinator {
    /// Create a coordinator with no pools
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of defined pools
    pub fn pool_count(&self) -> usize {
        self.pools.read().len()
    }

    fn pool(&self, island: &IslandId, phase: PoolPhase) -> MigrationResult<SharedPool> {
        self.pools
            .read()
            .get(island)
            .cloned()
            .ok_or_else(|| MigrationError::unknown_destination(island, phase))
    }
}

impl MigrationCoordinator for InProcessCoordinator {
    fn define_pools(&self, topology: &Topology, capacity: &PoolCapacity) -> MigrationResult<()> {
        let mut pools = self.pools.write();
        if self.defined.swap(true, Ordering::AcqRel) {
            return Err(MigrationError::PoolsAlreadyDefined);
        }
        for id in topology.island_ids() {
            if topology.has_incoming(id) {
                pools.entry(id.clone()).or_insert_with(|| {
                    Arc::new(Mutex::new(MigrantPool::new(capacity.for_island(id))))
                });
            }
        }
        tracing::debug!(pools = pools.len(), topology = topology.label(), "defined migrant pools");
        Ok(())
    }

    fn define_migrant_pool(&self, island: &IslandId, capacity: usize) -> MigrationResult<()> {
        let existing = self.pools.read().get(island).cloned();
        match existing {
            Some(pool) => {
                let evicted = pool.lock().set_capacity(capacity);
                if !evicted.is_empty() {
                    tracing::debug!(
                        island = %island,
                        evicted = evicted.len(),
                        "pool shrunk"
                    );
                }
            }
            None => {
                self.pools
                    .write()
                    .entry(island.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(MigrantPool::new(capacity))));
            }
        }
        Ok(())
    }

    fn push(&self, destination: &IslandId, migrant: Migrant) -> MigrationResult<()> {
        let pool = self.pool(destination, PoolPhase::Push)?;
        let mut pool = pool.lock();
        if let Some(evicted) = pool.push(migrant) {
            tracing::trace!(
                destination = %destination,
                source = %evicted.source(),
                fitness = evicted.fitness(),
                "migrant evicted"
            );
        }
        Ok(())
    }

    fn pull_and_replace(
        &self,
        island: &IslandId,
        population: &mut dyn PopulationView,
        policy: &dyn ReplacementPolicy,
    ) -> MigrationResult<Vec<AppliedReplacement>> {
        let pool = self.pool(island, PoolPhase::Pull)?;
        let (migrants, stats) = {
            let mut pool = pool.lock();
            let stats = pool.stats();
            (pool.drain(), stats)
        };
        tracing::debug!(
            island = %island,
            received = migrants.len(),
            pushed = stats.pushed,
            evicted = stats.evicted,
            policy = policy.name(),
            "drained migrant pool"
        );
        policy.replace(population, migrants)
    }

    fn clear_pool(&self, island: &IslandId) -> MigrationResult<usize> {
        let pool = self.pool(island, PoolPhase::Clear)?;
        let dropped = pool.lock().drain().len();
        Ok(dropped)
    }

    fn pool_capacity(&self, island: &IslandId) -> Option<usize> {
        self.pools.read().get(island).map(|p| p.lock().capacity())
    }

    fn pool_len(&self, island: &IslandId) -> Option<usize> {
        self.pools.read().get(island).map(|p| p.lock().len())
    }
}
