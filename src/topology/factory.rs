//! Topology factory
//!
//! Builds a [`Topology`] from a named generator and pairs every node with an
//! [`Island`] whose algorithm comes from an [`IslandConstructor`].

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{MigrationError, MigrationResult};
use crate::optimizer::Optimizer;
use crate::topology::generators::{GeneratorKind, TopologyParams};
use crate::topology::graph::{IslandId, Topology};

/// An island: identity, algorithm configuration and population size
///
/// The island's position in the topology is looked up by id; the topology
/// itself never holds island payloads.
#[derive(Clone, Debug)]
pub struct Island<A> {
    /// Globally unique identifier
    pub id: IslandId,
    /// Algorithm configuration for this island
    pub algorithm: A,
    /// Population size
    pub size: usize,
}

/// Node-aware algorithm constructor
pub type NodeConstructor<A> = Box<dyn Fn(usize, &Topology) -> A + Send + Sync>;

/// How each node's algorithm is produced
pub enum IslandConstructor<A> {
    /// Every island gets a clone of the same algorithm
    ///
    /// Clones share any seeded random state; use [`IslandConstructor::seeded`]
    /// for optimizers that should explore independently.
    Shared(A),
    /// Each island samples one algorithm uniformly from the list
    Sampled(Vec<A>),
    /// Called with the node's position and the finished topology
    PerNode(NodeConstructor<A>),
}

impl<A> IslandConstructor<A> {
    /// Node-aware constructor from a closure
    pub fn per_node<F>(f: F) -> Self
    where
        F: Fn(usize, &Topology) -> A + Send + Sync + 'static,
    {
        Self::PerNode(Box::new(f))
    }
}

impl<A: Optimizer + Clone + Sync + 'static> IslandConstructor<A> {
    /// Clone `algorithm` into every island, each reseeded from `base_seed`
    /// and its position
    pub fn seeded(algorithm: A, base_seed: u64) -> Self {
        Self::per_node(move |position, _| {
            let mut island = algorithm.clone();
            island.reseed(island_seed(base_seed, position));
            island
        })
    }
}

/// Distinct, reproducible seed for the island at `position`
pub fn island_seed(base_seed: u64, position: usize) -> u64 {
    base_seed ^ (position as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// A topology paired 1:1 with its islands
#[derive(Debug)]
pub struct Archipelago<A> {
    topology: Arc<Topology>,
    islands: Vec<Island<A>>,
}

impl<A> Archipelago<A> {
    /// Pair a topology with islands, in the topology's id order
    pub fn new(topology: Topology, islands: Vec<Island<A>>) -> MigrationResult<Self> {
        if islands.len() != topology.len() {
            return Err(MigrationError::Topology(format!(
                "{} islands supplied for a topology of {}",
                islands.len(),
                topology.len()
            )));
        }
        for (island, id) in islands.iter().zip(topology.island_ids()) {
            if &island.id != id {
                return Err(MigrationError::Topology(format!(
                    "island {} does not match topology node {id}",
                    island.id
                )));
            }
        }
        Ok(Self {
            topology: Arc::new(topology),
            islands,
        })
    }

    /// Shared topology
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Islands in topology order
    pub fn islands(&self) -> &[Island<A>] {
        &self.islands
    }

    /// Look up an island by id
    pub fn island(&self, id: &IslandId) -> Option<&Island<A>> {
        self.topology.position(id).map(|i| &self.islands[i])
    }

    /// Number of islands
    pub fn len(&self) -> usize {
        self.islands.len()
    }

    /// Whether there are no islands
    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    /// Split into the shared topology and the islands
    pub fn into_parts(self) -> (Arc<Topology>, Vec<Island<A>>) {
        (self.topology, self.islands)
    }
}

/// Builds archipelagos from the generator library
#[derive(Clone, Debug)]
pub struct TopologyFactory {
    island_size: usize,
    seed: Option<u64>,
}

impl TopologyFactory {
    /// Create a factory producing islands of `island_size` individuals
    pub fn new(island_size: usize) -> Self {
        Self {
            island_size,
            seed: None,
        }
    }

    /// Seed used when sampling algorithms per node
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Island population size
    pub fn island_size(&self) -> usize {
        self.island_size
    }

    /// Build from a generator name
    ///
    /// Unknown names are a configuration error.
    pub fn build<A: Clone>(
        &self,
        generator: &str,
        params: &TopologyParams,
        constructor: &IslandConstructor<A>,
    ) -> MigrationResult<Archipelago<A>> {
        let kind: GeneratorKind = generator.parse()?;
        self.build_kind(kind, params, constructor)
    }

    /// Build from a generator kind
    pub fn build_kind<A: Clone>(
        &self,
        kind: GeneratorKind,
        params: &TopologyParams,
        constructor: &IslandConstructor<A>,
    ) -> MigrationResult<Archipelago<A>> {
        if self.island_size == 0 {
            return Err(MigrationError::config("island size must be positive"));
        }
        let graph = kind.generate(params)?;
        let ids: Vec<IslandId> = (0..graph.nodes).map(|_| IslandId::random()).collect();
        let topology =
            Topology::from_index_graph(&graph, ids, kind.is_directed(params), kind.name())?;
        let islands = self.make_islands(&topology, constructor)?;

        tracing::debug!(
            topology = kind.name(),
            islands = topology.len(),
            edges = topology.edge_count(),
            "built topology"
        );
        Archipelago::new(topology, islands)
    }

    /// Undirected ring of `n` islands
    pub fn bidir_ring<A: Clone>(
        &self,
        n: usize,
        constructor: &IslandConstructor<A>,
    ) -> MigrationResult<Archipelago<A>> {
        self.build_kind(GeneratorKind::BidirRing, &TopologyParams::with_islands(n), constructor)
    }

    /// Directed ring of `n` islands
    pub fn one_way_ring<A: Clone>(
        &self,
        n: usize,
        constructor: &IslandConstructor<A>,
    ) -> MigrationResult<Archipelago<A>> {
        self.build_kind(GeneratorKind::OneWayRing, &TopologyParams::with_islands(n), constructor)
    }

    /// Pair a custom topology with islands
    pub fn attach<A: Clone>(
        &self,
        topology: Topology,
        constructor: &IslandConstructor<A>,
    ) -> MigrationResult<Archipelago<A>> {
        let islands = self.make_islands(&topology, constructor)?;
        Archipelago::new(topology, islands)
    }

    fn make_islands<A: Clone>(
        &self,
        topology: &Topology,
        constructor: &IslandConstructor<A>,
    ) -> MigrationResult<Vec<Island<A>>> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        topology
            .island_ids()
            .iter()
            .enumerate()
            .map(|(position, id)| -> MigrationResult<Island<A>> {
                let algorithm = match constructor {
                    IslandConstructor::Shared(a) => a.clone(),
                    IslandConstructor::Sampled(choices) => choices
                        .choose(&mut rng)
                        .cloned()
                        .ok_or_else(|| MigrationError::config("no algorithms to sample from"))?,
                    IslandConstructor::PerNode(f) => f(position, topology),
                };
                Ok(Island {
                    id: id.clone(),
                    algorithm,
                    size: self.island_size,
                })
            })
            .collect()
    }
}
