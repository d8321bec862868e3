//! Island topology graph
//!
//! An immutable graph whose nodes are island identifiers and whose edges give
//! the allowed migration directions. Undirected topologies store both
//! directions of every edge, so adjacency is symmetric by construction.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MigrationError, MigrationResult};
use crate::topology::generators::IndexGraph;

/// Globally unique island identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IslandId(String);

impl IslandId {
    /// Create an identifier from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a random (UUID v4) identifier
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IslandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IslandId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IslandId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for IslandId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Migration topology over island identifiers
#[derive(Clone, Debug)]
pub struct Topology {
    id: String,
    label: String,
    directed: bool,
    ids: Vec<IslandId>,
    index: HashMap<IslandId, usize>,
    successors: Vec<BTreeSet<usize>>,
    predecessors: Vec<BTreeSet<usize>>,
    endpoints: Option<(usize, usize)>,
    hub: Option<usize>,
}

impl Topology {
    /// Map an index graph onto island identities
    ///
    /// `directed` is the semantics the caller expects; a graph generated with
    /// the other semantics is rejected.
    pub fn from_index_graph(
        graph: &IndexGraph,
        ids: Vec<IslandId>,
        directed: bool,
        label: impl Into<String>,
    ) -> MigrationResult<Self> {
        if graph.directed != directed {
            return Err(MigrationError::Topology(format!(
                "generator produced a {} graph but {} semantics were requested",
                direction_name(graph.directed),
                direction_name(directed),
            )));
        }
        if ids.len() != graph.nodes {
            return Err(MigrationError::Topology(format!(
                "graph has {} nodes but {} island ids were supplied",
                graph.nodes,
                ids.len()
            )));
        }

        let mut builder = TopologyBuilder::new(directed).label(label).islands(ids.clone());
        for &(u, v) in &graph.edges {
            let (a, b) = (lookup(&ids, u)?, lookup(&ids, v)?);
            builder = builder.edge(a.clone(), b.clone());
        }
        if let Some((a, b)) = graph.endpoints {
            builder = builder.endpoints(lookup(&ids, a)?.clone(), lookup(&ids, b)?.clone());
        }
        if let Some(h) = graph.hub {
            builder = builder.hub(lookup(&ids, h)?.clone());
        }
        builder.build()
    }

    /// Unique identifier of this topology instance
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Generator label (e.g. `bidir-ring`)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether edges are one-way
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of islands
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the topology has no islands
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Island identifiers in construction order
    pub fn island_ids(&self) -> &[IslandId] {
        &self.ids
    }

    /// Whether `id` is a node of this topology
    pub fn contains(&self, id: &IslandId) -> bool {
        self.index.contains_key(id)
    }

    /// Construction-order position of `id`
    pub fn position(&self, id: &IslandId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Islands that `id` sends migrants to
    pub fn outgoing(&self, id: &IslandId) -> Vec<&IslandId> {
        self.resolve(id, &self.successors)
    }

    /// Islands that send migrants to `id`
    pub fn incoming(&self, id: &IslandId) -> Vec<&IslandId> {
        self.resolve(id, &self.predecessors)
    }

    /// Number of outgoing edges
    pub fn out_degree(&self, id: &IslandId) -> usize {
        self.position(id).map_or(0, |i| self.successors[i].len())
    }

    /// Number of incoming edges
    pub fn in_degree(&self, id: &IslandId) -> usize {
        self.position(id).map_or(0, |i| self.predecessors[i].len())
    }

    /// Degree in the graph-theoretic sense
    ///
    /// Undirected: number of distinct neighbors. Directed: in + out.
    pub fn degree(&self, id: &IslandId) -> usize {
        if self.directed {
            self.in_degree(id) + self.out_degree(id)
        } else {
            self.out_degree(id)
        }
    }

    /// Whether any island sends migrants to `id`
    pub fn has_incoming(&self, id: &IslandId) -> bool {
        self.in_degree(id) > 0
    }

    /// All edges; undirected edges are listed once
    pub fn edges(&self) -> Vec<(&IslandId, &IslandId)> {
        let mut edges = Vec::new();
        for (u, targets) in self.successors.iter().enumerate() {
            for &v in targets {
                if self.directed || u < v {
                    edges.push((&self.ids[u], &self.ids[v]));
                }
            }
        }
        edges
    }

    /// Number of edges; undirected edges count once
    pub fn edge_count(&self) -> usize {
        let arcs: usize = self.successors.iter().map(BTreeSet::len).sum();
        if self.directed {
            arcs
        } else {
            arcs / 2
        }
    }

    /// Chain endpoints, for chain-like topologies
    pub fn endpoints(&self) -> Option<(&IslandId, &IslandId)> {
        self.endpoints.map(|(a, b)| (&self.ids[a], &self.ids[b]))
    }

    /// Designated hub, for rim and star topologies
    pub fn hub(&self) -> Option<&IslandId> {
        self.hub.map(|h| &self.ids[h])
    }

    fn resolve<'a>(&'a self, id: &IslandId, adjacency: &'a [BTreeSet<usize>]) -> Vec<&'a IslandId> {
        match self.position(id) {
            Some(i) => adjacency[i].iter().map(|&j| &self.ids[j]).collect(),
            None => Vec::new(),
        }
    }
}

fn direction_name(directed: bool) -> &'static str {
    if directed {
        "directed"
    } else {
        "undirected"
    }
}

fn lookup(ids: &[IslandId], index: usize) -> MigrationResult<&IslandId> {
    ids.get(index).ok_or_else(|| {
        MigrationError::Topology(format!("edge references node {index} outside the graph"))
    })
}

/// Builder for custom topologies
///
/// Every island referenced by an edge, hub or endpoint must be added first.
#[derive(Clone, Debug)]
pub struct TopologyBuilder {
    directed: bool,
    label: String,
    ids: Vec<IslandId>,
    edges: Vec<(IslandId, IslandId)>,
    endpoints: Option<(IslandId, IslandId)>,
    hub: Option<IslandId>,
}

impl TopologyBuilder {
    /// Create a builder with the given edge semantics
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            label: "custom".to_string(),
            ids: Vec::new(),
            edges: Vec::new(),
            endpoints: None,
            hub: None,
        }
    }

    /// Builder for a topology with symmetric adjacency
    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// Builder for a topology with one-way edges
    pub fn directed() -> Self {
        Self::new(true)
    }

    /// Set the generator label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Add one island
    pub fn island(mut self, id: impl Into<IslandId>) -> Self {
        self.ids.push(id.into());
        self
    }

    /// Add several islands
    pub fn islands<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<IslandId>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Add an edge from `from` to `to` (both ways when undirected)
    pub fn edge(mut self, from: impl Into<IslandId>, to: impl Into<IslandId>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Mark chain endpoints
    pub fn endpoints(mut self, a: impl Into<IslandId>, b: impl Into<IslandId>) -> Self {
        self.endpoints = Some((a.into(), b.into()));
        self
    }

    /// Mark the hub island
    pub fn hub(mut self, hub: impl Into<IslandId>) -> Self {
        self.hub = Some(hub.into());
        self
    }

    /// Validate and build the topology
    pub fn build(self) -> MigrationResult<Topology> {
        let mut index = HashMap::with_capacity(self.ids.len());
        for (i, id) in self.ids.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(MigrationError::Topology(format!("duplicate island id {id}")));
            }
        }

        let position = |id: &IslandId| {
            index
                .get(id)
                .copied()
                .ok_or_else(|| MigrationError::Topology(format!("unknown island {id}")))
        };

        let n = self.ids.len();
        let mut successors = vec![BTreeSet::new(); n];
        let mut predecessors = vec![BTreeSet::new(); n];
        for (from, to) in &self.edges {
            let (u, v) = (position(from)?, position(to)?);
            if u == v {
                return Err(MigrationError::Topology(format!("self-loop on island {from}")));
            }
            successors[u].insert(v);
            predecessors[v].insert(u);
            if !self.directed {
                successors[v].insert(u);
                predecessors[u].insert(v);
            }
        }

        let endpoints = match &self.endpoints {
            Some((a, b)) => Some((position(a)?, position(b)?)),
            None => None,
        };
        let hub = match &self.hub {
            Some(h) => Some(position(h)?),
            None => None,
        };

        Ok(Topology {
            id: Uuid::new_v4().to_string(),
            label: self.label,
            directed: self.directed,
            ids: self.ids,
            index,
            successors,
            predecessors,
            endpoints,
            hub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undirected_edges_are_symmetric() {
        let topology = TopologyBuilder::undirected()
            .islands(["a", "b", "c"])
            .edge("a", "b")
            .edge("b", "c")
            .build()
            .unwrap();

        let a = IslandId::from("a");
        let b = IslandId::from("b");
        assert_eq!(topology.outgoing(&a), vec![&b]);
        assert_eq!(topology.incoming(&a), vec![&b]);
        assert_eq!(topology.degree(&b), 2);
        assert_eq!(topology.edge_count(), 2);
        assert!(!topology.is_directed());
    }

    #[test]
    fn test_directed_edges_are_one_way() {
        let topology = TopologyBuilder::directed()
            .islands(["a", "b"])
            .edge("a", "b")
            .build()
            .unwrap();

        let a = IslandId::from("a");
        let b = IslandId::from("b");
        assert_eq!(topology.outgoing(&a), vec![&b]);
        assert!(topology.outgoing(&b).is_empty());
        assert!(topology.has_incoming(&b));
        assert!(!topology.has_incoming(&a));
        assert_eq!(topology.degree(&a), 1);
    }

    #[test]
    fn test_edge_to_unknown_island_rejected() {
        let result = TopologyBuilder::undirected()
            .islands(["a"])
            .edge("a", "ghost")
            .build();
        assert!(matches!(result, Err(MigrationError::Topology(_))));
    }

    #[test]
    fn test_duplicate_ids_and_self_loops_rejected() {
        let dup = TopologyBuilder::undirected().islands(["a", "a"]).build();
        assert!(dup.is_err());

        let looped = TopologyBuilder::undirected()
            .islands(["a"])
            .edge("a", "a")
            .build();
        assert!(looped.is_err());
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let topology = TopologyBuilder::undirected()
            .islands(["a", "b"])
            .edge("a", "b")
            .edge("b", "a")
            .build()
            .unwrap();
        assert_eq!(topology.edge_count(), 1);
        assert_eq!(topology.edges().len(), 1);
    }

    #[test]
    fn test_from_index_graph_rejects_direction_mismatch() {
        let graph = IndexGraph {
            nodes: 2,
            directed: true,
            edges: vec![(0, 1)],
            endpoints: None,
            hub: None,
        };
        let ids = vec![IslandId::from("a"), IslandId::from("b")];
        let result = Topology::from_index_graph(&graph, ids.clone(), false, "test");
        assert!(matches!(result, Err(MigrationError::Topology(_))));

        let ok = Topology::from_index_graph(&graph, ids, true, "test").unwrap();
        assert_eq!(ok.label(), "test");
    }

    #[test]
    fn test_unknown_island_has_no_neighbors() {
        let topology = TopologyBuilder::undirected().islands(["a"]).build().unwrap();
        let ghost = IslandId::from("ghost");
        assert!(topology.outgoing(&ghost).is_empty());
        assert_eq!(topology.degree(&ghost), 0);
        assert!(!topology.contains(&ghost));
    }
}
