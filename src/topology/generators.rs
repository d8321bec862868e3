//! Topology graph generators
//!
//! Each generator produces an [`IndexGraph`] over node indices `0..n`; the
//! factory then maps indices onto island identities.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, MigrationResult};

/// A graph over node indices
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexGraph {
    /// Number of nodes
    pub nodes: usize,
    /// Whether edges are one-way
    pub directed: bool,
    /// Edge list; undirected edges appear once
    pub edges: Vec<(usize, usize)>,
    /// Chain endpoints, if the generator marks them
    pub endpoints: Option<(usize, usize)>,
    /// Hub node, if the generator designates one
    pub hub: Option<usize>,
}

impl IndexGraph {
    fn new(nodes: usize, directed: bool) -> Self {
        Self {
            nodes,
            directed,
            edges: Vec::new(),
            endpoints: None,
            hub: None,
        }
    }

    fn from_adjacency(adjacency: &[BTreeSet<usize>]) -> Self {
        let mut graph = Self::new(adjacency.len(), false);
        for (u, targets) in adjacency.iter().enumerate() {
            graph.edges.extend(targets.iter().filter(|&&v| u < v).map(|&v| (u, v)));
        }
        graph
    }
}

/// Generator parameters
///
/// Only the fields a generator reads need to be set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyParams {
    /// Number of islands
    #[serde(default = "default_n_islands")]
    pub n_islands: usize,
    /// Clique size for `lollipop`; the rest of the islands form the tail
    #[serde(default)]
    pub clique_size: Option<usize>,
    /// Hypercube dimension; derived from `n_islands` when unset
    #[serde(default)]
    pub dimension: Option<u32>,
    /// Ring-lattice degree for `watts-strogatz`
    #[serde(default = "default_k")]
    pub k: usize,
    /// Rewire probability (`watts-strogatz`) or edge probability (`erdos-renyi`)
    #[serde(default = "default_p")]
    pub p: f64,
    /// Attachment count for `barabasi-albert`
    #[serde(default = "default_m")]
    pub m: usize,
    /// One-way edges for `erdos-renyi`
    #[serde(default)]
    pub directed: bool,
    /// Hub node index for `rim` and `star`
    #[serde(default)]
    pub hub: usize,
    /// Seed for the randomized families
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_n_islands() -> usize {
    4
}

fn default_k() -> usize {
    2
}

fn default_p() -> f64 {
    0.1
}

fn default_m() -> usize {
    1
}

impl Default for TopologyParams {
    fn default() -> Self {
        Self {
            n_islands: default_n_islands(),
            clique_size: None,
            dimension: None,
            k: default_k(),
            p: default_p(),
            m: default_m(),
            directed: false,
            hub: 0,
            seed: None,
        }
    }
}

impl TopologyParams {
    /// Parameters for `n` islands with everything else defaulted
    pub fn with_islands(n: usize) -> Self {
        Self {
            n_islands: n,
            ..Self::default()
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// The library of topology generators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    /// Undirected cycle
    BidirRing,
    /// Directed cycle
    OneWayRing,
    /// Path with two degree-1 endpoints
    Chain,
    /// Clique with a pendant chain
    Lollipop,
    /// Ring plus a hub connected to every rim island
    Rim,
    /// Hub connected to every other island (broadcast)
    Star,
    /// Every pair connected
    Complete,
    /// Islands at hypercube corners, edges across one bit
    Hypercube,
    /// Small-world ring lattice with random rewiring
    WattsStrogatz,
    /// Independent edges with fixed probability
    ErdosRenyi,
    /// Preferential attachment
    BarabasiAlbert,
}

impl GeneratorKind {
    /// All generators
    pub const ALL: [GeneratorKind; 11] = [
        Self::BidirRing,
        Self::OneWayRing,
        Self::Chain,
        Self::Lollipop,
        Self::Rim,
        Self::Star,
        Self::Complete,
        Self::Hypercube,
        Self::WattsStrogatz,
        Self::ErdosRenyi,
        Self::BarabasiAlbert,
    ];

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Self::BidirRing => "bidir-ring",
            Self::OneWayRing => "one-way-ring",
            Self::Chain => "chain",
            Self::Lollipop => "lollipop",
            Self::Rim => "rim",
            Self::Star => "star",
            Self::Complete => "complete",
            Self::Hypercube => "hypercube",
            Self::WattsStrogatz => "watts-strogatz",
            Self::ErdosRenyi => "erdos-renyi",
            Self::BarabasiAlbert => "barabasi-albert",
        }
    }

    /// Whether this generator yields one-way edges for `params`
    pub fn is_directed(&self, params: &TopologyParams) -> bool {
        match self {
            Self::OneWayRing => true,
            Self::ErdosRenyi => params.directed,
            _ => false,
        }
    }

    /// Generate the index graph
    pub fn generate(&self, params: &TopologyParams) -> MigrationResult<IndexGraph> {
        let n = params.n_islands;
        match self {
            Self::BidirRing => ring(n, false),
            Self::OneWayRing => ring(n, true),
            Self::Chain => chain(n),
            Self::Lollipop => {
                let clique = params.clique_size.ok_or_else(|| {
                    MigrationError::config("lollipop requires clique_size")
                })?;
                lollipop(clique, n)
            }
            Self::Rim => rim(n, params.hub),
            Self::Star => star(n, params.hub),
            Self::Complete => complete(n),
            Self::Hypercube => {
                let dimension = match params.dimension {
                    Some(d) => d,
                    None => hypercube_dimension(n)?,
                };
                hypercube(dimension)
            }
            Self::WattsStrogatz => watts_strogatz(n, params.k, params.p, &mut params.rng()),
            Self::ErdosRenyi => erdos_renyi(n, params.p, params.directed, &mut params.rng()),
            Self::BarabasiAlbert => barabasi_albert(n, params.m, &mut params.rng()),
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeneratorKind {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "ring" | "bidir-ring" => Self::BidirRing,
            "one-way-ring" => Self::OneWayRing,
            "chain" => Self::Chain,
            "lollipop" => Self::Lollipop,
            "rim" | "hub-rim" | "wheel" => Self::Rim,
            "star" | "broadcast" => Self::Star,
            "complete" | "fully-connected" => Self::Complete,
            "hypercube" => Self::Hypercube,
            "watts-strogatz" | "small-world" => Self::WattsStrogatz,
            "erdos-renyi" => Self::ErdosRenyi,
            "barabasi-albert" => Self::BarabasiAlbert,
            _ => return Err(MigrationError::config(format!("unrecognized topology '{s}'"))),
        };
        Ok(kind)
    }
}

fn require(condition: bool, message: impl FnOnce() -> String) -> MigrationResult<()> {
    if condition {
        Ok(())
    } else {
        Err(MigrationError::Configuration(message()))
    }
}

/// Cycle over `n` islands
pub fn ring(n: usize, directed: bool) -> MigrationResult<IndexGraph> {
    let min = if directed { 2 } else { 3 };
    require(n >= min, || format!("ring needs at least {min} islands, got {n}"))?;
    let mut graph = IndexGraph::new(n, directed);
    graph.edges = (0..n).map(|i| (i, (i + 1) % n)).collect();
    Ok(graph)
}

/// Path over `n` islands
pub fn chain(n: usize) -> MigrationResult<IndexGraph> {
    require(n >= 2, || format!("chain needs at least 2 islands, got {n}"))?;
    let mut graph = IndexGraph::new(n, false);
    graph.edges = (0..n - 1).map(|i| (i, i + 1)).collect();
    graph.endpoints = Some((0, n - 1));
    Ok(graph)
}

/// Clique of `clique` islands with a tail of `n - clique` islands
///
/// The tail hangs off the last clique node; the endpoints are that junction
/// node and the tip of the tail.
pub fn lollipop(clique: usize, n: usize) -> MigrationResult<IndexGraph> {
    require(clique >= 2, || format!("lollipop clique needs at least 2 islands, got {clique}"))?;
    require(n > clique, || {
        format!("lollipop needs more islands ({n}) than its clique ({clique})")
    })?;
    let mut graph = complete(clique)?;
    for i in clique - 1..n - 1 {
        graph.edges.push((i, i + 1));
    }
    graph.nodes = n;
    graph.endpoints = Some((clique - 1, n - 1));
    Ok(graph)
}

/// Ring over every island except `hub`, plus `hub` connected to all of them
pub fn rim(n: usize, hub: usize) -> MigrationResult<IndexGraph> {
    require(n >= 3, || format!("rim needs at least 3 islands, got {n}"))?;
    require(hub < n, || format!("hub {hub} outside {n} islands"))?;
    let rim: Vec<usize> = (0..n).filter(|&i| i != hub).collect();
    let mut adjacency = vec![BTreeSet::new(); n];
    for (pos, &u) in rim.iter().enumerate() {
        let v = rim[(pos + 1) % rim.len()];
        if u != v {
            adjacency[u].insert(v);
            adjacency[v].insert(u);
        }
        adjacency[hub].insert(u);
        adjacency[u].insert(hub);
    }
    let mut graph = IndexGraph::from_adjacency(&adjacency);
    graph.hub = Some(hub);
    Ok(graph)
}

/// `hub` connected to every other island
pub fn star(n: usize, hub: usize) -> MigrationResult<IndexGraph> {
    require(n >= 2, || format!("star needs at least 2 islands, got {n}"))?;
    require(hub < n, || format!("hub {hub} outside {n} islands"))?;
    let mut graph = IndexGraph::new(n, false);
    graph.edges = (0..n).filter(|&i| i != hub).map(|i| (hub, i)).collect();
    graph.hub = Some(hub);
    Ok(graph)
}

/// Fully connected graph
pub fn complete(n: usize) -> MigrationResult<IndexGraph> {
    require(n >= 1, || "complete graph needs at least 1 island".to_string())?;
    let mut graph = IndexGraph::new(n, false);
    for u in 0..n {
        graph.edges.extend((u + 1..n).map(|v| (u, v)));
    }
    Ok(graph)
}

/// Hypercube of the given dimension (`2^dimension` islands)
pub fn hypercube(dimension: u32) -> MigrationResult<IndexGraph> {
    require((1..=16).contains(&dimension), || {
        format!("hypercube dimension must be in 1..=16, got {dimension}")
    })?;
    let n = 1usize << dimension;
    let mut graph = IndexGraph::new(n, false);
    for u in 0..n {
        for bit in 0..dimension {
            let v = u ^ (1 << bit);
            if u < v {
                graph.edges.push((u, v));
            }
        }
    }
    Ok(graph)
}

fn hypercube_dimension(n: usize) -> MigrationResult<u32> {
    require(n >= 2 && n.is_power_of_two(), || {
        format!("hypercube needs a power-of-two island count, got {n}")
    })?;
    Ok(n.trailing_zeros())
}

/// Watts–Strogatz small-world graph
///
/// Starts from a ring lattice where each island links to `k / 2` neighbors on
/// each side, then rewires each lattice edge with probability `p`.
pub fn watts_strogatz<R: Rng>(
    n: usize,
    k: usize,
    p: f64,
    rng: &mut R,
) -> MigrationResult<IndexGraph> {
    require(k >= 2 && k < n, || format!("watts-strogatz needs 2 <= k < n, got k={k}, n={n}"))?;
    require((0.0..=1.0).contains(&p), || format!("rewire probability must be in [0, 1], got {p}"))?;

    let mut adjacency = vec![BTreeSet::new(); n];
    for j in 1..=k / 2 {
        for u in 0..n {
            let v = (u + j) % n;
            adjacency[u].insert(v);
            adjacency[v].insert(u);
        }
    }

    for j in 1..=k / 2 {
        for u in 0..n {
            let v = (u + j) % n;
            if !adjacency[u].contains(&v) || rng.gen::<f64>() >= p {
                continue;
            }
            if adjacency[u].len() >= n - 1 {
                continue;
            }
            let w = loop {
                let w = rng.gen_range(0..n);
                if w != u && !adjacency[u].contains(&w) {
                    break w;
                }
            };
            adjacency[u].remove(&v);
            adjacency[v].remove(&u);
            adjacency[u].insert(w);
            adjacency[w].insert(u);
        }
    }

    Ok(IndexGraph::from_adjacency(&adjacency))
}

/// Erdős–Rényi G(n, p) random graph
pub fn erdos_renyi<R: Rng>(
    n: usize,
    p: f64,
    directed: bool,
    rng: &mut R,
) -> MigrationResult<IndexGraph> {
    require(n >= 1, || "erdos-renyi needs at least 1 island".to_string())?;
    require((0.0..=1.0).contains(&p), || format!("edge probability must be in [0, 1], got {p}"))?;
    let mut graph = IndexGraph::new(n, directed);
    for u in 0..n {
        for v in 0..n {
            let candidate = if directed { u != v } else { u < v };
            if candidate && rng.gen::<f64>() < p {
                graph.edges.push((u, v));
            }
        }
    }
    Ok(graph)
}

/// Barabási–Albert preferential attachment graph
///
/// Each new island attaches to `m` distinct existing islands chosen with
/// probability proportional to degree.
pub fn barabasi_albert<R: Rng>(n: usize, m: usize, rng: &mut R) -> MigrationResult<IndexGraph> {
    require(m >= 1 && m < n, || format!("barabasi-albert needs 1 <= m < n, got m={m}, n={n}"))?;
    let mut graph = IndexGraph::new(n, false);
    let mut targets: Vec<usize> = (0..m).collect();
    let mut repeated: Vec<usize> = Vec::with_capacity(2 * n * m);

    for source in m..n {
        graph.edges.extend(targets.iter().map(|&t| (t, source)));
        repeated.extend(targets.iter().copied());
        repeated.extend(std::iter::repeat(source).take(m));

        let mut chosen = BTreeSet::new();
        while chosen.len() < m {
            if let Some(&pick) = repeated.choose(rng) {
                chosen.insert(pick);
            }
        }
        targets = chosen.into_iter().collect();
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degrees(graph: &IndexGraph) -> Vec<usize> {
        let mut deg = vec![0; graph.nodes];
        for &(u, v) in &graph.edges {
            deg[u] += 1;
            deg[v] += 1;
        }
        deg
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("ring".parse::<GeneratorKind>().unwrap(), GeneratorKind::BidirRing);
        assert_eq!("bidir-ring".parse::<GeneratorKind>().unwrap(), GeneratorKind::BidirRing);
        assert_eq!("broadcast".parse::<GeneratorKind>().unwrap(), GeneratorKind::Star);
        assert_eq!("Fully_Connected".parse::<GeneratorKind>().unwrap(), GeneratorKind::Complete);
        assert!(matches!(
            "moebius".parse::<GeneratorKind>(),
            Err(MigrationError::Configuration(_))
        ));
    }

    #[test]
    fn test_names_round_trip() {
        for kind in GeneratorKind::ALL {
            assert_eq!(kind.name().parse::<GeneratorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_ring_degrees() {
        let graph = ring(6, false).unwrap();
        assert!(degrees(&graph).iter().all(|&d| d == 2));
        assert!(ring(2, false).is_err());
        assert!(ring(2, true).is_ok());
    }

    #[test]
    fn test_chain_endpoints() {
        let graph = chain(5).unwrap();
        assert_eq!(graph.endpoints, Some((0, 4)));
        let deg = degrees(&graph);
        assert_eq!(deg[0], 1);
        assert_eq!(deg[4], 1);
        assert_eq!(graph.edges.len(), 4);
    }

    #[test]
    fn test_lollipop_shape() {
        let graph = lollipop(4, 7).unwrap();
        assert_eq!(graph.nodes, 7);
        // 6 clique edges + 3 tail edges
        assert_eq!(graph.edges.len(), 9);
        assert_eq!(graph.endpoints, Some((3, 6)));
        assert_eq!(degrees(&graph)[6], 1);
        assert!(lollipop(4, 4).is_err());
    }

    #[test]
    fn test_rim_degrees() {
        let graph = rim(6, 0).unwrap();
        let deg = degrees(&graph);
        assert_eq!(deg[0], 5);
        assert!(deg[1..].iter().all(|&d| d == 3));
        assert_eq!(graph.hub, Some(0));
    }

    #[test]
    fn test_rim_with_interior_hub() {
        let graph = rim(5, 2).unwrap();
        let deg = degrees(&graph);
        assert_eq!(deg[2], 4);
        for i in [0, 1, 3, 4] {
            assert_eq!(deg[i], 3);
        }
    }

    #[test]
    fn test_star_degrees() {
        let graph = star(5, 0).unwrap();
        let deg = degrees(&graph);
        assert_eq!(deg[0], 4);
        assert!(deg[1..].iter().all(|&d| d == 1));
    }

    #[test]
    fn test_complete_edge_count() {
        assert_eq!(complete(5).unwrap().edges.len(), 10);
        assert_eq!(complete(1).unwrap().edges.len(), 0);
    }

    #[test]
    fn test_hypercube() {
        let graph = hypercube(3).unwrap();
        assert_eq!(graph.nodes, 8);
        assert_eq!(graph.edges.len(), 12);
        assert!(degrees(&graph).iter().all(|&d| d == 3));

        let params = TopologyParams::with_islands(16);
        let derived = GeneratorKind::Hypercube.generate(&params).unwrap();
        assert_eq!(derived.nodes, 16);

        let bad = TopologyParams::with_islands(12);
        assert!(GeneratorKind::Hypercube.generate(&bad).is_err());
    }

    #[test]
    fn test_watts_strogatz_preserves_edge_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = watts_strogatz(20, 4, 0.3, &mut rng).unwrap();
        assert_eq!(graph.edges.len(), 40);
        assert!(graph.edges.iter().all(|&(u, v)| u != v));

        let mut rng = StdRng::seed_from_u64(7);
        let lattice = watts_strogatz(10, 2, 0.0, &mut rng).unwrap();
        assert!(degrees(&lattice).iter().all(|&d| d == 2));
    }

    #[test]
    fn test_erdos_renyi_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(erdos_renyi(6, 1.0, false, &mut rng).unwrap().edges.len(), 15);
        assert_eq!(erdos_renyi(6, 1.0, true, &mut rng).unwrap().edges.len(), 30);
        assert!(erdos_renyi(6, 0.0, false, &mut rng).unwrap().edges.is_empty());
        assert!(erdos_renyi(6, 1.5, false, &mut rng).is_err());
    }

    #[test]
    fn test_barabasi_albert_edge_count() {
        let mut rng = StdRng::seed_from_u64(3);
        let graph = barabasi_albert(12, 2, &mut rng).unwrap();
        assert_eq!(graph.edges.len(), (12 - 2) * 2);
        let unique: BTreeSet<_> = graph.edges.iter().collect();
        assert_eq!(unique.len(), graph.edges.len());
        assert!(barabasi_albert(3, 3, &mut rng).is_err());
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let params = TopologyParams {
            n_islands: 15,
            p: 0.4,
            seed: Some(99),
            ..TopologyParams::default()
        };
        let a = GeneratorKind::ErdosRenyi.generate(&params).unwrap();
        let b = GeneratorKind::ErdosRenyi.generate(&params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_directedness() {
        let params = TopologyParams::default();
        assert!(GeneratorKind::OneWayRing.is_directed(&params));
        assert!(!GeneratorKind::BidirRing.is_directed(&params));
        let directed = TopologyParams {
            directed: true,
            ..TopologyParams::default()
        };
        assert!(GeneratorKind::ErdosRenyi.is_directed(&directed));
    }
}
