//! Migration topologies
//!
//! Graph structure over island identifiers, the generator library and the
//! factory that pairs generated graphs with islands.

pub mod factory;
pub mod generators;
pub mod graph;

pub mod prelude {
    pub use super::factory::*;
    pub use super::generators::{GeneratorKind, IndexGraph, TopologyParams};
    pub use super::graph::*;
}
