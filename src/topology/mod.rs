//! Topology data model and builder.
//!
//! This is the core of the crate: folding one-sided neighbor observations
//! from every device in the fleet into a deduplicated, undirected graph of
//! hosts and labeled links.

mod builder;
mod graph;

pub use builder::TopologyBuilder;
pub use graph::{Link, NeighborObservation, Node, PairKey, TopologyGraph, normalize_hostname};
