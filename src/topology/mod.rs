//! Network topology module.
//!
//! This module contains the parsed node types, the directed topology graph,
//! the link resolution pass and the optimal path search.

pub mod types;
pub mod graph;
pub mod links;
pub mod path;

// Re-export key types and functions for easier access
pub use types::{NodeRecord, Position};
pub use graph::{build_graph, TopologyGraph, UnresolvedLink};
pub use links::{
    effective_rate, resolve_links, LinkResolutionFailure, LinkResolver, LoggingSimulator,
    TransmissionRequest, TransmissionSimulator,
};
pub use path::{find_path, OptimalPath, PathError};
