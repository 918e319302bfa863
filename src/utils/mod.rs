//! Shared utilities: configuration discovery and topology health checks.

pub mod discovery;
pub mod validation;

pub use discovery::list_config_files;
pub use validation::{check_topology, TopologyReport};
