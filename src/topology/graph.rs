//! Topology graph construction.
//!
//! Turns the parsed node list into a caller-owned graph: an arena of records
//! with a name index and a directed, name-keyed adjacency. Link targets that do
//! not name a node are dropped from the adjacency and remembered as
//! [`UnresolvedLink`]s so later passes can report them.

use std::collections::HashMap;

use log::{debug, warn};

use super::types::NodeRecord;

/// A declared link whose target is not a node of the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLink {
    pub from: String,
    pub to: String,
}

/// Directed topology graph built from one configuration
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    nodes: Vec<NodeRecord>,
    index: HashMap<String, usize>,
    adjacency: HashMap<String, Vec<String>>,
    unresolved: Vec<UnresolvedLink>,
    duplicates: Vec<String>,
}

/// Build a graph from parsed node records.
///
/// Duplicate names follow a last-write-wins policy: the later record replaces
/// the earlier one in place, keeping the slot of the first occurrence, and a
/// warning is logged.
pub fn build_graph(records: Vec<NodeRecord>) -> TopologyGraph {
    let mut nodes: Vec<NodeRecord> = Vec::with_capacity(records.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut duplicates = Vec::new();

    for record in records {
        match index.get(&record.name) {
            Some(&slot) => {
                warn!(
                    "Duplicate node name '{}': later definition replaces the earlier one",
                    record.name
                );
                duplicates.push(record.name.clone());
                nodes[slot] = record;
            }
            None => {
                index.insert(record.name.clone(), nodes.len());
                nodes.push(record);
            }
        }
    }

    let mut adjacency: HashMap<String, Vec<String>> = HashMap::with_capacity(nodes.len());
    let mut unresolved = Vec::new();

    for node in &nodes {
        let mut neighbors = Vec::with_capacity(node.links.len());
        for target in &node.links {
            if index.contains_key(target) {
                neighbors.push(target.clone());
            } else {
                debug!("Node '{}' links to unknown node '{}', dropping link", node.name, target);
                unresolved.push(UnresolvedLink {
                    from: node.name.clone(),
                    to: target.clone(),
                });
            }
        }
        adjacency.insert(node.name.clone(), neighbors);
    }

    let graph = TopologyGraph {
        nodes,
        index,
        adjacency,
        unresolved,
        duplicates,
    };
    debug!(
        "Built topology graph: {} nodes, {} edges, {} unresolved links",
        graph.len(),
        graph.edge_count(),
        graph.unresolved.len()
    );
    graph
}

impl TopologyGraph {
    /// Records in first-appearance order, one per distinct name
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&NodeRecord> {
        self.index.get(name).map(|&slot| &self.nodes[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Resolved outgoing neighbors of `name` in declaration order
    pub fn neighbors(&self, name: &str) -> &[String] {
        self.adjacency.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Euclidean distance between two named nodes, if both exist
    pub fn distance_between(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.node(a)?.distance_to(self.node(b)?))
    }

    /// Declared links that were dropped because their target is unknown
    pub fn unresolved_links(&self) -> &[UnresolvedLink] {
        &self.unresolved
    }

    /// Names that were defined more than once, once per redefinition
    pub fn duplicate_names(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of resolved directed edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::Position;

    fn node(name: &str, x: f64, y: f64, z: f64, links: &[&str]) -> NodeRecord {
        NodeRecord::new(name, Position::new(x, y, z)).with_links(links.iter().copied())
    }

    #[test]
    fn test_build_adjacency() {
        let graph = build_graph(vec![
            node("A", 0.0, 0.0, 0.0, &["B", "C"]),
            node("B", 3.0, 4.0, 0.0, &["C"]),
            node("C", 3.0, 4.0, 5.0, &[]),
        ]);

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors("A"), ["B".to_string(), "C".to_string()]);
        assert!(graph.neighbors("C").is_empty());
        assert!(graph.neighbors("missing").is_empty());
        assert!(graph.unresolved_links().is_empty());
        assert_eq!(graph.distance_between("A", "B"), Some(5.0));
        assert_eq!(graph.distance_between("A", "nowhere"), None);
    }

    #[test]
    fn test_unknown_link_dropped() {
        let graph = build_graph(vec![
            node("A", 0.0, 0.0, 0.0, &["Ghost", "B"]),
            node("B", 1.0, 0.0, 0.0, &[]),
        ]);

        assert_eq!(graph.neighbors("A"), ["B".to_string()]);
        assert_eq!(
            graph.unresolved_links(),
            [UnresolvedLink {
                from: "A".to_string(),
                to: "Ghost".to_string()
            }]
        );
        assert!(!graph.contains("Ghost"));
    }

    #[test]
    fn test_duplicate_name_last_wins() {
        let graph = build_graph(vec![
            node("A", 0.0, 0.0, 0.0, &["B"]),
            node("B", 1.0, 0.0, 0.0, &[]),
            node("A", 9.0, 9.0, 9.0, &["C"]),
            node("C", 2.0, 0.0, 0.0, &[]),
        ]);

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.node("A").unwrap().position, Position::new(9.0, 9.0, 9.0));
        assert_eq!(graph.neighbors("A"), ["C".to_string()]);
        assert_eq!(graph.duplicate_names(), ["A".to_string()]);

        // First-appearance order is kept
        let names: Vec<&str> = graph.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = build_graph(Vec::new());
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }
}
