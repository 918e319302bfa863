//! Topology health checks.
//!
//! None of these findings stop the engine from working; they point at
//! configurations that are probably not what their author meant.

use std::collections::HashSet;

use crate::topology::graph::{TopologyGraph, UnresolvedLink};

/// Findings of [`check_topology`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub unresolved_links: Vec<UnresolvedLink>,
    pub duplicate_names: Vec<String>,
    /// Nodes with no resolved link in either direction
    pub isolated_nodes: Vec<String>,
    pub self_links: Vec<String>,
    /// Links between distinct nodes that share a position
    pub zero_length_links: Vec<(String, String)>,
}

impl TopologyReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved_links.is_empty()
            && self.duplicate_names.is_empty()
            && self.isolated_nodes.is_empty()
            && self.self_links.is_empty()
            && self.zero_length_links.is_empty()
    }

    /// One line per finding
    pub fn findings(&self) -> Vec<String> {
        let mut findings = Vec::new();

        for link in &self.unresolved_links {
            findings.push(format!("Node '{}' links to unknown node '{}'", link.from, link.to));
        }
        for name in &self.duplicate_names {
            findings.push(format!("Node name '{}' is defined more than once; the last definition is used", name));
        }
        for name in &self.isolated_nodes {
            findings.push(format!("Node '{}' has no links in either direction", name));
        }
        for name in &self.self_links {
            findings.push(format!("Node '{}' links to itself", name));
        }
        for (from, to) in &self.zero_length_links {
            findings.push(format!("Nodes '{}' and '{}' share a position; their link has zero length", from, to));
        }

        findings
    }
}

/// Inspect a graph for suspicious structure
pub fn check_topology(graph: &TopologyGraph) -> TopologyReport {
    let mut report = TopologyReport {
        node_count: graph.len(),
        edge_count: graph.edge_count(),
        unresolved_links: graph.unresolved_links().to_vec(),
        duplicate_names: graph.duplicate_names().to_vec(),
        ..TopologyReport::default()
    };

    let mut linked: HashSet<&str> = HashSet::new();
    for node in graph.nodes() {
        for neighbor in graph.neighbors(&node.name) {
            linked.insert(node.name.as_str());
            linked.insert(neighbor.as_str());

            if *neighbor == node.name {
                report.self_links.push(node.name.clone());
            } else if graph.distance_between(&node.name, neighbor) == Some(0.0) {
                report.zero_length_links.push((node.name.clone(), neighbor.clone()));
            }
        }
    }

    report.isolated_nodes = graph
        .nodes()
        .iter()
        .filter(|node| !linked.contains(node.name.as_str()))
        .map(|node| node.name.clone())
        .collect();

    if report.is_clean() {
        log::info!("Topology check: {} nodes, {} links, no findings", report.node_count, report.edge_count);
    } else {
        log::warn!("Topology check: {} findings", report.findings().len());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::graph::build_graph;
    use crate::topology::types::{NodeRecord, Position};

    fn node(name: &str, x: f64, links: &[&str]) -> NodeRecord {
        NodeRecord::new(name, Position::new(x, 0.0, 0.0)).with_links(links.iter().copied())
    }

    #[test]
    fn test_clean_topology() {
        let graph = build_graph(vec![node("A", 0.0, &["B"]), node("B", 1.0, &["A"])]);
        let report = check_topology(&graph);

        assert!(report.is_clean());
        assert!(report.findings().is_empty());
        assert_eq!(report.node_count, 2);
        assert_eq!(report.edge_count, 2);
    }

    #[test]
    fn test_findings() {
        let graph = build_graph(vec![
            node("A", 0.0, &["B", "Ghost", "A"]),
            node("B", 0.0, &[]),
            node("Lonely", 5.0, &[]),
            node("B", 0.0, &[]),
        ]);
        let report = check_topology(&graph);

        assert!(!report.is_clean());
        assert_eq!(report.unresolved_links.len(), 1);
        assert_eq!(report.unresolved_links[0].to, "Ghost");
        assert_eq!(report.duplicate_names, vec!["B"]);
        assert_eq!(report.isolated_nodes, vec!["Lonely"]);
        assert_eq!(report.self_links, vec!["A"]);
        assert_eq!(report.zero_length_links, vec![("A".to_string(), "B".to_string())]);

        let findings = report.findings();
        assert_eq!(findings.len(), 5);
        assert!(findings[0].contains("Ghost"));
    }

    #[test]
    fn test_incoming_link_is_not_isolated() {
        let graph = build_graph(vec![node("A", 0.0, &["B"]), node("B", 1.0, &[])]);
        assert!(check_topology(&graph).isolated_nodes.is_empty());
    }
}
