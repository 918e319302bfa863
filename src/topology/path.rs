//! Optimal path search.
//!
//! Dijkstra over the resolved adjacency with Euclidean distance as the edge
//! weight. The queue is lazy: a node is pushed again whenever its tentative
//! distance improves, and stale entries are skipped when popped.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use log::{debug, info};

use super::graph::TopologyGraph;

/// Errors returned by [`find_path`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("no path from '{start}' to '{goal}'")]
    NoPathFound { start: String, goal: String },

    #[error("path reconstruction from '{goal}' stopped at '{stopped_at}' instead of '{start}'")]
    Reconstruction {
        start: String,
        goal: String,
        stopped_at: String,
    },
}

/// A lowest-cost route between two nodes
#[derive(Debug, Clone, PartialEq)]
pub struct OptimalPath {
    /// Node names from start to goal, both included
    pub nodes: Vec<String>,
    /// Sum of Euclidean edge lengths in metres
    pub total_distance: f64,
}

impl OptimalPath {
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

impl fmt::Display for OptimalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nodes.join(" -> "))
    }
}

/// Priority queue entry ordered as a min-heap on distance.
///
/// Equal distances fall back to the node name so results do not depend on
/// insertion order.
#[derive(Debug)]
struct QueueEntry<'a> {
    distance: f64,
    name: &'a str,
}

impl PartialEq for QueueEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry<'_> {}

impl Ord for QueueEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.name.cmp(self.name))
    }
}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the shortest route from `start` to `goal`.
///
/// Unreachable goals yield [`PathError::NoPathFound`]. A start equal to the
/// goal yields a single-node path of length zero.
pub fn find_path(graph: &TopologyGraph, start: &str, goal: &str) -> Result<OptimalPath, PathError> {
    for name in [start, goal] {
        if !graph.contains(name) {
            return Err(PathError::UnknownNode(name.to_string()));
        }
    }

    let mut dist: HashMap<&str, f64> = HashMap::with_capacity(graph.len());
    let mut prev: HashMap<&str, &str> = HashMap::new();
    let mut queue = BinaryHeap::new();

    dist.insert(start, 0.0);
    queue.push(QueueEntry {
        distance: 0.0,
        name: start,
    });

    let mut expanded = 0usize;
    while let Some(QueueEntry { distance, name }) = queue.pop() {
        if name == goal {
            break;
        }
        if distance > dist.get(name).copied().unwrap_or(f64::INFINITY) {
            continue;
        }
        expanded += 1;

        let Some(current) = graph.node(name) else {
            continue;
        };
        for neighbor_name in graph.neighbors(name) {
            let Some(neighbor) = graph.node(neighbor_name) else {
                continue;
            };
            let alt = distance + current.distance_to(neighbor);
            let best = dist.get(neighbor_name.as_str()).copied().unwrap_or(f64::INFINITY);
            if alt < best {
                dist.insert(neighbor_name.as_str(), alt);
                prev.insert(neighbor_name.as_str(), name);
                queue.push(QueueEntry {
                    distance: alt,
                    name: neighbor_name.as_str(),
                });
            }
        }
    }
    debug!("Path search {} -> {} expanded {} nodes", start, goal, expanded);

    let Some(&total_distance) = dist.get(goal) else {
        return Err(PathError::NoPathFound {
            start: start.to_string(),
            goal: goal.to_string(),
        });
    };

    let nodes = reconstruct(&prev, start, goal, graph.len())?;
    let path = OptimalPath {
        nodes,
        total_distance,
    };
    info!("Optimal path: {} ({:.3} m)", path, path.total_distance);
    Ok(path)
}

/// Walk predecessors back from `goal`; the walk must end exactly at `start`
fn reconstruct(
    prev: &HashMap<&str, &str>,
    start: &str,
    goal: &str,
    node_count: usize,
) -> Result<Vec<String>, PathError> {
    let mut path = vec![goal.to_string()];
    let mut at = goal;

    while let Some(&before) = prev.get(at) {
        if path.len() > node_count {
            return Err(PathError::Reconstruction {
                start: start.to_string(),
                goal: goal.to_string(),
                stopped_at: at.to_string(),
            });
        }
        path.push(before.to_string());
        at = before;
        if at == start {
            break;
        }
    }

    if at != start {
        return Err(PathError::Reconstruction {
            start: start.to_string(),
            goal: goal.to_string(),
            stopped_at: at.to_string(),
        });
    }

    path.reverse();
    Ok(path)
}
