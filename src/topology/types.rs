//! Topology type definitions.
//!
//! Plain data carried from the configuration parser into the graph: one
//! [`NodeRecord`] per node block, positioned in a single shared Cartesian frame.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cartesian coordinates in metres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position, in metres
    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x)
            .hypot(self.y - other.y)
            .hypot(self.z - other.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One parsed network element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Identifier, expected to be unique within a topology
    pub name: String,
    /// Free-text category ("Gateway", "Base Station", "User Equipment", ...)
    pub kind: String,
    pub position: Position,
    /// `None` when the block has no `Transmission Frequency` line
    pub frequency_mhz: Option<f64>,
    pub tx_power_dbm: Option<f64>,
    /// Nominal data-rate label, kept verbatim (e.g. "OfdmRate6Mbps")
    pub tx_rate: String,
    pub rx_rate: String,
    /// Outgoing neighbor names in declaration order
    pub links: Vec<String>,
}

impl NodeRecord {
    /// Create a record with the given name and position and empty radio fields
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            kind: String::new(),
            position,
            frequency_mhz: None,
            tx_power_dbm: None,
            tx_rate: String::new(),
            rx_rate: String::new(),
            links: Vec::new(),
        }
    }

    /// Builder-style helper used mostly by tests and fixtures
    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links = links.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_rates(mut self, tx_rate: impl Into<String>, rx_rate: impl Into<String>) -> Self {
        self.tx_rate = tx_rate.into();
        self.rx_rate = rx_rate.into();
        self
    }

    pub fn with_radio(mut self, frequency_mhz: f64, tx_power_dbm: f64) -> Self {
        self.frequency_mhz = Some(frequency_mhz);
        self.tx_power_dbm = Some(tx_power_dbm);
        self
    }

    /// Distance between this node and another, in metres
    pub fn distance_to(&self, other: &NodeRecord) -> f64 {
        self.position.distance_to(&other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_pythagorean() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        let c = Position::new(3.0, 4.0, 5.0);

        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
        assert!((b.distance_to(&c) - 5.0).abs() < 1e-9);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn test_distance_with_huge_coordinates() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(1e200, 0.0, 0.0);
        let c = Position::new(3e200, 4e200, 0.0);

        assert_eq!(a.distance_to(&b), 1e200);
        assert!(a.distance_to(&c).is_finite());
        assert!((a.distance_to(&c) / 5e200 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_new_record_has_no_radio_parameters() {
        let node = NodeRecord::new("UE0", Position::default());
        assert_eq!(node.frequency_mhz, None);
        assert_eq!(node.tx_power_dbm, None);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = NodeRecord::new("A", Position::new(-10.5, 2.0, 7.25));
        let b = NodeRecord::new("B", Position::new(4.0, -3.0, 1.0));
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
    }

    #[test]
    fn test_builder_helpers() {
        let node = NodeRecord::new("gNB0", Position::default())
            .with_kind("Base Station")
            .with_radio(2100.0, 33.0)
            .with_rates("OfdmRate6Mbps", "OfdmRate54Mbps")
            .with_links(["UE0", "UE1"]);

        assert_eq!(node.kind, "Base Station");
        assert_eq!(node.frequency_mhz, Some(2100.0));
        assert_eq!(node.tx_power_dbm, Some(33.0));
        assert_eq!(node.tx_rate, "OfdmRate6Mbps");
        assert_eq!(node.links, vec!["UE0".to_string(), "UE1".to_string()]);
    }
}
