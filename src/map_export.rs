//! Map export adapter.
//!
//! Reshapes parsed node records into [`MapNode`]s (name, kind, position and a
//! display colour derived from the kind) and hands them to a [`MapRenderer`].
//! Two renderers are bundled: a JSON layout document and a GraphViz file with
//! pinned node positions.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::topology::types::{NodeRecord, Position};

/// Display category derived from a node's free-text kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    BaseStation,
    UserEquipment,
    Gateway,
    Other,
}

impl NodeCategory {
    /// Classify by substring, checked in the order base station, user equipment, gateway
    pub fn classify(kind: &str) -> Self {
        if kind.contains("Base Station") || kind.contains("gNB") {
            NodeCategory::BaseStation
        } else if kind.contains("User Equipment") {
            NodeCategory::UserEquipment
        } else if kind.contains("Gateway") {
            NodeCategory::Gateway
        } else {
            NodeCategory::Other
        }
    }

    /// RGB display colour
    pub fn color(self) -> [u8; 3] {
        match self {
            NodeCategory::BaseStation => [0, 128, 0],
            NodeCategory::UserEquipment => [255, 165, 0],
            NodeCategory::Gateway => [0, 0, 255],
            NodeCategory::Other => [200, 200, 200],
        }
    }

    /// Colour as `#rrggbb`
    pub fn hex_color(self) -> String {
        let [r, g, b] = self.color();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// One node as handed to a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub name: String,
    pub kind: String,
    pub position: Position,
    pub category: NodeCategory,
    pub color: String,
}

impl From<&NodeRecord> for MapNode {
    fn from(record: &NodeRecord) -> Self {
        let category = NodeCategory::classify(&record.kind);
        Self {
            name: record.name.clone(),
            kind: record.kind.clone(),
            position: record.position,
            category,
            color: category.hex_color(),
        }
    }
}

/// External map renderer
pub trait MapRenderer {
    fn render_map(&self, nodes: &[MapNode]) -> Result<()>;
}

/// Convert records and forward them to `renderer`
pub fn export_map(records: &[NodeRecord], renderer: &dyn MapRenderer) -> Result<()> {
    if records.is_empty() {
        bail!("No node data provided to the map renderer");
    }

    let nodes: Vec<MapNode> = records.iter().map(MapNode::from).collect();
    for node in &nodes {
        info!(" - Added {} ({}) at {}", node.name, node.kind, node.position);
    }

    renderer.render_map(&nodes)
}

/// Supported on-disk map formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MapFormat {
    #[default]
    Json,
    Dot,
}

impl MapFormat {
    /// Renderer writing this format to `output`
    pub fn renderer(self, output: &Path) -> Box<dyn MapRenderer> {
        match self {
            MapFormat::Json => Box::new(JsonMapRenderer::new(output)),
            MapFormat::Dot => Box::new(DotMapRenderer::new(output)),
        }
    }
}

/// Serialized layout written by [`JsonMapRenderer`]
#[derive(Debug, Serialize, Deserialize)]
pub struct MapDocument {
    pub generated_at: String,
    pub node_count: usize,
    pub nodes: Vec<MapNode>,
}

/// Writes the node layout as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonMapRenderer {
    output: PathBuf,
}

impl JsonMapRenderer {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self { output: output.into() }
    }
}

impl MapRenderer for JsonMapRenderer {
    fn render_map(&self, nodes: &[MapNode]) -> Result<()> {
        let document = MapDocument {
            generated_at: chrono::Utc::now().to_rfc3339(),
            node_count: nodes.len(),
            nodes: nodes.to_vec(),
        };

        let json = serde_json::to_string_pretty(&document)
            .context("Failed to serialize node map to JSON")?;
        write_output(&self.output, &json)?;

        info!("Node map written to {}", self.output.display());
        Ok(())
    }
}

/// Writes a GraphViz graph with nodes pinned at their x/y coordinates
#[derive(Debug, Clone)]
pub struct DotMapRenderer {
    output: PathBuf,
}

impl DotMapRenderer {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self { output: output.into() }
    }
}

/// Render nodes as GraphViz text
pub fn generate_dot(nodes: &[MapNode]) -> String {
    let mut dot = String::new();
    dot.push_str("graph LunarNodeMap {\n");
    dot.push_str("    layout=neato;\n");
    dot.push_str("    node [shape=circle, style=filled];\n");
    dot.push_str("    label=\"Lunar node map\";\n");
    dot.push_str("    labelloc=t;\n\n");

    for node in nodes {
        dot.push_str(&format!(
            "    \"{}\" [label=\"{}\\n{}\", pos=\"{},{}!\", fillcolor=\"{}\"];\n",
            escape_dot(&node.name),
            escape_dot(&node.name),
            escape_dot(&node.kind),
            node.position.x,
            node.position.y,
            node.color
        ));
    }

    dot.push_str("}\n");
    dot
}

fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl MapRenderer for DotMapRenderer {
    fn render_map(&self, nodes: &[MapNode]) -> Result<()> {
        write_output(&self.output, &generate_dot(nodes))?;
        info!("Node map written to {} (render with `neato -n`)", self.output.display());
        Ok(())
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write node map to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    #[derive(Default)]
    struct CapturingRenderer {
        received: RefCell<Vec<MapNode>>,
    }

    impl MapRenderer for CapturingRenderer {
        fn render_map(&self, nodes: &[MapNode]) -> Result<()> {
            self.received.borrow_mut().extend_from_slice(nodes);
            Ok(())
        }
    }

    fn records() -> Vec<NodeRecord> {
        vec![
            NodeRecord::new("GatewayA", Position::new(0.0, 0.0, 0.0)).with_kind("Gateway"),
            NodeRecord::new("gNB0", Position::new(40.0, 10.0, 0.0)).with_kind("gNB"),
            NodeRecord::new("UE0", Position::new(60.0, 25.0, 0.0)).with_kind("User Equipment"),
            NodeRecord::new("Earth", Position::new(-1200.0, 0.0, 0.0)).with_kind("Ground Station"),
        ]
    }

    #[test]
    fn test_classify() {
        assert_eq!(NodeCategory::classify("Base Station"), NodeCategory::BaseStation);
        assert_eq!(NodeCategory::classify("5G gNB"), NodeCategory::BaseStation);
        assert_eq!(NodeCategory::classify("User Equipment"), NodeCategory::UserEquipment);
        assert_eq!(NodeCategory::classify("Lunar Gateway"), NodeCategory::Gateway);
        assert_eq!(NodeCategory::classify("Rover"), NodeCategory::Other);
        assert_eq!(NodeCategory::classify(""), NodeCategory::Other);
    }

    #[test]
    fn test_colors() {
        assert_eq!(NodeCategory::BaseStation.hex_color(), "#008000");
        assert_eq!(NodeCategory::UserEquipment.hex_color(), "#ffa500");
        assert_eq!(NodeCategory::Gateway.hex_color(), "#0000ff");
        assert_eq!(NodeCategory::Other.hex_color(), "#c8c8c8");
    }

    #[test]
    fn test_export_forwards_every_node_in_order() {
        let renderer = CapturingRenderer::default();
        export_map(&records(), &renderer).unwrap();

        let received = renderer.received.borrow();
        let names: Vec<&str> = received.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["GatewayA", "gNB0", "UE0", "Earth"]);
        assert_eq!(received[1].category, NodeCategory::BaseStation);
        assert_eq!(received[1].position, Position::new(40.0, 10.0, 0.0));
        assert_eq!(received[3].color, "#c8c8c8");
    }

    #[test]
    fn test_export_rejects_empty_node_list() {
        let renderer = CapturingRenderer::default();
        assert!(export_map(&[], &renderer).is_err());
        assert!(renderer.received.borrow().is_empty());
    }

    #[test]
    fn test_json_renderer_writes_document() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("maps").join("lunar_node_map.json");

        export_map(&records(), &JsonMapRenderer::new(&output)).unwrap();

        let content = fs::read_to_string(&output).unwrap();
        let document: MapDocument = serde_json::from_str(&content).unwrap();
        assert_eq!(document.node_count, 4);
        assert_eq!(document.nodes[0].name, "GatewayA");
        assert_eq!(document.nodes[0].category, NodeCategory::Gateway);
        assert!(chrono::DateTime::parse_from_rfc3339(&document.generated_at).is_ok());
    }

    #[test]
    fn test_dot_output() {
        let nodes: Vec<MapNode> = records().iter().map(MapNode::from).collect();
        let dot = generate_dot(&nodes);

        assert!(dot.starts_with("graph LunarNodeMap {"));
        assert!(dot.contains("\"gNB0\" [label=\"gNB0\\ngNB\", pos=\"40,10!\", fillcolor=\"#008000\"];"));
        assert!(dot.contains("pos=\"-1200,0!\""));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_dot_escapes_quotes() {
        let node = MapNode::from(&NodeRecord::new("Rover \"R1\"", Position::default()));
        let dot = generate_dot(&[node]);
        assert!(dot.contains("\"Rover \\\"R1\\\"\""));
    }

    #[test]
    fn test_format_renderer_dispatch() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("map.dot");

        let renderer = MapFormat::Dot.renderer(&output);
        export_map(&records(), renderer.as_ref()).unwrap();

        assert!(fs::read_to_string(&output).unwrap().contains("LunarNodeMap"));
    }
}
