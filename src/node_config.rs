//! Parser for line-oriented node configuration files.
//!
//! A configuration is a sequence of node blocks. Each block is opened by a
//! sentinel line (a line without a colon that contains `NODECONFIGHEADER`) and
//! closed by the next sentinel or the end of input:
//!
//! ```text
//! NODECONFIGHEADER
//! Name: "GatewayA"
//! Type: "Gateway"
//! Location: 0.0, 0.0, 0.0
//! Transmission Frequency: 2100
//! Transmission Power: 33
//! Transmission Data Rate: OfdmRate6Mbps
//! Receiver Data Rate: OfdmRate6Mbps
//! Linked Nodes: "gNB0", "gNB1"
//! ```
//!
//! Every other line is split at its first colon into a label and a value. The
//! label is matched case-insensitively against a fixed set of [`FieldKey`]s;
//! lines with unknown labels or without a colon are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::topology::types::{NodeRecord, Position};

/// Sentinel that opens a new node block
pub const NODE_HEADER: &str = "NODECONFIGHEADER";

/// Errors that can occur while parsing a node configuration
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("configuration file not found or unreadable: {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read configuration file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("node '{node}': invalid number '{value}' in field '{field}'")]
    InvalidNumber {
        node: String,
        field: &'static str,
        value: String,
    },

    #[error("node '{node}': missing mandatory field '{field}'")]
    MissingField { node: String, field: &'static str },
}

/// Field labels recognized inside a node block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Name,
    Type,
    Location,
    TransmissionFrequency,
    TransmissionPower,
    TransmissionDataRate,
    ReceiverDataRate,
    LinkedNodes,
}

impl FieldKey {
    pub const ALL: [FieldKey; 8] = [
        FieldKey::Name,
        FieldKey::Type,
        FieldKey::Location,
        FieldKey::TransmissionFrequency,
        FieldKey::TransmissionPower,
        FieldKey::TransmissionDataRate,
        FieldKey::ReceiverDataRate,
        FieldKey::LinkedNodes,
    ];

    /// Canonical label as written in configuration files
    pub fn label(self) -> &'static str {
        match self {
            FieldKey::Name => "Name",
            FieldKey::Type => "Type",
            FieldKey::Location => "Location",
            FieldKey::TransmissionFrequency => "Transmission Frequency",
            FieldKey::TransmissionPower => "Transmission Power",
            FieldKey::TransmissionDataRate => "Transmission Data Rate",
            FieldKey::ReceiverDataRate => "Receiver Data Rate",
            FieldKey::LinkedNodes => "Linked Nodes",
        }
    }

    /// Match a label case-insensitively, tolerating repeated inner whitespace
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ALL
            .into_iter()
            .find(|key| key.label().eq_ignore_ascii_case(&normalized))
    }
}

/// Options controlling how strictly node blocks are validated
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Place nodes without a location at the origin and default missing radio
    /// parameters to 0.0 instead of failing
    pub lenient_defaults: bool,
}

/// Classification of a single configuration line
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Header,
    Field(FieldKey, &'a str),
    Ignored,
}

/// Only colon-free lines can be sentinels, so a field value mentioning the
/// marker never opens a block.
fn classify_line(line: &str) -> Line<'_> {
    match split_field(line) {
        Some((label, value)) => match FieldKey::from_label(label) {
            Some(key) => Line::Field(key, value),
            None => Line::Ignored,
        },
        None if line.to_ascii_uppercase().contains(NODE_HEADER) => Line::Header,
        None => Line::Ignored,
    }
}

/// Split a line at its first colon into a trimmed label and the raw value
pub fn split_field(line: &str) -> Option<(&str, &str)> {
    line.split_once(':').map(|(label, value)| (label.trim(), value))
}

/// Strip surrounding whitespace and double quotes from a value
pub fn clean_value(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '"')
}

/// Split a `Linked Nodes` value on commas and whitespace into clean names
pub fn parse_link_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(clean_value)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number(node: &str, key: FieldKey, raw: &str) -> Result<f64, ParseError> {
    let value = clean_value(raw);
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(ParseError::InvalidNumber {
            node: node.to_string(),
            field: key.label(),
            value: value.to_string(),
        }),
    }
}

/// Parse up to three comma- or whitespace-separated coordinates.
///
/// Returns `Ok(None)` when the value holds no numbers at all. Missing trailing
/// coordinates stay at 0.0.
fn parse_location(node: &str, raw: &str) -> Result<Option<Position>, ParseError> {
    let tokens: Vec<&str> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(clean_value)
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.is_empty() {
        return Ok(None);
    }
    if tokens.len() > 3 {
        debug!("Node '{}': ignoring {} extra location values", node, tokens.len() - 3);
    }

    let mut coords = [0.0; 3];
    for (slot, token) in coords.iter_mut().zip(&tokens) {
        *slot = parse_number(node, FieldKey::Location, token)?;
    }

    Ok(Some(Position::new(coords[0], coords[1], coords[2])))
}

/// Raw field values of the block currently being read.
///
/// Numeric fields stay unparsed until the block closes so that errors can
/// name the node even when its `Name:` line comes after the bad value.
#[derive(Debug, Default)]
struct PendingBlock {
    name: String,
    kind: String,
    location: Option<String>,
    frequency: Option<String>,
    power: Option<String>,
    tx_rate: String,
    rx_rate: String,
    links: Vec<String>,
}

impl PendingBlock {
    fn apply(&mut self, key: FieldKey, value: &str) {
        match key {
            FieldKey::Name => self.name = clean_value(value).to_string(),
            FieldKey::Type => self.kind = clean_value(value).to_string(),
            FieldKey::Location => self.location = Some(value.to_string()),
            FieldKey::TransmissionFrequency => self.frequency = Some(value.to_string()),
            FieldKey::TransmissionPower => self.power = Some(value.to_string()),
            FieldKey::TransmissionDataRate => self.tx_rate = clean_value(value).to_string(),
            FieldKey::ReceiverDataRate => self.rx_rate = clean_value(value).to_string(),
            FieldKey::LinkedNodes => self.links.extend(parse_link_list(value)),
        }
    }

    fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    fn finish(self, options: &ParseOptions) -> Result<NodeRecord, ParseError> {
        let name = self.name;

        let location = match &self.location {
            Some(raw) => parse_location(&name, raw)?,
            None => None,
        };
        let position = match location {
            Some(position) => position,
            None if options.lenient_defaults => {
                warn!("Node '{}' has no '{}' field, defaulting to the origin", name, FieldKey::Location.label());
                Position::default()
            }
            None => {
                return Err(ParseError::MissingField {
                    node: name,
                    field: FieldKey::Location.label(),
                })
            }
        };

        let frequency_mhz =
            radio_field(&name, FieldKey::TransmissionFrequency, self.frequency.as_deref(), options)?;
        let tx_power_dbm =
            radio_field(&name, FieldKey::TransmissionPower, self.power.as_deref(), options)?;

        Ok(NodeRecord {
            name,
            kind: self.kind,
            position,
            frequency_mhz,
            tx_power_dbm,
            tx_rate: self.tx_rate,
            rx_rate: self.rx_rate,
            links: self.links,
        })
    }
}

/// Radio parameters are only needed for link simulation, so an absent line
/// stays `None` unless lenient defaults are on.
fn radio_field(
    node: &str,
    key: FieldKey,
    raw: Option<&str>,
    options: &ParseOptions,
) -> Result<Option<f64>, ParseError> {
    match raw {
        Some(raw) => parse_number(node, key, raw).map(Some),
        None if options.lenient_defaults => {
            warn!("Node '{}' has no '{}' field, defaulting to 0.0", node, key.label());
            Ok(Some(0.0))
        }
        None => Ok(None),
    }
}

/// Incremental parser fed one line at a time
#[derive(Debug, Default)]
pub struct NodeConfigParser {
    options: ParseOptions,
    current: PendingBlock,
    nodes: Vec<NodeRecord>,
}

impl NodeConfigParser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            current: PendingBlock::default(),
            nodes: Vec::new(),
        }
    }

    /// Consume one line of configuration text
    pub fn feed_line(&mut self, line: &str) -> Result<(), ParseError> {
        match classify_line(line) {
            Line::Header => self.close_block(),
            Line::Field(key, value) => {
                self.current.apply(key, value);
                Ok(())
            }
            Line::Ignored => Ok(()),
        }
    }

    fn close_block(&mut self) -> Result<(), ParseError> {
        let block = std::mem::take(&mut self.current);
        if block.is_named() {
            self.nodes.push(block.finish(&self.options)?);
        } else if block.location.is_some() || !block.links.is_empty() {
            debug!("Discarding node block without a name");
        }
        Ok(())
    }

    /// Close the trailing block and return all parsed records in file order
    pub fn finish(mut self) -> Result<Vec<NodeRecord>, ParseError> {
        self.close_block()?;
        Ok(self.nodes)
    }
}

/// Parse a configuration held in memory
pub fn parse_topology_str(content: &str, options: &ParseOptions) -> Result<Vec<NodeRecord>, ParseError> {
    let mut parser = NodeConfigParser::new(options.clone());
    for line in content.lines() {
        parser.feed_line(line)?;
    }
    parser.finish()
}

/// Parse a configuration file with default (strict) options
pub fn parse_topology(path: &Path) -> Result<Vec<NodeRecord>, ParseError> {
    parse_topology_with(path, &ParseOptions::default())
}

/// Parse a configuration file
pub fn parse_topology_with(path: &Path, options: &ParseOptions) -> Result<Vec<NodeRecord>, ParseError> {
    info!("Reading node configuration: {}", path.display());

    let file = File::open(path).map_err(|source| ParseError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let mut parser = NodeConfigParser::new(options.clone());
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        parser.feed_line(&line)?;
    }

    let nodes = parser.finish()?;
    info!("Parsed {} nodes from {}", nodes.len(), path.display());
    Ok(nodes)
}

/// One node section of a configuration, as shown by the browser
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSection {
    /// 1-based section number in file order
    pub index: usize,
    /// Cleaned `(label, value)` pairs in file order
    pub fields: Vec<(String, String)>,
}

/// Split configuration text into sections for display.
///
/// Unlike the parser this keeps every `label: value` line, recognized or not.
/// Lines before the first sentinel, blank lines and lines without a colon are
/// skipped.
pub fn describe_sections(content: &str) -> Vec<ConfigSection> {
    let mut sections: Vec<ConfigSection> = Vec::new();

    for line in content.lines() {
        if classify_line(line) == Line::Header {
            sections.push(ConfigSection {
                index: sections.len() + 1,
                fields: Vec::new(),
            });
            continue;
        }

        let Some(section) = sections.last_mut() else {
            continue;
        };
        if let Some((label, value)) = split_field(line) {
            section
                .fields
                .push((clean_value(label).to_string(), clean_value(value).to_string()));
        }
    }

    sections
}
