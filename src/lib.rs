//! # LunarNet - topology graph engine for lunar surface wireless networks
//!
//! This library turns a line-oriented node configuration into a directed
//! topology graph, derives per-link transmission parameters, and answers
//! shortest-path queries between named nodes.
//!
//! ## Overview
//!
//! A topology describes gateways, base stations and user terminals placed in
//! a single Cartesian frame. Each node declares the neighbors it transmits to.
//! Radio simulation and map rendering are left to external collaborators,
//! reached through the [`topology::TransmissionSimulator`] and
//! [`map_export::MapRenderer`] traits.
//!
//! ## Architecture
//!
//! - `node_config`: configuration parser and section browser
//! - `topology`: node types, graph builder, link resolver, optimal path finder
//! - `map_export`: map export adapter and bundled JSON/GraphViz renderers
//! - `settings`: application settings structures
//! - `config_loader`: settings loading and topology path resolution
//! - `utils`: configuration discovery and topology health checks
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use lunarnet::node_config::parse_topology;
//! use lunarnet::topology::{build_graph, find_path, resolve_links, LoggingSimulator};
//!
//! let nodes = parse_topology(Path::new("config/lunar_surface.txt"))?;
//! let graph = build_graph(nodes);
//!
//! let failures = resolve_links(&graph, &LoggingSimulator);
//! for failure in &failures {
//!     eprintln!("{}", failure);
//! }
//!
//! let path = find_path(&graph, "EarthStation", "UE2")?;
//! println!("{} ({:.1} m)", path, path.total_distance);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration Format
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
//! ## Error Handling
//!
//! Library operations return typed errors (`ParseError`, `PathError`,
//! `LinkResolutionFailure`) built with `thiserror`. Application glue such as
//! settings loading and map rendering uses `color_eyre` reports.

pub mod config_loader;
pub mod map_export;
pub mod node_config;
pub mod settings;
pub mod topology;
pub mod utils;
