use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use lunarnet::config_loader;
use lunarnet::map_export::{self, MapFormat};
use lunarnet::node_config;
use lunarnet::settings::Settings;
use lunarnet::topology::{self, LinkResolver, LoggingSimulator, PathError, TopologyGraph};
use lunarnet::utils;

/// Topology graph engine for lunar surface wireless networks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a YAML settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the settings file
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List topology files in the configuration directory
    List,

    /// Print every node section of a topology file
    Show {
        /// Topology file, or its name inside the configuration directory
        config: PathBuf,
    },

    /// Run the transmission simulator over every configured link
    Simulate {
        config: PathBuf,

        /// Issue simulator calls in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Find the lowest-cost route between two nodes
    Path {
        config: PathBuf,
        start: String,
        goal: String,
    },

    /// Export the node layout for visualization
    Map {
        config: PathBuf,

        /// Output file (defaults to the settings file's map output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format; inferred from the output extension when omitted
        #[arg(long, value_enum)]
        format: Option<MapFormat>,
    },

    /// Report suspicious structure in a topology
    Check { config: PathBuf },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();
    let settings = config_loader::load_settings_or_default(cli.settings.as_deref())?;

    let log_level = cli.log_level.clone().unwrap_or_else(|| settings.general.log_level.clone());
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match &cli.command {
        Commands::List => list_configs(&settings),
        Commands::Show { config } => show_config(&settings, config),
        Commands::Simulate { config, parallel } => simulate(&settings, config, *parallel),
        Commands::Path { config, start, goal } => find_path(&settings, config, start, goal),
        Commands::Map { config, output, format } => {
            export_map(&settings, config, output.as_deref(), *format)
        }
        Commands::Check { config } => check(&settings, config),
    }
}

fn topology_path(settings: &Settings, config: &Path) -> Result<PathBuf> {
    config_loader::resolve_topology_path(
        config,
        &settings.general.config_dir,
        &settings.general.config_extension,
    )
}

fn load_graph(settings: &Settings, config: &Path) -> Result<TopologyGraph> {
    let path = topology_path(settings, config)?;
    let nodes = node_config::parse_topology_with(&path, &settings.parse_options())?;
    Ok(topology::build_graph(nodes))
}

fn list_configs(settings: &Settings) -> Result<()> {
    let dir = &settings.general.config_dir;
    let files = utils::list_config_files(dir, &settings.general.config_extension)?;

    if files.is_empty() {
        println!("No configuration files found in '{}'", dir.display());
        return Ok(());
    }

    println!("Available configuration files:");
    for (index, file) in files.iter().enumerate() {
        let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        println!("  [{}] {}", index + 1, name);
    }
    Ok(())
}

fn show_config(settings: &Settings, config: &Path) -> Result<()> {
    let path = topology_path(settings, config)?;
    let content = fs::read_to_string(&path)
        .wrap_err_with(|| format!("Could not open file: {}", path.display()))?;

    let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    println!("=== Displaying {} ===", file_name);

    let sections = node_config::describe_sections(&content);
    for section in &sections {
        println!();
        println!("--------------------------------------");
        println!(" Node Configuration #{}", section.index);
        println!("--------------------------------------");
        for (key, value) in &section.fields {
            println!("{:<25}: {}", key, value);
        }
    }

    println!();
    if sections.is_empty() {
        warn!("No node configuration sections found");
    } else {
        println!("Displayed {} node configurations.", sections.len());
    }
    Ok(())
}

fn simulate(settings: &Settings, config: &Path, parallel: bool) -> Result<()> {
    let graph = load_graph(settings, config)?;

    let resolver = LinkResolver::new()
        .parallel(parallel || settings.resolver.parallel)
        .slow_call_warning(settings.resolver.slow_call_warning);
    let failures = resolver.resolve(&graph, &LoggingSimulator);

    if failures.is_empty() {
        println!("All {} links resolved.", graph.edge_count());
    } else {
        println!("{} links could not be resolved:", failures.len());
        for failure in &failures {
            println!("  - {}", failure);
        }
    }
    Ok(())
}

fn find_path(settings: &Settings, config: &Path, start: &str, goal: &str) -> Result<()> {
    let graph = load_graph(settings, config)?;

    println!("Available nodes:");
    for node in graph.nodes() {
        println!("  - {}", node.name);
    }

    match topology::find_path(&graph, start, goal) {
        Ok(path) => {
            println!();
            println!("Optimal path:\n  {}", path);
            println!("Total distance: {:.3} m ({} hops)", path.total_distance, path.hop_count());
            Ok(())
        }
        Err(PathError::NoPathFound { .. }) => {
            println!();
            println!("No valid path found between {} and {}.", start, goal);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn export_map(
    settings: &Settings,
    config: &Path,
    output: Option<&Path>,
    format: Option<MapFormat>,
) -> Result<()> {
    let graph = load_graph(settings, config)?;

    let output = output.unwrap_or(settings.map.output.as_path());
    let format = format
        .or_else(|| match output.extension().and_then(|ext| ext.to_str()) {
            Some("dot" | "gv") => Some(MapFormat::Dot),
            Some("json") => Some(MapFormat::Json),
            _ => None,
        })
        .unwrap_or(settings.map.format);

    info!("Generating {:?} map for {} nodes: {}", format, graph.len(), output.display());
    let renderer = format.renderer(output);
    map_export::export_map(graph.nodes(), renderer.as_ref())
}

fn check(settings: &Settings, config: &Path) -> Result<()> {
    let graph = load_graph(settings, config)?;
    let report = utils::check_topology(&graph);

    println!("Nodes: {}  Links: {}", report.node_count, report.edge_count);
    if report.is_clean() {
        println!("No findings.");
    } else {
        for finding in report.findings() {
            println!("  - {}", finding);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["lunarnet", "path", "surface.txt", "EarthStation", "UE2"]);

        assert!(cli.settings.is_none());
        match cli.command {
            Commands::Path { config, start, goal } => {
                assert_eq!(config, PathBuf::from("surface.txt"));
                assert_eq!(start, "EarthStation");
                assert_eq!(goal, "UE2");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_map_args() {
        let cli = Cli::parse_from([
            "lunarnet",
            "--settings", "lunarnet.yaml",
            "--log-level", "debug",
            "map", "surface.txt",
            "--output", "out/map.dot",
            "--format", "dot",
        ]);

        assert_eq!(cli.settings, Some(PathBuf::from("lunarnet.yaml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Map { output, format, .. } => {
                assert_eq!(output, Some(PathBuf::from("out/map.dot")));
                assert_eq!(format, Some(MapFormat::Dot));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_simulate_args() {
        let cli = Cli::parse_from(["lunarnet", "simulate", "surface", "--parallel"]);
        assert!(matches!(cli.command, Commands::Simulate { parallel: true, .. }));
    }
}
