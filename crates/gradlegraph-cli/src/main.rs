use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gradlegraph_core::{Config, LoadReport, ResolutionKind, TypeMapping};
use gradlegraph_engine::DependencyLoader;
use gradlegraph_store::{GraphSnapshot, GraphStore, MemoryStore};

/// Default config file looked up in the working directory
const DEFAULT_CONFIG: &str = "gradlegraph.toml";

/// gradlegraph - Load Gradle dependency reports into an artifact graph
#[derive(Parser)]
#[command(name = "gradlegraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dependency report file, or a directory of report files
    path: PathBuf,

    /// Type-mapping file with one prefix=TYPE entry per line
    mapping_file: Option<PathBuf>,

    /// Path to config file (default: gradlegraph.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the resulting graph as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the load report as JSON
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Include constrained "(c)" dependency lines
    #[arg(long)]
    include_constrained: bool,

    /// Include omitted "(*)" dependency lines
    #[arg(long)]
    include_omitted: bool,

    /// Include not-resolved "(n)" dependency lines
    #[arg(long)]
    include_not_resolved: bool,

    /// Keep the existing graph instead of purging it before loading
    ///
    /// With --output, an existing graph file is loaded first and extended.
    #[arg(long)]
    no_purge: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let mapping = select_mapping(cli.mapping_file.as_deref(), &config);

    if cli.verbose {
        eprintln!(
            "{} {} type mapping entries, resolution {:?}",
            "Using".cyan(),
            mapping.len(),
            config.resolution
        );
    }

    let mut store = initial_store(&cli, &config)?;
    let loader = DependencyLoader::from_config(&config, mapping);

    let report = loader
        .load_path(&mut store, &cli.path)
        .with_context(|| format!("Failed to load {}", cli.path.display()))?;

    print_file_results(&report);

    if let Some(output) = &cli.output {
        store
            .snapshot()
            .save_to_file(output)
            .with_context(|| format!("Failed to write graph to {}", output.display()))?;
        eprintln!("{} {}", "Graph saved to:".green(), output.display());
    }

    if let Some(report_path) = &cli.report {
        report
            .save_to_file(report_path)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        eprintln!("{} {}", "Report saved to:".green(), report_path.display());
    }

    print_summary(&report, &store);

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Config file, then environment, then command-line flags
fn load_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        tracing::debug!("no config file found, using defaults");
        Config::default()
    };

    let mut config = config.with_env_overrides()?;

    let flags = [
        (ResolutionKind::Constrained, cli.include_constrained),
        (ResolutionKind::Omitted, cli.include_omitted),
        (ResolutionKind::NotResolved, cli.include_not_resolved),
    ];
    for (kind, enabled) in flags {
        if enabled {
            config.resolution.set_enabled(kind, true);
        }
    }

    if cli.no_purge {
        config.purge_before_load = false;
    }

    Ok(config)
}

/// Mapping file, then the config's inline table, then the built-in table
///
/// A mapping file that cannot be used is reported and skipped.
fn select_mapping(mapping_file: Option<&Path>, config: &Config) -> TypeMapping {
    if let Some(path) = mapping_file {
        match TypeMapping::from_file(path) {
            Ok(mapping) if !mapping.is_empty() => return mapping,
            Ok(_) => tracing::warn!(path = %path.display(), "mapping file has no entries, ignoring it"),
            Err(err) => tracing::warn!(path = %path.display(), "{}", err.to_diagnostic()),
        }
    }

    config.type_mapping().unwrap_or_default()
}

/// Empty store, or the previous graph when extending it
fn initial_store(cli: &Cli, config: &Config) -> Result<MemoryStore> {
    match &cli.output {
        Some(output) if !config.purge_before_load && output.exists() => {
            let snapshot = GraphSnapshot::load_from_file(output)
                .with_context(|| format!("Failed to read existing graph {}", output.display()))?;
            let store = MemoryStore::from_snapshot(snapshot)?;
            tracing::info!(path = %output.display(), "extending existing graph");
            Ok(store)
        }
        _ => Ok(MemoryStore::new()),
    }
}

fn print_file_results(report: &LoadReport) {
    for file in &report.files {
        match &file.diagnostic {
            None => println!("{} {} completed.", "✓".green(), file.path),
            Some(diag) => println!("{} {}: {}", "✗".red(), file.path, diag.message),
        }
    }
}

fn print_summary(report: &LoadReport, store: &MemoryStore) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Dependency Load Summary".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!("Store: {}", store.name());
    println!();

    let summary = &report.summary;
    println!("{}", "Summary:".bold());
    println!("  Files:   {}", summary.files_total);
    println!("  Loaded:  {}", summary.files_loaded.to_string().green());

    if summary.files_failed > 0 {
        println!("  Failed:  {}", summary.files_failed.to_string().red().bold());
    } else {
        println!("  Failed:  {}", summary.files_failed.to_string().green());
    }

    println!("  Tree lines:    {}", summary.tree_lines);
    println!("  Skipped lines: {}", summary.skipped_lines);
    println!("  Nodes: {}", summary.nodes);
    println!("  Edges: {}", summary.edges);
    println!();

    if report.has_failures() {
        println!("{}", "Rolled back:".bold());
        for diag in report.diagnostics() {
            let location = diag
                .location
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            println!("  [{}] {}: {}", diag.code.as_str().red(), location, diag.message);
            if let Some(snippet) = &diag.snippet {
                println!("      {}", snippet.dimmed());
            }
        }
    } else {
        println!("{}", "✓ All reports loaded!".green().bold());
    }

    println!("{}", "=".repeat(60).bright_blue());
}
