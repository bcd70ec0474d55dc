//! contentseed - Idempotent demo-content seeding.
//!
//! Usage:
//!   contentseed seed [BUNDLE_DIR]      Seed a fresh in-memory store
//!   contentseed inspect [BUNDLE_DIR]   Dry-run the bundled import
//!   contentseed --help                 Show help

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use contentseed_core::{
    BundledResource, ContentPath, ContentStore, ContextFactory, ElevatingContextFactory,
    ImportParams, Importer, SeedConfig, SeedContext,
};
use contentseed_import::DirectoryImporter;
use contentseed_seed::report::{Section, report_lines};
use contentseed_seed::{SeedOutcome, Seeder};
use contentseed_store::{MemoryContentStore, RoleFlag};

#[derive(Parser)]
#[command(
    name = "contentseed",
    version,
    about = "Idempotent demo-content seeding",
    long_about = "contentseed imports a bundled content tree, generates a large folder \
                  tree and applies a fixed permission set, once, on the cluster master."
)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    log_format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed a fresh in-memory store and show the result
    Seed {
        /// Directory holding the bundled resources (overrides the config)
        bundle: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Behave as a non-master node
        #[arg(long)]
        replica: bool,

        /// Number of activations to run against the same store
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        runs: u32,

        /// Maximum tree depth to display
        #[arg(short, long, default_value = "2")]
        depth: usize,

        /// Number of children to show per node
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Dry-run the bundled import and print its report
    Inspect {
        /// Directory holding the bundled resources (overrides the config)
        bundle: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Command::Seed {
            bundle,
            config,
            replica,
            runs,
            depth,
            top,
            format,
        } => {
            let config = load_config(config.as_deref(), bundle)?;
            run_seed(config, replica, runs, depth, top, format)?;
        }
        Command::Inspect { bundle, config } => {
            let config = load_config(config.as_deref(), bundle)?;
            run_inspect(&config)?;
        }
    }

    Ok(())
}

/// Install the global tracing subscriber, writing to stderr.
fn init_logging(level: &str, format: OutputFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        OutputFormat::Text => builder.try_init(),
        OutputFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| color_eyre::eyre::eyre!("failed to install tracing subscriber: {e}"))
}

/// Load the configuration file, if any, and apply the bundle override.
fn load_config(file: Option<&Path>, bundle: Option<PathBuf>) -> Result<SeedConfig> {
    let mut config = match file {
        Some(path) => SeedConfig::from_toml_file(path).context("Invalid configuration")?,
        None => SeedConfig::default(),
    };
    if let Some(bundle) = bundle {
        config.bundle_dir = bundle;
    }
    Ok(config)
}

/// Run activations against a fresh store and display the outcome.
fn run_seed(
    config: SeedConfig,
    replica: bool,
    runs: u32,
    depth: usize,
    top: usize,
    format: OutputFormat,
) -> Result<()> {
    let ctx = ElevatingContextFactory::new()
        .build(config.context_request())
        .context("Failed to build seeding context")?;

    let store = Arc::new(MemoryContentStore::new());
    let seeder = Seeder::new(
        RoleFlag::new(!replica),
        ElevatingContextFactory::new(),
        Arc::clone(&store),
        DirectoryImporter::new(Arc::clone(&store)),
        config,
    );

    let mut outcomes = Vec::new();
    for run in 1..=runs {
        let outcome = seeder
            .activate()
            .with_context(|| format!("Seeding run {run} failed"))?;
        outcomes.push(outcome);
    }

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(60));
            println!(" Seeding {}", seeder.config().bundle_dir.display());
            println!("{}", "─".repeat(60));
            for (i, outcome) in outcomes.iter().enumerate() {
                println!(" Run {}: {}", i + 1, describe(outcome));
            }
            println!(" {} nodes in {}/{}", store.len(&ctx), ctx.repository, ctx.branch);
            println!("{}", "─".repeat(60));
            println!();

            print_node(store.as_ref(), &ctx, &ContentPath::root(), 0, depth, top)?;
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "runs": outcomes,
                "content": store.snapshot(&ctx),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Dry-run the bundled import and print the grouped report.
fn run_inspect(config: &SeedConfig) -> Result<()> {
    let ctx = ElevatingContextFactory::new()
        .build(config.context_request())
        .context("Failed to build seeding context")?;

    let params = inspect_params(config);
    eprintln!("Inspecting {}...", params.source.root().display());

    let importer = DirectoryImporter::new(MemoryContentStore::new());
    let result = importer.import_nodes(&ctx, &params).context("Import failed")?;

    let mut lines = report_lines(&result).peekable();
    for section in Section::ALL {
        println!();
        println!(" {}", section.heading());
        let mut empty = true;
        while let Some(line) = lines.next_if(|line| line.section() == section) {
            println!("   {line}");
            empty = false;
        }
        if empty {
            println!("   (none)");
        }
    }
    println!();

    Ok(())
}

/// The import a seeding run would perform, as a dry run.
fn inspect_params(config: &SeedConfig) -> ImportParams {
    let source = BundledResource::resolve(&config.bundle_dir, &config.import_resource);
    ImportParams::new(source, config.import_target.clone()).dry_run(true)
}

/// One-line summary of an activation.
fn describe(outcome: &SeedOutcome) -> String {
    match outcome {
        SeedOutcome::NotMaster => "skipped, not the cluster master".to_string(),
        SeedOutcome::AlreadySeeded => "skipped, already seeded".to_string(),
        SeedOutcome::Seeded(report) => format!(
            "imported {} nodes, {} binaries, {} errors; large tree +{} nodes; permissions {}",
            report.import.added_nodes.len(),
            report.import.binaries.len(),
            report.import.errors.len(),
            report.large_tree.nodes_created(),
            if report.permissions_applied {
                "applied"
            } else {
                "skipped"
            }
        ),
    }
}

/// Print a node and its children.
fn print_node<S: ContentStore>(
    store: &S,
    ctx: &SeedContext,
    path: &ContentPath,
    depth: usize,
    max_depth: usize,
    top_n: usize,
) -> Result<()> {
    let children = store.children(ctx, path)?;
    let indent = "  ".repeat(depth);

    if depth == 0 {
        println!("/");
    }

    if depth >= max_depth {
        if !children.is_empty() {
            println!("{indent}  ... {} children", children.len());
        }
        return Ok(());
    }

    for child in children.iter().take(top_n) {
        let inherit = if child.inherit_permissions {
            "inherits"
        } else {
            "own acl"
        };
        println!(
            "{}  {:<40} {:<16} {}",
            indent,
            truncate(&child.name, 40),
            child.content_type,
            inherit
        );
        print_node(store, ctx, &child.path, depth + 1, max_depth, top_n)?;
    }

    let remaining = children.len().saturating_sub(top_n);
    if remaining > 0 {
        println!("{indent}  ... and {remaining} more");
    }

    Ok(())
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 1).collect();
        format!("{kept}…")
    }
}
