//! opossum-tools: attribution panels, locate queries and source links for
//! open-source license audits.
//!
//! Reads the JSON snapshot of a loaded project and answers the questions the
//! audit view asks about one resource.

#![allow(clippy::struct_excessive_bools, clippy::needless_pass_by_value)]

use anyhow::{Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use opossum_tools::{
    cli::{self, ConfigCommand, LocateConfig, PanelsConfig, UrlConfig},
    config::{AppConfig, ConfigPreset, OutputFormat, Validatable, WorkerConfig},
    filters::{Filter, SelectedCriticality, SortOption},
    pipeline::exit_codes,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "opossum-tools")]
#[command(version)]
#[command(about = "Attribution panels and locate queries for license audits", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Nothing located / no URL for the resource
    3  Error occurred

EXAMPLES:
    # Panels of a folder, signals sorted by criticality
    opossum-tools panels project.json /src/ --sort criticality

    # Resources with high-criticality MIT signals
    opossum-tools locate project.json --criticality high --license MIT

    # Source link of a file
    opossum-tools url project.json /src/main.rs --open")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Start from a named preset instead of the config file
    #[arg(long, global = true, value_enum)]
    preset: Option<ConfigPreset>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every command reading a snapshot
#[derive(Args)]
struct SnapshotArgs {
    /// Path to the JSON project snapshot
    file: PathBuf,

    /// Fail on links to unknown resources or attributions
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Shorthand for `--output json`
    #[arg(long, conflicts_with = "output")]
    json: bool,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,
}

impl SnapshotArgs {
    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output.unwrap_or_default()
        }
    }
}

/// Arguments for the `panels` subcommand
#[derive(Args)]
struct PanelsArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,

    /// Resource id, e.g. `/src/` or `/src/main.rs`
    resource: String,

    /// Only show attributions passing these filters
    #[arg(short, long = "filter", value_enum)]
    filters: Vec<Filter>,

    /// Sort order of the cards
    #[arg(long, value_enum)]
    sort: Option<SortOption>,

    /// Confidence below this value counts as low
    #[arg(long)]
    low_confidence_threshold: Option<u32>,

    /// Compute on the calling thread
    #[arg(long)]
    no_worker: bool,

    /// Attributed resources from which computation is offloaded
    #[arg(long)]
    offload_threshold: Option<usize>,

    /// Worker threads
    #[arg(long)]
    threads: Option<usize>,
}

/// Arguments for the `locate` subcommand
#[derive(Args)]
struct LocateArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,

    /// Criticality of matching signals
    #[arg(long, value_enum, default_value = "any")]
    criticality: SelectedCriticality,

    /// License names (short or full) of matching signals
    #[arg(short, long = "license")]
    licenses: Vec<String>,

    /// Text contained in the package or license name
    #[arg(short, long)]
    search: Option<String>,

    /// Match the search text against license names only
    #[arg(long, requires = "search")]
    license_only: bool,
}

/// Arguments for the `url` subcommand
#[derive(Args)]
struct UrlArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,

    /// Resource id
    resource: String,

    /// Open the URL in the default browser
    #[arg(long)]
    open: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the attribution panels of a resource
    Panels(PanelsArgs),

    /// Find resources whose signals match a query
    Locate(LocateArgs),

    /// Print (or open) the source URL of a resource
    Url(UrlArgs),

    /// Show the effective configuration, its schema or an example file
    Config {
        /// Print the JSON Schema of the config format
        #[arg(long, conflicts_with_all = ["example", "path"])]
        schema: bool,

        /// Print an example config file
        #[arg(long, conflicts_with = "path")]
        example: bool,

        /// Print config file search paths and the discovered file
        #[arg(long)]
        path: bool,

        /// Write to a file instead of stdout
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Effective configuration: preset or discovered file, with CLI overrides on top.
fn resolve_config(cli: &Cli, overrides: &AppConfig) -> Result<AppConfig> {
    let config = match cli.preset {
        Some(preset) => {
            let mut config = AppConfig::from_preset(preset);
            config.merge(overrides);
            config
        }
        None => {
            let (config, loaded_from) =
                AppConfig::from_file_with_overrides(cli.config.as_deref(), overrides);
            if let Some(path) = loaded_from {
                tracing::debug!("Using config file {}", path.display());
            }
            config
        }
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration: {}", messages.join("; "));
    }
    Ok(config)
}

fn output_overrides(snapshot: &SnapshotArgs) -> AppConfig {
    AppConfig::builder()
        .output_format(snapshot.output_format())
        .output_file(snapshot.output_file.clone())
        .build()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let exit_code = match &cli.command {
        Commands::Panels(args) => {
            let mut overrides = output_overrides(&args.snapshot);
            overrides.worker = WorkerConfig {
                enabled: !args.no_worker,
                offload_threshold: args
                    .offload_threshold
                    .unwrap_or(overrides.worker.offload_threshold),
                threads: args.threads.unwrap_or(overrides.worker.threads),
            };
            if let Some(threshold) = args.low_confidence_threshold {
                overrides.filters.low_confidence_threshold = threshold;
            }

            cli::run_panels(PanelsConfig {
                file: args.snapshot.file.clone(),
                resource_id: args.resource.clone(),
                filters: args.filters.iter().copied().collect(),
                sort: args.sort,
                strict: args.snapshot.strict,
                app: resolve_config(&cli, &overrides)?,
                quiet: cli.quiet,
            })?
        }

        Commands::Locate(args) => cli::run_locate(LocateConfig {
            file: args.snapshot.file.clone(),
            criticality: args.criticality,
            licenses: args.licenses.clone(),
            search_term: args.search.clone(),
            license_only: args.license_only,
            strict: args.snapshot.strict,
            app: resolve_config(&cli, &output_overrides(&args.snapshot))?,
            quiet: cli.quiet,
        })?,

        Commands::Url(args) => cli::run_url(UrlConfig {
            file: args.snapshot.file.clone(),
            resource_id: args.resource.clone(),
            open: args.open,
            strict: args.snapshot.strict,
            app: resolve_config(&cli, &output_overrides(&args.snapshot))?,
            quiet: cli.quiet,
        })?,

        Commands::Config {
            schema,
            example,
            path,
            output_file,
        } => {
            let command = if *schema {
                ConfigCommand::Schema
            } else if *example {
                ConfigCommand::Example
            } else if *path {
                ConfigCommand::Path
            } else {
                ConfigCommand::Show { preset: cli.preset }
            };
            cli::run_config(command, cli.config.as_deref(), output_file.clone())?;
            exit_codes::SUCCESS
        }

        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "opossum-tools", &mut io::stdout());
            exit_codes::SUCCESS
        }
    };

    if exit_code != exit_codes::SUCCESS {
        std::process::exit(exit_code);
    }
    Ok(())
}
