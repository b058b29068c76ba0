mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use asbuilt_cabling::config::{self, OutputFormat};
use asbuilt_cabling::logging;

#[derive(Parser)]
#[command(
    name = "asbuilt",
    version,
    about = "As-built cabling designations and cross-connection checks for storage clusters"
)]
struct Cli {
    /// Path to config file (default: ~/.config/asbuilt/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides config)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full cabling report from an inventory dump and topology text
    Report {
        /// Inventory dump (JSON or YAML)
        #[arg(long)]
        inventory: Option<PathBuf>,

        /// Link-discovery tool output
        #[arg(long)]
        topology: Option<PathBuf>,

        /// Output format (table or json)
        #[arg(long)]
        format: Option<String>,
    },

    /// Parse link-discovery output and show the observed cabling
    Topology {
        /// Link-discovery tool output
        file: PathBuf,

        /// Output format (table or json)
        #[arg(long)]
        format: Option<String>,
    },

    /// Look up a single node-port or switch-port designation
    Designate {
        /// Inventory dump (JSON or YAML)
        #[arg(long)]
        inventory: Option<PathBuf>,

        /// Output format (table or json)
        #[arg(long)]
        format: Option<String>,

        #[command(subcommand)]
        command: commands::designate::DesignateCommands,
    },

    /// Exit non-zero when any cross-connection is found
    Check {
        /// Inventory dump (JSON or YAML)
        #[arg(long)]
        inventory: Option<PathBuf>,

        /// Link-discovery tool output
        #[arg(long)]
        topology: Option<PathBuf>,
    },
}

fn output_format(flag: Option<String>, configured: OutputFormat) -> Result<OutputFormat> {
    flag.map(|f| f.parse::<OutputFormat>()).transpose().map(|f| f.unwrap_or(configured))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load(cli.config.as_deref())?;
    // CLI flags override config values
    if let Some(level) = cli.log_level {
        cfg.log_level = level;
    }
    logging::init(&cfg.log_level, cfg.log_format)?;

    match cli.command {
        Commands::Report {
            inventory,
            topology,
            format,
        } => commands::report::run(
            &cfg,
            inventory.as_deref(),
            topology.as_deref(),
            output_format(format, cfg.output_format)?,
        ),
        Commands::Topology { file, format } => {
            commands::topology::run(&file, output_format(format, cfg.output_format)?)
        }
        Commands::Designate {
            inventory,
            format,
            command,
        } => commands::designate::run(
            &cfg,
            inventory.as_deref(),
            output_format(format, cfg.output_format)?,
            &command,
        ),
        Commands::Check {
            inventory,
            topology,
        } => commands::check::run(&cfg, inventory.as_deref(), topology.as_deref()),
    }
}
