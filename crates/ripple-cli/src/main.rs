//! Ripple CLI - Reactive notebook engine host.

mod colors;
mod graph;
mod notebook;
mod progress;
mod run;

use std::path::Path;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ripple_core::{KernelConfig, ValidationMode};

#[derive(Parser)]
#[command(name = "ripple")]
#[command(about = "Reactive notebook engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the demo notebook and apply value changes
    Run {
        /// Assign a value, e.g. `--set limit=42` (repeatable, applied in order)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        assignments: Vec<String>,

        /// Print the final context as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        kernel: KernelArgs,
    },

    /// Show the demo notebook's dependency graph
    Graph {
        /// Show only the upstream and downstream cells of this cell
        #[arg(long)]
        cell: Option<String>,

        #[command(flatten)]
        kernel: KernelArgs,
    },
}

/// Kernel configuration flags shared by all commands.
#[derive(Args)]
struct KernelArgs {
    /// Load kernel configuration from a JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Stop at the first notebook problem instead of reporting all of them
    #[arg(long)]
    fail_fast: bool,

    /// Let cell panics abort the process
    #[arg(long)]
    no_catch_panics: bool,
}

impl KernelArgs {
    fn resolve(&self) -> anyhow::Result<KernelConfig> {
        let mut config = match &self.config {
            Some(path) => KernelConfig::from_file(Path::new(path))
                .with_context(|| format!("failed to read config {path}"))?,
            None => KernelConfig::default(),
        };
        if self.fail_fast {
            config.validation = ValidationMode::FailFast;
        }
        if self.no_catch_panics {
            config.catch_panics = false;
        }
        tracing::debug!(?config, "kernel configuration");
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            assignments,
            json,
            kernel,
        } => run::execute(&assignments, kernel.resolve()?, json, cli.verbose)?,

        Commands::Graph { cell, kernel } => graph::execute(cell.as_deref(), kernel.resolve()?)?,
    }

    Ok(())
}
