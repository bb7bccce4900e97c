use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use mvsim::cli::{FrontierOptions, SimulateOptions};
use mvsim::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Sample random portfolios and show the minimum variance one
    Simulate {
        /// Number of random portfolios (overrides config)
        #[arg(short = 'n', long)]
        portfolios: Option<usize>,
        /// Seed for reproducible runs (overrides config)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Write every sample as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize the sampled efficient frontier by risk bucket
    Frontier {
        /// Number of random portfolios (overrides config)
        #[arg(short = 'n', long)]
        portfolios: Option<usize>,
        /// Seed for reproducible runs (overrides config)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Number of risk buckets (overrides config)
        #[arg(short, long)]
        buckets: Option<usize>,
    },
}

impl From<Commands> for mvsim::AppCommand {
    fn from(cmd: Commands) -> mvsim::AppCommand {
        match cmd {
            Commands::Simulate {
                portfolios,
                seed,
                output,
            } => mvsim::AppCommand::Simulate(SimulateOptions {
                num_portfolios: portfolios,
                seed,
                output,
            }),
            Commands::Frontier {
                portfolios,
                seed,
                buckets,
            } => mvsim::AppCommand::Frontier(FrontierOptions {
                num_portfolios: portfolios,
                seed,
                buckets,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => mvsim::cli::setup::setup(),
        Some(cmd) => mvsim::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
