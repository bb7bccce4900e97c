pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::{FrontierOptions, SimulateOptions};
use crate::core::config::AppConfig;
use crate::providers::yahoo_finance::HistoryCache;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Commands that need configuration and price data.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Simulate(SimulateOptions),
    Frontier(FrontierOptions),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Portfolio simulator starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let price_cache = Arc::new(HistoryCache::new());
    let provider = providers::YahooFinanceProvider::new(
        config.providers.yahoo_base_url(),
        Arc::clone(&price_cache),
    );

    match command {
        AppCommand::Simulate(options) => cli::simulate::run(&config, &provider, &options).await,
        AppCommand::Frontier(options) => cli::frontier::run(&config, &provider, &options).await,
    }
}
