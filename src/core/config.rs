use crate::core::simulation::SimulationConfig;
use crate::core::statistics::TRADING_DAYS_PER_YEAR;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SimulationSettings {
    #[serde(default = "default_num_portfolios")]
    pub num_portfolios: usize,
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_true")]
    pub drop_incomplete_rows: bool,
    #[serde(default = "default_frontier_buckets")]
    pub frontier_buckets: usize,
}

fn default_num_portfolios() -> usize {
    5000
}

fn default_periods_per_year() -> f64 {
    TRADING_DAYS_PER_YEAR
}

fn default_true() -> bool {
    true
}

fn default_frontier_buckets() -> usize {
    20
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            num_portfolios: default_num_portfolios(),
            periods_per_year: default_periods_per_year(),
            seed: None,
            drop_incomplete_rows: true,
            frontier_buckets: default_frontier_buckets(),
        }
    }
}

impl SimulationSettings {
    pub fn to_simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            num_portfolios: self.num_portfolios,
            periods_per_year: self.periods_per_year,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn yahoo_base_url(&self) -> &str {
        self.yahoo
            .as_ref()
            .map_or(DEFAULT_YAHOO_BASE_URL, |p| &p.base_url)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    pub assets: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "mvsim", "mvsim")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.assets.is_empty() {
            bail!("At least one asset must be configured");
        }
        if self.start >= self.end {
            bail!("Start date {} must be before end date {}", self.start, self.end);
        }
        if self.simulation.num_portfolios == 0 {
            bail!("simulation.num_portfolios must be at least 1");
        }
        if !(self.simulation.periods_per_year.is_finite() && self.simulation.periods_per_year > 0.0)
        {
            bail!("simulation.periods_per_year must be positive");
        }
        Ok(())
    }
}
