//! Mean-variance simulation core and its shared abstractions

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod frontier;
pub mod log;
pub mod price;
pub mod returns;
pub mod selection;
pub mod simulation;
pub mod statistics;

// Re-export main types for cleaner imports
pub use error::{MarkowitzError, Result};
pub use frontier::{FrontierPoint, efficient_frontier};
pub use price::{PriceHistoryProvider, PriceSeries, PriceTable};
pub use returns::{ReturnTable, compute_returns};
pub use selection::{PortfolioResult, select_min_variance};
pub use simulation::{PortfolioSample, SimulationConfig, simulate, simulate_with_rng};
pub use statistics::{ReturnStatistics, TRADING_DAYS_PER_YEAR};
