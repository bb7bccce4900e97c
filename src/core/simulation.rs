//! Monte Carlo sampling of random long-only portfolios.
//!
//! Each sample draws every weight uniformly from `[0, 1)` and normalizes the
//! vector by its sum. This does not sample the simplex uniformly (it favours
//! near-equal weights) and is kept that way so results stay comparable with
//! earlier runs.

use crate::core::error::{MarkowitzError, Result};
use crate::core::returns::ReturnTable;
use crate::core::statistics::{ReturnStatistics, TRADING_DAYS_PER_YEAR};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// One simulated portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSample {
    #[serde(rename = "return")]
    pub expected_return: f64,
    pub risk: f64,
    pub weights: Vec<f64>,
    /// Set when `wᵀ Σ w` came out negative and was clamped to zero.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degenerate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub num_portfolios: usize,
    pub periods_per_year: f64,
    /// Seed for the random source. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub fn new(num_portfolios: usize) -> Self {
        Self {
            num_portfolios,
            periods_per_year: TRADING_DAYS_PER_YEAR,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_periods_per_year(mut self, periods_per_year: f64) -> Self {
        self.periods_per_year = periods_per_year;
        self
    }
}

/// Runs a simulation with a random source built from `config.seed`.
pub fn simulate(returns: &ReturnTable, config: &SimulationConfig) -> Result<Vec<PortfolioSample>> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    simulate_with_rng(
        returns,
        config.num_portfolios,
        config.periods_per_year,
        &mut rng,
    )
}

/// Draws `num_portfolios` random portfolios and evaluates their annualized
/// return and volatility. Samples come back in generation order.
#[instrument(skip(returns, rng), fields(assets = returns.assets().len(), rows = returns.len()))]
pub fn simulate_with_rng<R: Rng>(
    returns: &ReturnTable,
    num_portfolios: usize,
    periods_per_year: f64,
    rng: &mut R,
) -> Result<Vec<PortfolioSample>> {
    if num_portfolios == 0 {
        return Err(MarkowitzError::invalid_parameter(
            "number of portfolios must be at least 1",
        ));
    }

    let stats = ReturnStatistics::from_returns(returns, periods_per_year)?;
    debug!(
        "Annualized means {:?} over {} return rows",
        stats.mean_annual,
        returns.len()
    );

    let samples: Vec<PortfolioSample> = (0..num_portfolios)
        .map(|_| evaluate(&stats, random_weights(stats.num_assets(), rng)))
        .collect();

    let degenerate = samples.iter().filter(|s| s.degenerate).count();
    if degenerate > 0 {
        warn!("{degenerate} of {num_portfolios} samples had a negative variance clamped to zero");
    }

    Ok(samples)
}

/// Uniform draws on `[0, 1)` divided by their sum.
fn random_weights<R: Rng>(n: usize, rng: &mut R) -> Vec<f64> {
    loop {
        let mut weights: Vec<f64> = (0..n).map(|_| rng.random::<f64>()).collect();
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            weights.iter_mut().for_each(|w| *w /= total);
            return weights;
        }
    }
}

fn evaluate(stats: &ReturnStatistics, weights: Vec<f64>) -> PortfolioSample {
    let expected_return = stats.expected_return(&weights);
    let variance = stats.variance(&weights);
    let degenerate = variance < 0.0;
    let risk = if degenerate {
        debug!(variance, "Clamping negative portfolio variance to zero");
        0.0
    } else {
        variance.sqrt()
    };

    PortfolioSample {
        expected_return,
        risk,
        weights,
        degenerate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(assets: &[&str], rows: Vec<Vec<f64>>) -> ReturnTable {
        let dates = (0..rows.len())
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Days::new(i as u64))
            .collect();
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Some).collect())
            .collect();
        ReturnTable::new(assets.iter().map(|a| a.to_string()).collect(), dates, rows).unwrap()
    }

    fn three_asset_returns() -> ReturnTable {
        table(
            &["A", "B", "C"],
            vec![
                vec![0.010, 0.004, -0.002],
                vec![-0.004, 0.002, 0.006],
                vec![0.007, -0.003, 0.001],
                vec![0.002, 0.005, -0.004],
                vec![-0.006, 0.001, 0.003],
            ],
        )
    }

    #[test]
    fn test_weights_are_valid_and_risk_non_negative() {
        let returns = three_asset_returns();
        let samples = simulate(&returns, &SimulationConfig::new(500).with_seed(7)).unwrap();

        assert_eq!(samples.len(), 500);
        for sample in &samples {
            assert_eq!(sample.weights.len(), 3);
            assert!(sample.weights.iter().all(|w| *w >= 0.0));
            let total: f64 = sample.weights.iter().sum();
            assert!((total - 1.0).abs() < 1e-12);
            assert!(sample.risk >= 0.0);
            assert!(!sample.degenerate);
        }
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let returns = three_asset_returns();
        let config = SimulationConfig::new(200).with_seed(42);

        let first = simulate(&returns, &config).unwrap();
        let second = simulate(&returns, &config).unwrap();
        assert_eq!(first, second);

        let other = simulate(&returns, &SimulationConfig::new(200).with_seed(43)).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_single_asset_portfolio() {
        let values = [0.01, -0.02, 0.015, 0.005];
        let returns = table(&["A"], values.iter().map(|v| vec![*v]).collect());
        let samples = simulate(&returns, &SimulationConfig::new(1)).unwrap();

        assert_eq!(samples.len(), 1);
        let sample = &samples[0];
        assert_eq!(sample.weights, vec![1.0]);

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        assert!((sample.expected_return - mean * 252.0).abs() < 1e-12);
        assert!((sample.risk - var.sqrt() * 252.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_portfolios_is_invalid() {
        let returns = three_asset_returns();
        let err = simulate(&returns, &SimulationConfig::new(0)).unwrap_err();
        assert!(matches!(err, MarkowitzError::InvalidParameter { .. }));
    }

    #[test]
    fn test_no_assets_is_insufficient() {
        let returns = table(&[], vec![vec![], vec![]]);
        let err = simulate(&returns, &SimulationConfig::new(10)).unwrap_err();
        assert!(matches!(err, MarkowitzError::InsufficientData { .. }));
    }

    #[test]
    fn test_negative_variance_is_clamped_and_flagged() {
        let stats = ReturnStatistics {
            mean_annual: vec![0.1, 0.2],
            cov_annual: vec![vec![-1e-18, 0.0], vec![0.0, -1e-18]],
        };
        let sample = evaluate(&stats, vec![0.5, 0.5]);
        assert!(sample.degenerate);
        assert_eq!(sample.risk, 0.0);
        assert!((sample.expected_return - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_nan_variance_is_not_reported_as_zero_risk() {
        let stats = ReturnStatistics {
            mean_annual: vec![0.1, f64::NAN],
            cov_annual: vec![vec![0.04, 0.0], vec![0.0, f64::NAN]],
        };
        let sample = evaluate(&stats, vec![0.5, 0.5]);
        assert!(sample.risk.is_nan());
        assert!(!sample.degenerate);
    }

    #[test]
    fn test_sample_json_shape() {
        let sample = PortfolioSample {
            expected_return: 0.12,
            risk: 0.2,
            weights: vec![0.25, 0.75],
            degenerate: false,
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["return"], 0.12);
        assert_eq!(json["risk"], 0.2);
        assert!(json.get("degenerate").is_none());
    }
}
