//! Annualized return statistics shared by every sample of a simulation run.
use crate::core::error::{MarkowitzError, Result};
use crate::core::returns::ReturnTable;

/// Trading days per year used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized mean vector and covariance matrix of asset returns.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatistics {
    pub mean_annual: Vec<f64>,
    pub cov_annual: Vec<Vec<f64>>,
}

impl ReturnStatistics {
    /// Computes per-asset means and the sample covariance (`n - 1` divisor),
    /// both scaled by `periods_per_year`.
    ///
    /// Uses two passes: means first, then centered cross-products.
    pub fn from_returns(returns: &ReturnTable, periods_per_year: f64) -> Result<Self> {
        if !periods_per_year.is_finite() || periods_per_year <= 0.0 {
            return Err(MarkowitzError::invalid_parameter(format!(
                "periods per year must be positive, got {periods_per_year}"
            )));
        }

        let n_assets = returns.assets().len();
        if n_assets == 0 {
            return Err(MarkowitzError::insufficient_data("simulation (assets)", 1, 0));
        }
        if returns.len() < 2 {
            return Err(MarkowitzError::insufficient_data(
                "covariance estimation (return rows)",
                2,
                returns.len(),
            ));
        }

        let rows = complete_rows(returns)?;
        let n = rows.len() as f64;

        let mut means = vec![0.0; n_assets];
        for row in &rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut cov = vec![vec![0.0; n_assets]; n_assets];
        for row in &rows {
            let centered: Vec<f64> = row.iter().zip(&means).map(|(v, m)| v - m).collect();
            for i in 0..n_assets {
                for j in i..n_assets {
                    cov[i][j] += centered[i] * centered[j];
                }
            }
        }

        let scale = periods_per_year / (n - 1.0);
        for i in 0..n_assets {
            for j in i..n_assets {
                let value = cov[i][j] * scale;
                cov[i][j] = value;
                cov[j][i] = value;
            }
        }

        Ok(Self {
            mean_annual: means.into_iter().map(|m| m * periods_per_year).collect(),
            cov_annual: cov,
        })
    }

    pub fn num_assets(&self) -> usize {
        self.mean_annual.len()
    }

    /// Dot product of `weights` with the annualized means.
    pub fn expected_return(&self, weights: &[f64]) -> f64 {
        weights
            .iter()
            .zip(&self.mean_annual)
            .map(|(w, m)| w * m)
            .sum()
    }

    /// The quadratic form `wᵀ Σ w`. May be slightly negative from rounding.
    pub fn variance(&self, weights: &[f64]) -> f64 {
        self.cov_annual
            .iter()
            .zip(weights)
            .map(|(row, wi)| wi * row.iter().zip(weights).map(|(c, wj)| c * wj).sum::<f64>())
            .sum()
    }
}

fn complete_rows(returns: &ReturnTable) -> Result<Vec<Vec<f64>>> {
    returns
        .rows()
        .iter()
        .zip(returns.dates())
        .map(|(row, date)| {
            row.iter()
                .zip(returns.assets())
                .map(|(value, asset)| match *value {
                    Some(v) if v.is_finite() => Ok(v),
                    Some(v) => Err(MarkowitzError::NonFiniteData {
                        asset: asset.clone(),
                        date: date.to_string(),
                        value: v,
                    }),
                    None => Err(MarkowitzError::MissingData {
                        asset: asset.clone(),
                        date: date.to_string(),
                    }),
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect()
}
