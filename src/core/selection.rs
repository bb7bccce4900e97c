//! Selection of the minimum-variance portfolio among simulated samples.
use crate::core::error::{MarkowitzError, Result};
use crate::core::simulation::PortfolioSample;
use serde::{Deserialize, Serialize};

/// A sample picked out of a simulation run, with its generation index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioResult {
    pub index: usize,
    #[serde(flatten)]
    pub sample: PortfolioSample,
}

impl PortfolioResult {
    pub fn expected_return(&self) -> f64 {
        self.sample.expected_return
    }

    pub fn risk(&self) -> f64 {
        self.sample.risk
    }

    pub fn weights(&self) -> &[f64] {
        &self.sample.weights
    }

    /// Pairs each weight with the asset it belongs to.
    pub fn allocations<'a>(&'a self, assets: &'a [String]) -> Vec<(&'a str, f64)> {
        assets
            .iter()
            .map(String::as_str)
            .zip(self.sample.weights.iter().copied())
            .collect()
    }
}

/// Returns the sample with the smallest risk. Ties go to the earliest sample.
///
/// A NaN risk is unordered, so such samples are skipped.
pub fn select_min_variance(samples: &[PortfolioSample]) -> Result<PortfolioResult> {
    if samples.is_empty() {
        return Err(MarkowitzError::empty_input("minimum variance selection"));
    }

    let (index, sample) = samples
        .iter()
        .enumerate()
        .filter(|(_, sample)| !sample.risk.is_nan())
        .reduce(|best, candidate| {
            if candidate.1.risk < best.1.risk {
                candidate
            } else {
                best
            }
        })
        .ok_or_else(|| {
            MarkowitzError::invalid_parameter("every sample has an undefined (NaN) risk")
        })?;

    Ok(PortfolioResult {
        index,
        sample: sample.clone(),
    })
}
