//! Upper envelope of the simulated risk/return cloud.
use crate::core::error::{MarkowitzError, Result};
use crate::core::simulation::PortfolioSample;

/// Best-return sample found within one risk bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierPoint {
    pub risk_low: f64,
    pub risk_high: f64,
    pub index: usize,
    pub expected_return: f64,
    pub risk: f64,
}

/// Splits the observed risk range into `buckets` equal-width bins and keeps
/// the highest-return sample in each non-empty bin, ordered by risk.
/// Samples with a NaN risk are left out.
pub fn efficient_frontier(samples: &[PortfolioSample], buckets: usize) -> Result<Vec<FrontierPoint>> {
    if buckets == 0 {
        return Err(MarkowitzError::invalid_parameter(
            "frontier needs at least one bucket",
        ));
    }
    if samples.is_empty() {
        return Err(MarkowitzError::empty_input("efficient frontier"));
    }

    let (min_risk, max_risk) = samples.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.risk), hi.max(s.risk))
    });
    let width = (max_risk - min_risk) / buckets as f64;

    let mut best: Vec<Option<usize>> = vec![None; buckets];
    for (index, sample) in samples.iter().enumerate() {
        if sample.risk.is_nan() {
            continue;
        }
        let bucket = if width > 0.0 {
            (((sample.risk - min_risk) / width) as usize).min(buckets - 1)
        } else {
            0
        };
        match best[bucket] {
            Some(current) if samples[current].expected_return >= sample.expected_return => {}
            _ => best[bucket] = Some(index),
        }
    }

    Ok(best
        .into_iter()
        .enumerate()
        .filter_map(|(bucket, index)| {
            index.map(|index| FrontierPoint {
                risk_low: min_risk + width * bucket as f64,
                risk_high: min_risk + width * (bucket + 1) as f64,
                index,
                expected_return: samples[index].expected_return,
                risk: samples[index].risk,
            })
        })
        .collect())
}
