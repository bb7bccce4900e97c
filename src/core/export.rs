//! JSON export of simulation results for external plotting.
use crate::core::selection::PortfolioResult;
use crate::core::simulation::PortfolioSample;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Serialize)]
struct SimulationExport<'a> {
    assets: &'a [String],
    min_variance: &'a PortfolioResult,
    samples: &'a [PortfolioSample],
}

pub fn write_samples_json<P: AsRef<Path>>(
    path: P,
    assets: &[String],
    samples: &[PortfolioSample],
    min_variance: &PortfolioResult,
) -> Result<()> {
    let path = path.as_ref();
    let export = SimulationExport {
        assets,
        min_variance,
        samples,
    };
    let json = serde_json::to_string_pretty(&export).context("Failed to serialize samples")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write samples to {}", path.display()))?;
    debug!("Wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}
