use super::{data, ui};
use crate::core::config::AppConfig;
use crate::core::export::write_samples_json;
use crate::core::{
    PortfolioResult, PortfolioSample, PriceHistoryProvider, SimulationConfig, select_min_variance,
    simulate,
};
use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell};
use std::path::PathBuf;
use tracing::info;

/// Command-line overrides for a simulation run.
#[derive(Debug, Clone, Default)]
pub struct SimulateOptions {
    pub num_portfolios: Option<usize>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
}

/// Merges configured simulation settings with command-line overrides.
pub fn simulation_config(
    config: &AppConfig,
    num_portfolios: Option<usize>,
    seed: Option<u64>,
) -> SimulationConfig {
    let mut sim = config.simulation.to_simulation_config();
    if let Some(n) = num_portfolios {
        sim.num_portfolios = n;
    }
    if seed.is_some() {
        sim.seed = seed;
    }
    sim
}

/// Result of the full price → returns → samples → selection pipeline.
pub struct SimulationRun {
    pub assets: Vec<String>,
    pub return_rows: usize,
    pub samples: Vec<PortfolioSample>,
    pub min_variance: PortfolioResult,
}

pub async fn run_simulation(
    config: &AppConfig,
    provider: &(dyn PriceHistoryProvider + Send + Sync),
    sim: &SimulationConfig,
) -> Result<SimulationRun> {
    let prices = data::fetch_price_table(config, provider).await?;
    let returns = data::prepare_returns(config, &prices)?;

    info!(
        "Simulating {} portfolios over {} assets",
        sim.num_portfolios,
        returns.assets().len()
    );
    let samples = simulate(&returns, sim).context("Simulation failed")?;
    let min_variance = select_min_variance(&samples).context("Selection failed")?;

    Ok(SimulationRun {
        assets: returns.assets().to_vec(),
        return_rows: returns.len(),
        samples,
        min_variance,
    })
}

pub async fn run(
    config: &AppConfig,
    provider: &(dyn PriceHistoryProvider + Send + Sync),
    options: &SimulateOptions,
) -> Result<()> {
    let sim = simulation_config(config, options.num_portfolios, options.seed);
    let run = run_simulation(config, provider, &sim).await?;

    println!("{}", display_min_variance(&run));

    if let Some(path) = &options.output {
        write_samples_json(path, &run.assets, &run.samples, &run.min_variance)?;
        println!(
            "\n{}",
            ui::style_text(
                &format!("Wrote {} samples to {}", run.samples.len(), path.display()),
                ui::StyleType::Subtle
            )
        );
    }

    Ok(())
}

fn display_min_variance(run: &SimulationRun) -> String {
    let min = &run.min_variance;

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Minimum variance portfolio", ui::StyleType::Title)
    );
    output.push_str(&format!(
        "{} {}\n",
        ui::style_text("Return:", ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("{:.2}%", min.expected_return() * 100.0),
            ui::StyleType::TotalValue
        )
    ));
    output.push_str(&format!(
        "{} {}\n",
        ui::style_text("Risk:", ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("{:.2}%", min.risk() * 100.0),
            ui::StyleType::TotalValue
        )
    ));
    output.push_str(&format!(
        "{}\n\n",
        ui::style_text(
            &format!(
                "Sample #{} of {} drawn from {} daily returns",
                min.index + 1,
                run.samples.len(),
                run.return_rows
            ),
            ui::StyleType::Subtle
        )
    ));

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Asset"), ui::header_cell("Weight")]);
    for (asset, weight) in min.allocations(&run.assets) {
        table.add_row(vec![Cell::new(asset), ui::percent_cell(weight)]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        ui::highlight_cell(min.weights().iter().sum()),
    ]);
    output.push_str(&table.to_string());

    let degenerate = run.samples.iter().filter(|s| s.degenerate).count();
    if degenerate > 0 {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("{degenerate} samples had a negative variance clamped to zero"),
                ui::StyleType::Error
            )
        ));
    }

    output
}
