use super::simulate::{SimulationRun, run_simulation, simulation_config};
use super::ui;
use crate::core::config::AppConfig;
use crate::core::{FrontierPoint, PriceHistoryProvider, efficient_frontier};
use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment};

#[derive(Debug, Clone, Default)]
pub struct FrontierOptions {
    pub num_portfolios: Option<usize>,
    pub seed: Option<u64>,
    pub buckets: Option<usize>,
}

pub async fn run(
    config: &AppConfig,
    provider: &(dyn PriceHistoryProvider + Send + Sync),
    options: &FrontierOptions,
) -> Result<()> {
    let sim = simulation_config(config, options.num_portfolios, options.seed);
    let run = run_simulation(config, provider, &sim).await?;

    let buckets = options.buckets.unwrap_or(config.simulation.frontier_buckets);
    let frontier =
        efficient_frontier(&run.samples, buckets).context("Failed to summarize frontier")?;

    println!("{}", display_frontier(&run, &frontier));
    Ok(())
}

fn display_frontier(run: &SimulationRun, frontier: &[FrontierPoint]) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Efficient frontier (sampled)", ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Risk bucket"),
        ui::header_cell("Risk"),
        ui::header_cell("Return"),
        ui::header_cell("Sample"),
    ]);

    let min = &run.min_variance;
    for point in frontier {
        let is_min = point.risk_low <= min.risk() && min.risk() <= point.risk_high;
        let bucket = Cell::new(format!(
            "{:.2}% - {:.2}%",
            point.risk_low * 100.0,
            point.risk_high * 100.0
        ));
        let risk = if is_min {
            ui::highlight_cell(point.risk)
        } else {
            ui::percent_cell(point.risk)
        };
        table.add_row(vec![
            bucket,
            risk,
            ui::return_cell(point.expected_return),
            Cell::new(format!("#{}", point.index + 1)).set_alignment(CellAlignment::Right),
        ]);
    }
    output.push_str(&table.to_string());

    output.push_str(&format!(
        "\n\n{} {} risk, {} return (sample #{})",
        ui::style_text("Minimum variance:", ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("{:.2}%", min.risk() * 100.0),
            ui::StyleType::TotalValue
        ),
        ui::style_text(
            &format!("{:.2}%", min.expected_return() * 100.0),
            ui::StyleType::TotalValue
        ),
        min.index + 1
    ));

    output
}
