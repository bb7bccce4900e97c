use super::ui;
use crate::core::config::AppConfig;
use crate::core::{PriceHistoryProvider, PriceSeries, PriceTable, ReturnTable, compute_returns};
use anyhow::{Context, Result, anyhow};
use futures::future::join_all;
use tracing::{debug, info};

/// Fetches every configured asset concurrently and aligns them by date.
///
/// Fails with the list of failing assets if any fetch fails, since a missing
/// column would change the asset universe silently.
pub async fn fetch_price_table(
    config: &AppConfig,
    provider: &(dyn PriceHistoryProvider + Send + Sync),
) -> Result<PriceTable> {
    info!(
        "Fetching price history for {} assets from {} to {}",
        config.assets.len(),
        config.start,
        config.end
    );

    let pb = ui::new_progress_bar(config.assets.len() as u64, true);
    pb.set_message("Fetching prices...");

    let futures = config.assets.iter().map(|symbol| {
        let pb_clone = pb.clone();
        async move {
            let result = provider
                .fetch_history(symbol, config.start, config.end)
                .await;
            pb_clone.inc(1);
            (symbol.clone(), result)
        }
    });

    let fetched: Vec<(String, Result<PriceSeries>)> = join_all(futures).await;
    pb.finish_and_clear();

    let mut series = Vec::with_capacity(fetched.len());
    let mut failures = Vec::new();
    for (symbol, result) in fetched {
        match result {
            Ok(s) => series.push(s),
            Err(e) => {
                debug!("Price history fetch failed for {}: {}", symbol, e);
                failures.push(format!("{symbol}: {e}"));
            }
        }
    }
    if !failures.is_empty() {
        return Err(anyhow!(
            "Failed to fetch price history:\n  {}",
            failures.join("\n  ")
        ));
    }

    let table = PriceTable::from_series(&series).context("Failed to align price histories")?;
    debug!("Aligned price table with {} rows", table.len());
    Ok(table)
}

/// Computes daily returns and applies the configured missing-data policy.
pub fn prepare_returns(config: &AppConfig, prices: &PriceTable) -> Result<ReturnTable> {
    let returns = compute_returns(prices).context("Failed to compute returns")?;
    let returns = if config.simulation.drop_incomplete_rows {
        returns.drop_incomplete()
    } else {
        returns
    };
    debug!("Prepared {} return rows", returns.len());
    Ok(returns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct MockHistoryProvider;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[async_trait]
    impl PriceHistoryProvider for MockHistoryProvider {
        async fn fetch_history(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<PriceSeries> {
            match symbol {
                "AAA" => Ok(PriceSeries {
                    symbol: symbol.to_string(),
                    currency: Some("USD".to_string()),
                    points: vec![
                        (date(2), Some(10.0)),
                        (date(3), Some(11.0)),
                        (date(4), Some(12.1)),
                    ],
                }),
                "BBB" => Ok(PriceSeries {
                    symbol: symbol.to_string(),
                    currency: Some("USD".to_string()),
                    points: vec![(date(2), Some(20.0)), (date(4), Some(22.0))],
                }),
                _ => Err(anyhow!("No price data found for symbol: {}", symbol)),
            }
        }
    }

    fn config(assets: &[&str], drop_incomplete_rows: bool) -> AppConfig {
        let mut config: AppConfig = serde_yaml::from_str(
            "assets: [X]\nstart: 2024-01-01\nend: 2024-02-01\n",
        )
        .unwrap();
        config.assets = assets.iter().map(|a| a.to_string()).collect();
        config.simulation.drop_incomplete_rows = drop_incomplete_rows;
        config
    }

    #[tokio::test]
    async fn test_fetch_and_prepare_returns() {
        let config = config(&["AAA", "BBB"], true);
        let prices = fetch_price_table(&config, &MockHistoryProvider).await.unwrap();
        assert_eq!(prices.assets(), &["AAA".to_string(), "BBB".to_string()]);
        assert_eq!(prices.len(), 3);

        let returns = prepare_returns(&config, &prices).unwrap();
        // Jan 3 has no BBB price, so both Jan 3 and Jan 4 returns for BBB are undefined
        assert!(returns.is_empty());

        let config = AppConfig {
            simulation: crate::core::config::SimulationSettings {
                drop_incomplete_rows: false,
                ..config.simulation
            },
            ..config
        };
        let returns = prepare_returns(&config, &prices).unwrap();
        assert_eq!(returns.len(), 2);
        assert_eq!(returns.rows()[0][1], None);
    }

    #[tokio::test]
    async fn test_fetch_reports_failing_assets() {
        let config = config(&["AAA", "ZZZ"], true);
        let err = fetch_price_table(&config, &MockHistoryProvider)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ZZZ: No price data found for symbol: ZZZ"));
    }
}
