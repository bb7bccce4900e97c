use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::util::with_retry;
use crate::core::cache::Cache;
use crate::core::price::{PriceHistoryProvider, PriceSeries};

/// Cache key for one fetched history: symbol and requested date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryKey {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub type HistoryCache = Cache<HistoryKey, PriceSeries>;

const DEFAULT_RETRIES: usize = 2;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;

// YahooFinanceProvider implementation for PriceHistoryProvider
pub struct YahooFinanceProvider {
    base_url: String,
    cache: Arc<HistoryCache>,
    retries: usize,
    retry_delay_ms: u64,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str, cache: Arc<HistoryCache>) -> Self {
        YahooFinanceProvider {
            base_url: base_url.to_string(),
            cache,
            retries: DEFAULT_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    pub fn with_retries(mut self, retries: usize, retry_delay_ms: u64) -> Self {
        self.retries = retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    currency: Option<String>,
    #[serde(alias = "gmtoffset", default)]
    gmt_offset: i64,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

/// Pairs bar timestamps with adjusted closes, falling back to raw closes when
/// the response has no adjusted series. Bars are dated in exchange local time.
fn extract_points(item: &ChartItem) -> Vec<(NaiveDate, Option<f64>)> {
    let (Some(timestamps), Some(indicators)) = (item.timestamp.as_ref(), item.indicators.as_ref())
    else {
        return Vec::new();
    };

    let closes = indicators
        .adjclose
        .first()
        .and_then(|a| a.adjclose.as_ref())
        .or_else(|| indicators.quote.first().and_then(|q| q.close.as_ref()));
    let Some(closes) = closes else {
        return Vec::new();
    };

    timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            Utc.timestamp_opt(ts + item.meta.gmt_offset, 0)
                .single()
                .map(|dt| (dt.date_naive(), close.filter(|p| p.is_finite())))
        })
        .collect()
}

fn to_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooHistoryFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        let cache_key = HistoryKey {
            symbol: symbol.to_string(),
            start,
            end,
        };
        if let Some(cached) = self.cache.get(&cache_key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplits&includeAdjustedClose=true",
            self.base_url,
            symbol,
            to_timestamp(start),
            to_timestamp(end)
        );
        debug!("Requesting price history from {}", url);

        let client = reqwest::Client::builder().user_agent("mvsim/0.1").build()?;
        let response = with_retry(|| client.get(&url).send(), self.retries, self.retry_delay_ms)
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        debug!(response = ?response, "Received Yahoo response");

        let status = response.status();
        let text = response.text().await?;
        let data: YahooChartResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                return Err(anyhow!("HTTP error: {} for symbol: {}", status, symbol));
            }
            Err(e) => {
                return Err(anyhow!(
                    "Failed to parse JSON response for {}: {}",
                    symbol,
                    e
                ));
            }
        };

        if let Some(error) = data.chart.error {
            return Err(anyhow!(
                "Yahoo error for symbol {}: {} {}",
                symbol,
                error.code.unwrap_or_default(),
                error.description.unwrap_or_default()
            ));
        }
        if !status.is_success() {
            return Err(anyhow!("HTTP error: {} for symbol: {}", status, symbol));
        }

        let item = data
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))?;

        let points = extract_points(&item);
        if points.is_empty() {
            return Err(anyhow!("No price history found for symbol: {}", symbol));
        }
        debug!("Parsed {} daily prices for {}", points.len(), symbol);

        let series = PriceSeries {
            symbol: symbol.to_string(),
            currency: item.meta.currency,
            points,
        };
        self.cache.put(cache_key, series.clone()).await;

        Ok(series)
    }
}
