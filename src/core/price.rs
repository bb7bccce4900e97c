//! Price history abstractions and the aligned price table fed to the core.

use crate::core::error::{MarkowitzError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Dated adjusted closes of a single asset, as returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub currency: Option<String>,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<PriceSeries>;
}

/// Date-indexed table of adjusted closes, one column per asset.
///
/// Rows are strictly ascending by date, every row has one entry per asset and
/// rows with no price at all are dropped on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    pub fn new(
        assets: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        check_unique_assets(&assets)?;

        if dates.len() != rows.len() {
            return Err(MarkowitzError::invalid_price_table(format!(
                "{} dates for {} rows",
                dates.len(),
                rows.len()
            )));
        }
        if let Some(pos) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(MarkowitzError::invalid_price_table(format!(
                "dates not strictly ascending at {}",
                dates[pos + 1]
            )));
        }
        if let Some((date, row)) = dates
            .iter()
            .zip(&rows)
            .find(|(_, row)| row.len() != assets.len())
        {
            return Err(MarkowitzError::invalid_price_table(format!(
                "row for {date} has {} entries, expected {}",
                row.len(),
                assets.len()
            )));
        }

        let (dates, rows) = dates
            .into_iter()
            .zip(rows)
            .filter(|(_, row)| row.iter().any(Option::is_some))
            .unzip();

        Ok(Self {
            assets,
            dates,
            rows,
        })
    }

    /// Aligns per-asset series on the union of their dates.
    ///
    /// Dates missing from a series become `None` for that asset. Duplicate
    /// dates within a series keep the last observation.
    pub fn from_series(series: &[PriceSeries]) -> Result<Self> {
        let assets: Vec<String> = series.iter().map(|s| s.symbol.clone()).collect();
        check_unique_assets(&assets)?;

        let dates: BTreeSet<NaiveDate> = series
            .iter()
            .flat_map(|s| s.points.iter().map(|(date, _)| *date))
            .collect();
        let columns: Vec<BTreeMap<NaiveDate, Option<f64>>> = series
            .iter()
            .map(|s| s.points.iter().copied().collect())
            .collect();

        let rows = dates
            .iter()
            .map(|date| {
                columns
                    .iter()
                    .map(|column| column.get(date).copied().flatten())
                    .collect()
            })
            .collect();

        Self::new(assets, dates.into_iter().collect(), rows)
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn check_unique_assets(assets: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    match assets.iter().find(|a| !seen.insert(a.as_str())) {
        Some(dup) => Err(MarkowitzError::invalid_price_table(format!(
            "duplicate asset {dup}"
        ))),
        None => Ok(()),
    }
}
