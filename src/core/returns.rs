//! Period-over-period fractional returns.
use crate::core::error::{MarkowitzError, Result};
use crate::core::price::PriceTable;
use chrono::NaiveDate;
use tracing::debug;

/// Fractional returns, one row per date after the first price row.
///
/// `None` marks a return that could not be computed because a price on
/// either side was missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnTable {
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
}

impl ReturnTable {
    /// Builds a table from already computed returns.
    ///
    /// Dates must be strictly ascending and every defined return finite.
    pub fn new(
        assets: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if dates.len() != rows.len() {
            return Err(MarkowitzError::invalid_return_table(format!(
                "{} dates for {} rows",
                dates.len(),
                rows.len()
            )));
        }
        if let Some(pos) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(MarkowitzError::invalid_return_table(format!(
                "dates not strictly ascending at {}",
                dates[pos + 1]
            )));
        }
        for (date, row) in dates.iter().zip(&rows) {
            if row.len() != assets.len() {
                return Err(MarkowitzError::invalid_return_table(format!(
                    "row for {date} has {} entries, expected {}",
                    row.len(),
                    assets.len()
                )));
            }
            if let Some((asset, value)) = row
                .iter()
                .zip(&assets)
                .find_map(|(&value, asset)| value.filter(|v| !v.is_finite()).map(|v| (asset, v)))
            {
                return Err(MarkowitzError::NonFiniteData {
                    asset: asset.clone(),
                    date: date.to_string(),
                    value,
                });
            }
        }
        Ok(Self {
            assets,
            dates,
            rows,
        })
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

    /// Removes every row that holds at least one undefined return.
    pub fn drop_incomplete(self) -> Self {
        let before = self.rows.len();
        let (dates, rows): (Vec<_>, Vec<_>) = self
            .dates
            .into_iter()
            .zip(self.rows)
            .filter(|(_, row)| row.iter().all(Option::is_some))
            .unzip();
        debug!(
            "Dropped {} incomplete return rows, {} remain",
            before - rows.len(),
            rows.len()
        );
        Self {
            assets: self.assets,
            dates,
            rows,
        }
    }
}

/// Computes `price[t] / price[t-1] - 1` for every asset and row `t > 0`.
///
/// Rows where no asset has a defined return are dropped; partially defined
/// rows are kept with `None` entries.
pub fn compute_returns(prices: &PriceTable) -> Result<ReturnTable> {
    if prices.len() < 2 {
        return Err(MarkowitzError::insufficient_data(
            "return calculation (price rows)",
            2,
            prices.len(),
        ));
    }

    let mut dates = Vec::with_capacity(prices.len() - 1);
    let mut rows = Vec::with_capacity(prices.len() - 1);

    for (window, date) in prices.rows().windows(2).zip(&prices.dates()[1..]) {
        let row: Vec<Option<f64>> = window[0]
            .iter()
            .zip(&window[1])
            .map(|(prev, curr)| match (prev, curr) {
                (Some(prev), Some(curr)) => Some(curr / prev - 1.0).filter(|r| r.is_finite()),
                _ => None,
            })
            .collect();

        if row.iter().any(Option::is_some) {
            dates.push(*date);
            rows.push(row);
        } else {
            debug!("Skipping return row for {date}: no asset has two consecutive prices");
        }
    }

    Ok(ReturnTable {
        assets: prices.assets().to_vec(),
        dates,
        rows,
    })
}
