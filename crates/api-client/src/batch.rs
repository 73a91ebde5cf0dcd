use crate::PriceProvider;
use chrono::NaiveDate;
use core_types::PriceSeries;
use futures::future::join_all;
use serde::Serialize;

/// A ticker whose history could not be fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedTicker {
    pub ticker: String,
    pub reason: String,
}

/// The outcome of fetching several tickers at once.
#[derive(Debug, Clone, Default)]
pub struct BatchFetch {
    /// Successful series, in request order.
    pub series: Vec<PriceSeries>,
    /// Failures, in request order.
    pub failed: Vec<FailedTicker>,
}

impl BatchFetch {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn tickers(&self) -> Vec<String> {
        self.series.iter().map(|s| s.ticker().to_string()).collect()
    }
}

/// Fetches every ticker concurrently.
///
/// A failing ticker never aborts the batch; it is logged and reported in
/// [`BatchFetch::failed`].
pub async fn fetch_batch(
    provider: &dyn PriceProvider,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> BatchFetch {
    let fetches = tickers
        .iter()
        .map(|ticker| provider.fetch_daily_history(ticker, start, end));
    let results = join_all(fetches).await;

    let mut batch = BatchFetch::default();
    for (ticker, result) in tickers.iter().zip(results) {
        match result {
            Ok(series) => batch.series.push(series),
            Err(e) => {
                tracing::warn!(ticker = %ticker, error = %e, "Failed to fetch price history");
                batch.failed.push(FailedTicker {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    batch
}
