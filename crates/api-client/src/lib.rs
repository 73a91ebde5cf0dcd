//! # Price Data Providers
//!
//! This crate is the only place that talks to the outside world for market
//! data. Every source of daily price history implements [`PriceProvider`], so
//! the rest of the workspace never knows whether bars came from Yahoo
//! Finance, a directory of CSV files, or an in-memory fixture.
//!
//! ## Architectural Principles
//!
//! - **One contract:** `fetch_daily_history` returns a validated
//!   `PriceSeries` (sorted, unique dates) or an `ApiError`. Providers never
//!   return an empty series; an empty range is `ApiError::NoData`.
//! - **Failures are per ticker:** [`fetch_batch`] runs every download
//!   concurrently and keeps the failures next to the successes instead of
//!   aborting the whole batch.
//! - **Symbols are normalised up front:** [`normalize_ticker`] turns user
//!   input such as `reliance` into the provider symbol `RELIANCE.NS`.
//!
//! ## Public API
//!
//! - [`PriceProvider`]: the async trait implemented by every source.
//! - [`YahooClient`], [`CsvPriceSource`], [`InMemoryProvider`]: the sources.
//! - [`CachedProvider`]: memoises any provider for the life of the process.
//! - [`fetch_batch`], [`BatchFetch`], [`FailedTicker`]: concurrent downloads.
//! - [`normalize_ticker`], [`parse_tickers`]: symbol handling.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceSeries;

pub mod batch;
pub mod cache;
pub mod csv_source;
pub mod error;
pub mod memory;
pub mod responses;
pub mod symbols;
pub mod yahoo;

// --- Public API ---
pub use batch::{BatchFetch, FailedTicker, fetch_batch};
pub use cache::CachedProvider;
pub use csv_source::CsvPriceSource;
pub use error::ApiError;
pub use memory::InMemoryProvider;
pub use symbols::{normalize_ticker, parse_tickers};
pub use yahoo::YahooClient;

/// The abstract interface for a source of daily OHLCV history.
///
/// Implementations must be safe to share across tasks; the portfolio manager
/// holds them behind an `Arc<dyn PriceProvider>`.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetches the daily bars for `ticker` with `start <= date <= end`.
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError>;
}

/// Keeps the bars of `series` that fall inside `[start, end]`.
pub(crate) fn slice_range(
    series: &PriceSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, ApiError> {
    let bars: Vec<_> = series
        .bars()
        .iter()
        .filter(|b| b.date >= start && b.date <= end)
        .cloned()
        .collect();
    if bars.is_empty() {
        return Err(ApiError::NoData(series.ticker().to_string()));
    }
    Ok(PriceSeries::new(series.ticker(), bars)?)
}
