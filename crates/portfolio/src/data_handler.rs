use crate::error::PortfolioError;
use api_client::{BatchFetch, FailedTicker, PriceProvider, fetch_batch, normalize_ticker};
use chrono::NaiveDate;

/// Normalises user-entered tickers, dropping duplicates.
///
/// Symbols that cannot be normalised are returned as failures rather than
/// aborting the run.
pub fn resolve_tickers(raw: &[String], market_suffix: &str) -> (Vec<String>, Vec<FailedTicker>) {
    let mut tickers = Vec::with_capacity(raw.len());
    let mut failed = Vec::new();

    for input in raw {
        match normalize_ticker(input, market_suffix) {
            Ok(ticker) if !tickers.contains(&ticker) => tickers.push(ticker),
            Ok(_) => {}
            Err(e) => failed.push(FailedTicker {
                ticker: input.clone(),
                reason: e.to_string(),
            }),
        }
    }
    (tickers, failed)
}

/// Fetches the daily history of every ticker concurrently.
///
/// Individual failures are kept in the returned batch. Only when no ticker at
/// all could be loaded is the whole load an error.
pub async fn load_price_data(
    provider: &dyn PriceProvider,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BatchFetch, PortfolioError> {
    let batch = fetch_batch(provider, tickers, start, end).await;

    if batch.series.is_empty() {
        return Err(PortfolioError::NoData {
            tickers: tickers.to_vec(),
        });
    }

    if batch.is_complete() {
        tracing::info!(loaded = ?batch.tickers(), "Loaded price data");
    } else {
        tracing::warn!(
            loaded = ?batch.tickers(),
            failed = batch.failed.len(),
            "Loaded price data with failures"
        );
    }
    Ok(batch)
}
