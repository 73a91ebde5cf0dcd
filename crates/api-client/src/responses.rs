use crate::error::ApiError;
use chrono::{DateTime, NaiveDate};
use core_types::{PriceBar, PriceSeries};
use serde::Deserialize;

/// The envelope of a `GET /v8/finance/chart/{symbol}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

/// The error object Yahoo returns for unknown or delisted symbols.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    /// Bar timestamps in unix seconds. Absent when the range holds no trading days.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds, used to recover the trading date.
    #[serde(default)]
    pub gmtoffset: i64,
    pub exchange_timezone_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

/// Column-oriented OHLCV values. Any entry may be null on halted days.
#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

/// Converts a chart response body into a `PriceSeries`.
///
/// Rows with a missing open, high, low or close are skipped; a missing volume
/// is read as zero. When two rows fall on the same trading date (Yahoo appends
/// the live bar during market hours), the later one wins.
pub fn parse_chart(ticker: &str, body: &str) -> Result<PriceSeries, ApiError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(ApiError::Provider {
            ticker: ticker.to_string(),
            message: format!("{}: {}", error.code, error.description),
        });
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ApiError::NoData(ticker.to_string()))?;

    let quote = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| ApiError::NoData(ticker.to_string()))?;

    let value = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

    let mut bars: Vec<PriceBar> = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            value(&quote.open, i),
            value(&quote.high, i),
            value(&quote.low, i),
            value(&quote.close, i),
        ) else {
            tracing::debug!(ticker, timestamp = ts, "Skipping incomplete bar");
            continue;
        };

        let date = trading_date(ts, result.meta.gmtoffset)?;
        let bar = PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume: value(&quote.volume, i).unwrap_or(0.0),
        };

        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            _ => bars.push(bar),
        }
    }

    if bars.is_empty() {
        return Err(ApiError::NoData(ticker.to_string()));
    }

    Ok(PriceSeries::new(ticker, bars)?)
}

fn trading_date(timestamp: i64, gmtoffset: i64) -> Result<NaiveDate, ApiError> {
    DateTime::from_timestamp(timestamp + gmtoffset, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {}", timestamp)))
}
