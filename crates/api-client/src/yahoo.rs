use crate::error::ApiError;
use crate::responses::parse_chart;
use crate::PriceProvider;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use core_types::PriceSeries;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = concat!("tickerlens/", env!("CARGO_PKG_VERSION"));

/// A `PriceProvider` backed by the public Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Points the client at a different host, e.g. a local mirror.
    pub fn with_base_url(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, ticker)
    }
}

/// Unix seconds at midnight UTC of `date`.
fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        if end < start {
            return Err(ApiError::InvalidData(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }

        // period2 is exclusive; push it one day past `end`.
        let period_end = end.checked_add_days(Days::new(1)).unwrap_or(end);
        let period1 = unix_seconds(start).to_string();
        let period2 = unix_seconds(period_end).to_string();

        tracing::debug!(ticker, %start, %end, "Requesting daily chart");

        let response = self
            .client
            .get(self.chart_url(ticker))
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "history"),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // Yahoo reports unknown symbols with a 404 that still carries a chart error body.
        if !status.is_success() && !text.contains("\"chart\"") {
            return Err(ApiError::Provider {
                ticker: ticker.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let series = parse_chart(ticker, &text)?;
        if series.is_empty() {
            return Err(ApiError::NoData(ticker.to_string()));
        }

        tracing::info!(ticker, bars = series.len(), "Fetched daily history");
        Ok(series)
    }
}
