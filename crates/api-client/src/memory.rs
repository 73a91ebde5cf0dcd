use crate::error::ApiError;
use crate::{PriceProvider, slice_range};
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceSeries;
use std::collections::HashMap;

/// Serves pre-loaded series. Used by tests and for replaying saved data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `series` under its own ticker, replacing any earlier entry.
    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.ticker().to_string(), series);
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }
}

#[async_trait]
impl PriceProvider for InMemoryProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        let series = self
            .series
            .get(ticker)
            .ok_or_else(|| ApiError::NoData(ticker.to_string()))?;
        slice_range(series, start, end)
    }
}
