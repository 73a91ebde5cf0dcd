use crate::PriceProvider;
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceSeries;
use dashmap::DashMap;
use std::sync::Arc;

type CacheKey = (String, NaiveDate, NaiveDate);

/// Memoises successful fetches of an inner provider.
///
/// Errors are not cached, so a transient failure is retried on the next call.
pub struct CachedProvider {
    inner: Arc<dyn PriceProvider>,
    entries: DashMap<CacheKey, PriceSeries>,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn PriceProvider>) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl PriceProvider for CachedProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        let key = (ticker.to_string(), start, end);
        if let Some(hit) = self.entries.get(&key) {
            tracing::debug!(ticker, "Price cache hit");
            return Ok(hit.value().clone());
        }

        let series = self.inner.fetch_daily_history(ticker, start, end).await?;
        self.entries.insert(key, series.clone());
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceProvider for CountingProvider {
        async fn fetch_daily_history(
            &self,
            ticker: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<PriceSeries, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if ticker == "FAIL" {
                return Err(ApiError::NoData(ticker.to_string()));
            }
            Ok(PriceSeries::from_closes(ticker, start, &[1.0, 2.0])?)
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let inner = Arc::new(CountingProvider { calls: AtomicUsize::new(0) });
        let cached = CachedProvider::new(inner.clone());

        let first = cached.fetch_daily_history("AAA", date(1), date(2)).await.unwrap();
        let second = cached.fetch_daily_history("AAA", date(1), date(2)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len(), 1);

        // A different range is a different key.
        cached.fetch_daily_history("AAA", date(1), date(3)).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let inner = Arc::new(CountingProvider { calls: AtomicUsize::new(0) });
        let cached = CachedProvider::new(inner.clone());

        assert!(cached.fetch_daily_history("FAIL", date(1), date(2)).await.is_err());
        assert!(cached.fetch_daily_history("FAIL", date(1), date(2)).await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert!(cached.is_empty());
    }
}
