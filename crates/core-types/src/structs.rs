use crate::error::CoreError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One daily OHLCV observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// A bar where every price field equals `close` and volume is zero.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    fn validate(&self, ticker: &str) -> Result<(), CoreError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidInput(
                    ticker.to_string(),
                    format!("{} on {} must be a non-negative number, got {}", name, self.date, value),
                ));
            }
        }
        Ok(())
    }
}

/// The daily price history of a single ticker.
///
/// Bars are kept in strictly increasing date order. The series is immutable
/// once built; engines only ever borrow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series, sorting bars by date.
    ///
    /// Fails on duplicate dates or on negative / non-finite values.
    pub fn new(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> Result<Self, CoreError> {
        let ticker = ticker.into();
        bars.sort_by_key(|b| b.date);

        for bar in &bars {
            bar.validate(&ticker)?;
        }
        if let Some(dup) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(CoreError::InvalidInput(
                ticker,
                format!("duplicate bar for {}", dup[0].date),
            ));
        }

        Ok(Self { ticker, bars })
    }

    /// Builds a series of close-only bars on consecutive calendar days starting at `start`.
    pub fn from_closes(
        ticker: impl Into<String>,
        start: NaiveDate,
        closes: &[f64],
    ) -> Result<Self, CoreError> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::from_close(start + Duration::days(i as i64), c))
            .collect();
        Self::new(ticker, bars)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Close prices of several tickers restricted to the dates they all share.
///
/// Every column has exactly `dates().len()` entries, and row `t` of each
/// column refers to `dates()[t]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPriceTable {
    tickers: Vec<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<f64>>,
}

impl AlignedPriceTable {
    /// Inner-joins the series on date.
    ///
    /// Returns `CoreError::NoOverlap` when no date is common to all series or
    /// when no series are given.
    pub fn align(series: &[PriceSeries]) -> Result<Self, CoreError> {
        let tickers: Vec<String> = series.iter().map(|s| s.ticker().to_string()).collect();

        let mut common: Option<BTreeSet<NaiveDate>> = None;
        for s in series {
            let dates: BTreeSet<NaiveDate> = s.bars().iter().map(|b| b.date).collect();
            common = Some(match common {
                None => dates,
                Some(acc) => acc.intersection(&dates).copied().collect(),
            });
        }

        let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();
        if dates.is_empty() {
            return Err(CoreError::NoOverlap { tickers });
        }

        let columns = series
            .iter()
            .map(|s| {
                let by_date: HashMap<NaiveDate, f64> =
                    s.bars().iter().map(|b| (b.date, b.close)).collect();
                dates.iter().map(|d| by_date[d]).collect()
            })
            .collect();

        tracing::debug!(
            tickers = ?tickers,
            rows = dates.len(),
            "Aligned price table on common dates"
        );

        Ok(Self {
            tickers,
            dates,
            columns,
        })
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Close prices of the `i`-th ticker.
    pub fn column(&self, i: usize) -> &[f64] {
        &self.columns[i]
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn ticker_count(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Close prices of every ticker on the final common date.
    pub fn last_row(&self) -> Vec<f64> {
        self.columns
            .iter()
            .map(|c| c.last().copied().unwrap_or(0.0))
            .collect()
    }

    /// Calendar days between the first and last common date.
    pub fn elapsed_days(&self) -> f64 {
        match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) => (*last - *first).num_days() as f64,
            _ => 0.0,
        }
    }
}
