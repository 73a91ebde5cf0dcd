use crate::error::PortfolioError;
use analytics::{AnalyticsError, PortfolioWeights};
use chrono::NaiveDate;
use core_types::AlignedPriceTable;
use serde::Serialize;

/// A buy-and-hold position sized from the latest prices, valued over history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub tickers: Vec<String>,
    pub investment_amount: f64,
    /// Fractional share counts, one per ticker.
    pub shares: Vec<f64>,
    pub dates: Vec<NaiveDate>,
    /// Value of the fixed holdings on each aligned date.
    pub values: Vec<f64>,
}

impl Allocation {
    pub fn final_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// `(date, value)` pairs in chronological order.
    pub fn history(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// Sizes holdings as if `investment_amount` were split by `weights` at the
/// last aligned close, then values those fixed holdings on every date.
///
/// No rebalancing happens. The historical curve therefore answers "what would
/// today's purchase have been worth on each past date", not a backtest.
pub fn simulate_allocation(
    table: &AlignedPriceTable,
    weights: &PortfolioWeights,
    investment_amount: f64,
) -> Result<Allocation, PortfolioError> {
    if !investment_amount.is_finite() || investment_amount < 0.0 {
        return Err(PortfolioError::InvalidRequest(format!(
            "investment amount must be a non-negative number, got {}",
            investment_amount
        )));
    }
    if table.is_empty() {
        return Err(AnalyticsError::NoOverlap {
            tickers: table.tickers().to_vec(),
        }
        .into());
    }
    if weights.len() != table.ticker_count() {
        return Err(AnalyticsError::WeightMismatch {
            expected: table.ticker_count(),
            got: weights.len(),
        }
        .into());
    }

    let last_prices = table.last_row();
    let shares: Vec<f64> = weights
        .values()
        .iter()
        .zip(&last_prices)
        .zip(table.tickers())
        .map(|((w, price), ticker)| {
            if *price > 0.0 {
                w * investment_amount / price
            } else {
                tracing::warn!(ticker = %ticker, "Latest price is zero; allocating no shares");
                0.0
            }
        })
        .collect();

    let values: Vec<f64> = (0..table.row_count())
        .map(|row| {
            table
                .columns()
                .iter()
                .zip(&shares)
                .map(|(column, n)| n * column[row])
                .sum()
        })
        .collect();

    tracing::debug!(tickers = ?table.tickers(), ?shares, "Simulated allocation");

    Ok(Allocation {
        tickers: table.tickers().to_vec(),
        investment_amount,
        shares,
        dates: table.dates().to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::PriceSeries;

    fn table(columns: Vec<(&str, Vec<f64>)>) -> AlignedPriceTable {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let series: Vec<PriceSeries> = columns
            .into_iter()
            .map(|(t, closes)| PriceSeries::from_closes(t, start, &closes).unwrap())
            .collect();
        AlignedPriceTable::align(&series).unwrap()
    }

    #[test]
    fn shares_are_sized_from_latest_prices() {
        let t = table(vec![("A", vec![80.0, 90.0, 100.0]), ("B", vec![60.0, 55.0, 50.0])]);
        let alloc = simulate_allocation(&t, &PortfolioWeights::equal(2), 1000.0).unwrap();

        assert!((alloc.shares[0] - 5.0).abs() < 1e-9);
        assert!((alloc.shares[1] - 10.0).abs() < 1e-9);
        assert!((alloc.final_value().unwrap() - 1000.0).abs() < 1e-9);

        // 5 * 80 + 10 * 60
        assert!((alloc.values[0] - 1000.0).abs() < 1e-9);
        // 5 * 90 + 10 * 55
        assert!((alloc.values[1] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn zero_latest_price_allocates_nothing() {
        let t = table(vec![("A", vec![10.0, 0.0]), ("B", vec![20.0, 20.0])]);
        let alloc = simulate_allocation(&t, &PortfolioWeights::equal(2), 100.0).unwrap();
        assert_eq!(alloc.shares[0], 0.0);
        assert!((alloc.shares[1] - 2.5).abs() < 1e-9);
    }

    #[test]
    fn mismatched_weights_are_rejected() {
        let t = table(vec![("A", vec![10.0, 11.0])]);
        let err = simulate_allocation(&t, &PortfolioWeights::equal(2), 100.0).unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::Analytics(AnalyticsError::WeightMismatch { expected: 1, got: 2 })
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let t = table(vec![("A", vec![10.0, 11.0])]);
        assert!(simulate_allocation(&t, &PortfolioWeights::equal(1), -1.0).is_err());
    }
}
