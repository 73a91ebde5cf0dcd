use crate::error::AnalyticsError;
use crate::report::PortfolioMetrics;
use crate::weights::PortfolioWeights;
use core_types::AlignedPriceTable;

pub const DEFAULT_TRADING_DAYS_PER_YEAR: u32 = 252;

const DAYS_PER_YEAR: f64 = 365.25;

/// A stateless calculator for deriving return and risk metrics from an aligned price table.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    trading_days_per_year: u32,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TRADING_DAYS_PER_YEAR)
    }
}

impl AnalyticsEngine {
    pub fn new(trading_days_per_year: u32) -> Self {
        Self {
            trading_days_per_year: trading_days_per_year.max(1),
        }
    }

    /// The main entry point for calculating portfolio metrics.
    ///
    /// # Arguments
    ///
    /// * `table` - Close prices of every ticker on their common dates.
    /// * `weights` - One normalised weight per ticker, in table column order.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PortfolioMetrics` or an `AnalyticsError`.
    pub fn calculate(
        &self,
        table: &AlignedPriceTable,
        weights: &PortfolioWeights,
    ) -> Result<PortfolioMetrics, AnalyticsError> {
        if table.is_empty() || table.ticker_count() == 0 {
            return Err(AnalyticsError::NoOverlap {
                tickers: table.tickers().to_vec(),
            });
        }
        if weights.len() != table.ticker_count() {
            return Err(AnalyticsError::WeightMismatch {
                expected: table.ticker_count(),
                got: weights.len(),
            });
        }
        if table.row_count() < 2 {
            return Err(AnalyticsError::NotEnoughData(
                "at least two common dates are needed to compute a return".to_string(),
            ));
        }

        let returns = portfolio_returns(table, weights);
        let cumulative = cumulative_returns(&returns);

        let mut report = PortfolioMetrics::new();
        report.trading_days = returns.len();
        report.elapsed_days = table.elapsed_days();
        report.total_return = cumulative.last().copied().unwrap_or(0.0);

        self.calculate_growth(&mut report);
        self.calculate_risk(&returns, &mut report);
        report.max_drawdown = max_drawdown(&cumulative);

        tracing::debug!(
            tickers = ?table.tickers(),
            trading_days = report.trading_days,
            total_return = report.total_return,
            max_drawdown = report.max_drawdown,
            "Calculated portfolio metrics"
        );

        Ok(report)
    }

    /// CAGR over the calendar span of the table.
    fn calculate_growth(&self, report: &mut PortfolioMetrics) {
        // Spans shorter than a day are treated as one day.
        let span = report.elapsed_days.max(1.0);
        report.cagr = (1.0 + report.total_return).powf(DAYS_PER_YEAR / span) - 1.0;
    }

    /// Annualised mean, volatility and Sharpe ratio of the daily returns.
    fn calculate_risk(&self, returns: &[f64], report: &mut PortfolioMetrics) {
        let periods = f64::from(self.trading_days_per_year);

        let mean = mean(returns);
        let std_dev = sample_std_dev(returns, mean);

        report.annualized_return = mean * periods;
        report.annualized_volatility = std_dev * periods.sqrt();

        // Risk-free rate is taken as zero.
        report.sharpe_ratio = if report.annualized_volatility == 0.0 {
            None
        } else {
            Some(report.annualized_return / report.annualized_volatility)
        };
    }
}

/// Computes portfolio metrics with a one-off [`AnalyticsEngine`].
pub fn compute_portfolio_metrics(
    table: &AlignedPriceTable,
    weights: &PortfolioWeights,
    trading_days_per_year: u32,
) -> Result<PortfolioMetrics, AnalyticsError> {
    AnalyticsEngine::new(trading_days_per_year).calculate(table, weights)
}

/// Simple day-over-day returns; the first price has no return.
///
/// A zero prior price yields a zero return for that step.
pub fn daily_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { w[1] / w[0] - 1.0 })
        .collect()
}

/// The weighted sum of each ticker's daily return, per day.
pub fn portfolio_returns(table: &AlignedPriceTable, weights: &PortfolioWeights) -> Vec<f64> {
    let per_ticker: Vec<Vec<f64>> = table.columns().iter().map(|c| daily_returns(c)).collect();
    let days = table.row_count().saturating_sub(1);

    (0..days)
        .map(|t| {
            per_ticker
                .iter()
                .zip(weights.values())
                .map(|(r, w)| w * r[t])
                .sum()
        })
        .collect()
}

/// Compounded return since the start, beginning with 0 before the first return.
///
/// The output is one element longer than `returns`.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(returns.iter().scan(1.0_f64, |wealth, r| {
            *wealth *= 1.0 + r;
            Some(*wealth - 1.0)
        }))
        .collect()
}

/// The most negative `wealth / running_peak - 1`, where `wealth = 1 + cumulative`.
///
/// Zero when wealth never falls below a previous high.
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for c in cumulative {
        let wealth = 1.0 + c;
        if wealth > peak {
            peak = wealth;
        }
        if peak > 0.0 {
            let drawdown = wealth / peak - 1.0;
            if drawdown < worst {
                worst = drawdown;
            }
        }
    }

    worst
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); zero for fewer than two values.
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::PriceSeries;
    use proptest::prelude::*;

    fn table(columns: &[(&str, &[f64])]) -> AlignedPriceTable {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let series: Vec<PriceSeries> = columns
            .iter()
            .map(|(t, c)| PriceSeries::from_closes(*t, start, c).unwrap())
            .collect();
        AlignedPriceTable::align(&series).unwrap()
    }

    #[test]
    fn constant_prices_give_zero_metrics() {
        let t = table(&[("A", &[50.0; 30]), ("B", &[20.0; 30])]);
        let m = compute_portfolio_metrics(&t, &PortfolioWeights::equal(2), 252).unwrap();

        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.cagr, 0.0);
        assert_eq!(m.annualized_return, 0.0);
        assert_eq!(m.annualized_volatility, 0.0);
        assert_eq!(m.sharpe_ratio, None);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.trading_days, 29);
    }

    #[test]
    fn two_ticker_example() {
        let t = table(&[("A", &[100.0, 110.0, 121.0]), ("B", &[100.0, 100.0, 100.0])]);
        let weights = PortfolioWeights::from_raw(&[0.5, 0.5], 2);

        let returns = portfolio_returns(&t, &weights);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.05).abs() < 1e-12);
        assert!((returns[1] - 0.05).abs() < 1e-12);

        let m = compute_portfolio_metrics(&t, &weights, 252).unwrap();
        assert!((m.total_return - 0.1025).abs() < 1e-12);
        assert!((m.annualized_return - 0.05 * 252.0).abs() < 1e-9);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.elapsed_days, 2.0);
        let expected_cagr = 1.1025_f64.powf(365.25 / 2.0) - 1.0;
        assert!((m.cagr - expected_cagr).abs() / expected_cagr < 1e-9);
    }

    #[test]
    fn monotonic_prices_have_no_drawdown() {
        let rising: Vec<f64> = (0..60).map(|i| 10.0 + (i as f64).powf(1.3)).collect();
        let t = table(&[("UP", &rising)]);
        let m = compute_portfolio_metrics(&t, &PortfolioWeights::equal(1), 252).unwrap();

        assert_eq!(m.max_drawdown, 0.0);
        assert!(m.total_return > 0.0);
        assert!(m.sharpe_ratio.unwrap() > 0.0);
    }

    #[test]
    fn drawdown_measures_peak_to_trough() {
        let t = table(&[("A", &[100.0, 120.0, 90.0, 110.0])]);
        let m = compute_portfolio_metrics(&t, &PortfolioWeights::equal(1), 252).unwrap();
        assert!((m.max_drawdown - (90.0 / 120.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn loss_on_first_day_counts_as_drawdown() {
        let t = table(&[("A", &[100.0, 80.0, 90.0])]);
        let m = compute_portfolio_metrics(&t, &PortfolioWeights::equal(1), 252).unwrap();
        assert!((m.max_drawdown + 0.2).abs() < 1e-12);
    }

    #[test]
    fn volatility_uses_sample_std_dev() {
        let t = table(&[("A", &[100.0, 110.0, 99.0])]);
        let m = compute_portfolio_metrics(&t, &PortfolioWeights::equal(1), 252).unwrap();

        let r = [0.1, -0.1];
        let var = r.iter().map(|x: &f64| x.powi(2)).sum::<f64>() / 1.0;
        assert!((m.annualized_volatility - var.sqrt() * 252f64.sqrt()).abs() < 1e-9);
        assert!(m.annualized_return.abs() < 1e-12);
    }

    #[test]
    fn single_row_is_not_enough() {
        let t = table(&[("A", &[100.0])]);
        let err = compute_portfolio_metrics(&t, &PortfolioWeights::equal(1), 252).unwrap_err();
        assert!(matches!(err, AnalyticsError::NotEnoughData(_)));
    }

    #[test]
    fn weight_count_must_match() {
        let t = table(&[("A", &[1.0, 2.0]), ("B", &[1.0, 2.0])]);
        let err = compute_portfolio_metrics(&t, &PortfolioWeights::equal(3), 252).unwrap_err();
        assert_eq!(err, AnalyticsError::WeightMismatch { expected: 2, got: 3 });
    }

    #[test]
    fn zero_prior_price_is_guarded() {
        assert_eq!(daily_returns(&[0.0, 5.0, 10.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn cumulative_starts_at_zero() {
        let c = cumulative_returns(&[0.1, -0.5]);
        assert_eq!(c.len(), 3);
        assert_eq!(c[0], 0.0);
        assert!((c[1] - 0.1).abs() < 1e-12);
        assert!((c[2] + 0.45).abs() < 1e-12);
    }

    fn close_enough(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
    }

    proptest! {
        #[test]
        fn metrics_are_scale_invariant_in_weights(
            raw in prop::collection::vec(0.01f64..10.0, 3),
            scale in 0.001f64..1000.0,
        ) {
            let t = table(&[
                ("A", &[100.0, 103.0, 99.0, 105.0, 108.0, 104.0]),
                ("B", &[50.0, 49.0, 51.0, 52.0, 50.5, 53.0]),
                ("C", &[10.0, 10.5, 10.2, 9.8, 10.1, 10.9]),
            ]);
            let scaled: Vec<f64> = raw.iter().map(|w| w * scale).collect();

            let a = compute_portfolio_metrics(&t, &PortfolioWeights::from_raw(&raw, 3), 252).unwrap();
            let b = compute_portfolio_metrics(&t, &PortfolioWeights::from_raw(&scaled, 3), 252).unwrap();

            prop_assert!(close_enough(a.total_return, b.total_return));
            prop_assert!(close_enough(a.cagr, b.cagr));
            prop_assert!(close_enough(a.annualized_return, b.annualized_return));
            prop_assert!(close_enough(a.annualized_volatility, b.annualized_volatility));
            prop_assert!(close_enough(a.max_drawdown, b.max_drawdown));
            prop_assert!(close_enough(a.sharpe_ratio.unwrap(), b.sharpe_ratio.unwrap()));
        }

        #[test]
        fn rising_prices_never_draw_down(steps in prop::collection::vec(0.0f64..5.0, 2..50)) {
            let mut price = 10.0;
            let prices: Vec<f64> = steps.iter().map(|s| { price += s; price }).collect();
            let t = table(&[("UP", &prices)]);
            let m = compute_portfolio_metrics(&t, &PortfolioWeights::equal(1), 252).unwrap();
            prop_assert_eq!(m.max_drawdown, 0.0);
        }
    }
}
