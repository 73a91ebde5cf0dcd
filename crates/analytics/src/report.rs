use serde::{Deserialize, Serialize};

/// Return and risk metrics of a weighted portfolio over an aligned period.
///
/// All rates are fractions (0.1 means 10%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_return: f64,
    pub cagr: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: Option<f64>, // None when volatility is exactly zero
    /// Worst peak-to-trough decline of cumulative wealth; zero or negative.
    pub max_drawdown: f64,

    /// Number of daily returns the metrics were computed from.
    pub trading_days: usize,
    /// Calendar days between the first and last aligned date.
    pub elapsed_days: f64,
}

impl PortfolioMetrics {
    /// Creates a zeroed-out report.
    pub fn new() -> Self {
        Self {
            total_return: 0.0,
            cagr: 0.0,
            annualized_return: 0.0,
            annualized_volatility: 0.0,
            sharpe_ratio: None,
            max_drawdown: 0.0,
            trading_days: 0,
            elapsed_days: 0.0,
        }
    }
}

impl Default for PortfolioMetrics {
    fn default() -> Self {
        Self::new()
    }
}
