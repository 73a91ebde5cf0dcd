//! # Portfolio Analytics Engine
//!
//! This crate turns an aligned table of close prices and a weight vector into
//! the return and risk profile of the combined portfolio.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No knowledge of data sources. It depends only on `core-types`.
//! - **Stateless Calculation:** The `AnalyticsEngine` holds only the annualisation
//!   factor. It takes borrowed input and produces a `PortfolioMetrics` report.
//!
//! ## Public API
//!
//! - `compute_portfolio_metrics` / `AnalyticsEngine`: the calculation entry points.
//! - `PortfolioWeights`: normalised weights with an equal-weight fallback.
//! - `PortfolioMetrics`: total return, CAGR, annualised return and volatility,
//!   Sharpe ratio and max drawdown.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod weights;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{
    AnalyticsEngine, DEFAULT_TRADING_DAYS_PER_YEAR, compute_portfolio_metrics, cumulative_returns,
    daily_returns, max_drawdown, portfolio_returns,
};
pub use error::AnalyticsError;
pub use report::PortfolioMetrics;
pub use weights::{InvalidWeights, PortfolioWeights};
