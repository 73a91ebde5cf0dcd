//! # Portfolio Analysis
//!
//! This crate ties the workspace together. Given a list of tickers, a date
//! range and optional weights, the `PortfolioManager` fetches prices, runs
//! the signal engine per ticker, forecasts the primary ticker, and evaluates
//! the weighted basket.
//!
//! ## Architectural Principles
//!
//! - **Partial results over hard failures:** a ticker that fails to load, a
//!   forecast without enough history, or tickers with no common dates are
//!   recorded on the `AnalysisReport` instead of aborting the run.
//! - **Provider agnostic:** the manager holds an `Arc<dyn PriceProvider>`, so
//!   live, CSV and in-memory sources are interchangeable.

pub mod allocation;
pub mod data_handler;
pub mod error;
pub mod manager;

pub use allocation::{Allocation, simulate_allocation};
pub use data_handler::{load_price_data, resolve_tickers};
pub use error::PortfolioError;
pub use manager::{
    AnalysisReport, AnalysisRequest, ForecastSection, PortfolioManager, PortfolioSection,
    TickerAnalysis,
};
