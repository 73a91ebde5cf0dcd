//! # Signal Engine
//!
//! Moving average crossover signals for daily price series.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of data sources or I/O. It
//!   depends only on `core-types`.
//! - **Stateless Calculation:** `compute_signals` borrows a `PriceSeries` and
//!   returns a freshly allocated `IndicatorSeries`; nothing is cached.
//!
//! ## Public API
//!
//! - `compute_signals`: short/long SMA, per-bar signal and crossover delta.
//! - `aggregate_signal`: an advisory basket-level BUY / SELL lean.
//! - `SignalError`: the error type for this crate.

pub mod aggregate;
pub mod error;
pub mod ma_crossover;

// Re-export the key components to create a clean, public-facing API.
pub use aggregate::{PortfolioTilt, Tilt, aggregate_signal};
pub use error::SignalError;
pub use ma_crossover::{
    CrossoverPoint, IndicatorRow, IndicatorSeries, RECENT_CROSSOVER_LIMIT, compute_signals,
};
