//! # Forecast Engine
//!
//! Short-horizon close price forecasts from a linear model over lagged closes.
//!
//! The engine builds one training row per day (the previous `lags` closes as
//! features, the day's close as label), fits ordinary least squares, and
//! rolls the model forward one day at a time, feeding each prediction back
//! in as the newest lag.

pub mod error;
pub mod features;
pub mod forecast;
pub mod model;

pub use error::ForecastError;
pub use features::{LagFeatureRow, build_lag_dataset};
pub use forecast::{
    DEFAULT_MIN_TRAINING_ROWS, ForecastResult, ForecastSettings, Trend, train_and_forecast,
    train_and_forecast_with,
};
pub use model::LinearModel;
