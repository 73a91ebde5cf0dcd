use crate::error::ForecastError;
use crate::features::{build_lag_dataset, latest_window};
use crate::model::LinearModel;
use core_types::PriceSeries;
use serde::Serialize;
use std::fmt;

/// Fewer usable training rows than this and no model is fitted.
pub const DEFAULT_MIN_TRAINING_ROWS: usize = 20;

/// Parameters for one training + rollout run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastSettings {
    pub lags: usize,
    pub horizon: usize,
    pub min_training_rows: usize,
}

impl ForecastSettings {
    pub fn new(lags: usize, horizon: usize) -> Self {
        Self {
            lags,
            horizon,
            min_training_rows: DEFAULT_MIN_TRAINING_ROWS,
        }
    }
}

/// Predicted closes for the next `horizon` days plus the in-sample fit error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Forward chronological order: `predictions[0]` is the next day.
    pub predictions: Vec<f64>,
    /// In-sample root-mean-squared error of the fitted model.
    pub rmse: f64,
    pub training_rows: usize,
    pub lags: usize,
    pub model: LinearModel,
}

impl ForecastResult {
    /// Short-term direction: the final prediction against the last observed close.
    ///
    /// Only a strictly higher prediction counts as `Up`. `None` when there are
    /// no predictions.
    pub fn trend(&self, last_close: f64) -> Option<Trend> {
        let last_prediction = *self.predictions.last()?;
        if last_prediction > last_close {
            Some(Trend::Up)
        } else {
            Some(Trend::DownOrFlat)
        }
    }
}

/// Direction of the forecast horizon relative to the latest close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Up,
    DownOrFlat,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "UP"),
            Trend::DownOrFlat => write!(f, "DOWN/FLAT"),
        }
    }
}

/// Trains a lagged-close linear model on `series` and forecasts `horizon` closes.
///
/// Uses the default minimum of 20 training rows.
pub fn train_and_forecast(
    series: &PriceSeries,
    lags: usize,
    horizon: usize,
) -> Result<ForecastResult, ForecastError> {
    train_and_forecast_with(series, ForecastSettings::new(lags, horizon))
}

/// Same as [`train_and_forecast`] with an explicit training-row threshold.
///
/// Each forecast step feeds its own prediction back as the newest lag, so
/// the steps run strictly one after another. Predictions are not clipped;
/// a degenerate history can produce negative prices.
pub fn train_and_forecast_with(
    series: &PriceSeries,
    settings: ForecastSettings,
) -> Result<ForecastResult, ForecastError> {
    let ForecastSettings {
        lags,
        horizon,
        min_training_rows,
    } = settings;

    if lags == 0 {
        return Err(ForecastError::InvalidParameters("lags must be at least 1".to_string()));
    }
    if horizon == 0 {
        return Err(ForecastError::InvalidParameters("horizon must be at least 1".to_string()));
    }

    let closes = series.closes();
    let usable_rows = closes.len().saturating_sub(lags);
    let required = min_training_rows.max(1);
    if usable_rows < required {
        tracing::warn!(
            ticker = series.ticker(),
            usable_rows,
            required,
            "Skipping forecast: not enough history"
        );
        return Err(ForecastError::InsufficientData {
            rows: usable_rows,
            required,
        });
    }

    let dataset = build_lag_dataset(&closes, lags);
    let model = LinearModel::fit(&dataset)?;
    let rmse = model.rmse(&dataset);

    let mut window = latest_window(&closes, lags).ok_or(ForecastError::InsufficientData {
        rows: usable_rows,
        required,
    })?;

    let mut predictions = Vec::with_capacity(horizon);
    for step in 0..horizon {
        let next = model.predict_row(&window);
        tracing::debug!(ticker = series.ticker(), step = step + 1, prediction = next, "Forecast step");
        predictions.push(next);

        // Slide the window: the prediction becomes the most recent lag.
        window.rotate_right(1);
        window[0] = next;
    }

    tracing::info!(
        ticker = series.ticker(),
        lags,
        horizon,
        training_rows = dataset.len(),
        rmse,
        "Forecast complete"
    );

    Ok(ForecastResult {
        predictions,
        rmse,
        training_rows: dataset.len(),
        lags,
        model,
    })
}
