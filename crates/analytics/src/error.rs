use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No common trading dates across tickers: {}", tickers.join(", "))]
    NoOverlap { tickers: Vec<String> },

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Expected {expected} weights (one per ticker), got {got}")]
    WeightMismatch { expected: usize, got: usize },
}

impl From<core_types::CoreError> for AnalyticsError {
    fn from(error: core_types::CoreError) -> Self {
        match error {
            core_types::CoreError::NoOverlap { tickers } => AnalyticsError::NoOverlap { tickers },
            other => AnalyticsError::NotEnoughData(other.to_string()),
        }
    }
}
