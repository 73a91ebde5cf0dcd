use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Not enough history to train a forecaster: {rows} usable rows, at least {required} required")]
    InsufficientData { rows: usize, required: usize },

    #[error("Forecaster received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Least-squares solve failed: {0}")]
    Solver(String),
}
