use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("Signal engine received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("An error occurred during indicator calculation: {0}")]
    IndicatorError(String),
}
