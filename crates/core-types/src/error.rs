use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("No common trading dates across tickers: {}", tickers.join(", "))]
    NoOverlap { tickers: Vec<String> },
}
