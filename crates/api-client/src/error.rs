use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build the HTTP request: {0}")]
    RequestBuild(#[from] reqwest::Error),

    #[error("The price provider returned an error for {ticker}: {message}")]
    Provider { ticker: String, message: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from provider: {0}")]
    InvalidData(String),

    #[error("No price data available for {0}")]
    NoData(String),

    #[error("Invalid ticker symbol: '{0}'")]
    InvalidTicker(String),

    #[error("Failed to read price file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse price file: {0}")]
    Csv(#[from] csv::Error),
}

impl From<core_types::CoreError> for ApiError {
    fn from(error: core_types::CoreError) -> Self {
        ApiError::InvalidData(error.to_string())
    }
}
