use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Price data error: {0}")]
    Api(#[from] api_client::ApiError),

    #[error("Signal error: {0}")]
    Signal(#[from] signals::SignalError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Data error: {0}")]
    Core(#[from] core_types::CoreError),

    #[error("Invalid analysis request: {0}")]
    InvalidRequest(String),

    #[error("No price data could be loaded for any of: {}", tickers.join(", "))]
    NoData { tickers: Vec<String> },
}
