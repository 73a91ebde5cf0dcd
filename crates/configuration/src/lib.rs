use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    Config, DataSettings, ForecastParams, LogFormat, LoggingSettings, PortfolioSettings,
    SignalParams,
};

/// Prefix for environment overrides, e.g. `TICKERLENS__SIGNALS__SHORT_WINDOW=10`.
pub const ENV_PREFIX: &str = "TICKERLENS";

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file (`path` if given,
/// otherwise an optional `tickerlens.toml` in the working directory), then
/// `TICKERLENS__*` environment variables. The result is validated before it is
/// returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name("tickerlens").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

impl Config {
    /// Rejects parameter values the engines cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signals.short_window == 0 || self.signals.long_window == 0 {
            return Err(ConfigError::ValidationError(
                "signal windows must be at least 1".to_string(),
            ));
        }
        if self.forecast.lags == 0 {
            return Err(ConfigError::ValidationError(
                "forecast.lags must be at least 1".to_string(),
            ));
        }
        if self.forecast.horizon == 0 {
            return Err(ConfigError::ValidationError(
                "forecast.horizon must be at least 1".to_string(),
            ));
        }
        if self.portfolio.trading_days_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "portfolio.trading_days_per_year must be at least 1".to_string(),
            ));
        }
        if !self.portfolio.investment_amount.is_finite() || self.portfolio.investment_amount < 0.0 {
            return Err(ConfigError::ValidationError(
                "portfolio.investment_amount must be a non-negative number".to_string(),
            ));
        }
        if self.signals.short_window >= self.signals.long_window {
            tracing::warn!(
                short = self.signals.short_window,
                long = self.signals.long_window,
                "Short SMA window is not shorter than the long window"
            );
        }
        Ok(())
    }
}
