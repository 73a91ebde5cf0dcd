use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSettings,
    pub signals: SignalParams,
    pub forecast: ForecastParams,
    pub portfolio: PortfolioSettings,
    pub logging: LoggingSettings,
}

/// Where price history comes from and how tickers are formatted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Exchange suffix appended to bare symbols (e.g. ".NS"). Empty disables it.
    pub market_suffix: String,
    /// Calendar days of history to request when no start date is given.
    pub lookback_days: u32,
    /// When set, prices are read from `<csv_dir>/<TICKER>.csv` instead of the network.
    pub csv_dir: Option<PathBuf>,
}

/// Parameters for the moving average crossover signal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    pub short_window: usize,
    pub long_window: usize,
}

/// Parameters for the lagged-close linear regression forecaster.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastParams {
    /// Number of trailing closes used as features.
    pub lags: usize,
    /// Number of future days to predict.
    pub horizon: usize,
    /// Below this many training rows no model is fitted.
    pub min_training_rows: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortfolioSettings {
    pub trading_days_per_year: u32,
    /// Amount used by the allocation simulation.
    pub investment_amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, overridden by `RUST_LOG` when set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    Full,
    Compact,
}

// --- Default Implementations ---

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            market_suffix: ".NS".to_string(),
            lookback_days: 365 * 2,
            csv_dir: None,
        }
    }
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
        }
    }
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            lags: 5,
            horizon: 5,
            min_training_rows: 20,
        }
    }
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            investment_amount: 100_000.0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
            directory: None,
        }
    }
}
