use anyhow::Context;
use api_client::{CachedProvider, CsvPriceSource, PriceProvider, YahooClient, parse_tickers};
use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand};
use configuration::{Config, LogFormat, init_logging, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use portfolio::{AnalysisRequest, PortfolioManager};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod render;

/// The main entry point for the TickerLens application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; it may carry TICKERLENS__* overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    let _log_guard = init_logging(&config.logging).context("Failed to initialise logging")?;

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, config).await,
        Commands::Normalize(args) => handle_normalize(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Stock signals, forecasts and portfolio analytics from daily prices.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./tickerlens.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Console log format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more tickers and their combined portfolio.
    Analyze(AnalyzeArgs),
    /// Print the provider symbols for the given tickers.
    Normalize(NormalizeArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Tickers to analyze (e.g., "RELIANCE,TCS,INFY"). The first one is forecast.
    #[arg(long, value_delimiter = ',', num_args = 1.., required = true)]
    tickers: Vec<String>,

    /// The start date (format: YYYY-MM-DD). Defaults to the configured lookback.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// The end date (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Comma-separated weights in ticker order (e.g., "0.6,0.4"). Defaults to equal weights.
    #[arg(long)]
    weights: Option<String>,

    /// Amount to allocate across the tickers.
    #[arg(long)]
    amount: Option<f64>,

    /// Short SMA window in days.
    #[arg(long = "short")]
    short_window: Option<usize>,

    /// Long SMA window in days.
    #[arg(long = "long")]
    long_window: Option<usize>,

    /// Number of lagged closes the forecaster uses.
    #[arg(long)]
    lags: Option<usize>,

    /// Number of days to forecast.
    #[arg(long)]
    horizon: Option<usize>,

    /// Exchange suffix appended to bare symbols (e.g., ".NS", ".BO", or "" for none).
    #[arg(long)]
    suffix: Option<String>,

    /// Read prices from <DIR>/<TICKER>.csv instead of downloading them.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Write the simulated portfolio value series to this CSV file.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct NormalizeArgs {
    /// Tickers to normalize, separated by spaces or commas.
    #[arg(required = true)]
    tickers: Vec<String>,

    /// Exchange suffix appended to bare symbols. Defaults to the configured suffix.
    #[arg(long)]
    suffix: Option<String>,
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

/// Folds command-line overrides into the loaded configuration.
fn apply_overrides(config: &mut Config, args: &AnalyzeArgs) -> anyhow::Result<()> {
    if let Some(amount) = args.amount {
        config.portfolio.investment_amount = amount;
    }
    if let Some(short) = args.short_window {
        config.signals.short_window = short;
    }
    if let Some(long) = args.long_window {
        config.signals.long_window = long;
    }
    if let Some(lags) = args.lags {
        config.forecast.lags = lags;
    }
    if let Some(horizon) = args.horizon {
        config.forecast.horizon = horizon;
    }
    if let Some(suffix) = &args.suffix {
        config.data.market_suffix = suffix.clone();
    }
    if let Some(dir) = &args.csv_dir {
        config.data.csv_dir = Some(dir.clone());
    }
    config.validate().context("Invalid command-line parameters")?;
    Ok(())
}

fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn PriceProvider>> {
    let inner: Arc<dyn PriceProvider> = match &config.data.csv_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Reading prices from CSV files");
            Arc::new(CsvPriceSource::new(dir))
        }
        None => Arc::new(YahooClient::new().context("Failed to build the HTTP client")?),
    };
    Ok(Arc::new(CachedProvider::new(inner)))
}

/// Handles the orchestration of a full analysis run.
async fn handle_analyze(args: AnalyzeArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args)?;

    let end = args.to.unwrap_or_else(|| Local::now().date_naive());
    let start = match args.from {
        Some(from) => from,
        None => end
            .checked_sub_days(Days::new(u64::from(config.data.lookback_days)))
            .context("Lookback period reaches before the supported date range")?,
    };

    let mut request = AnalysisRequest::from_config(&config, args.tickers.clone(), start, end);
    request.weights = args.weights.clone();

    let manager = PortfolioManager::new(build_provider(&config)?);

    // Set up the spinner
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Analyzing {} ticker(s) from {} to {}...", args.tickers.len(), start, end));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = manager.run(&request).await;
    spinner.finish_and_clear();
    let report = result.context("Analysis failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_report(&report);
    }

    if let Some(path) = &args.export {
        render::export_values(&report, path)
            .with_context(|| format!("Failed to export portfolio values to {}", path.display()))?;
        if !args.json {
            println!("Portfolio values written to {}", path.display());
        }
    }

    Ok(())
}

// ==============================================================================
// Normalize Command Logic
// ==============================================================================

fn handle_normalize(args: NormalizeArgs, config: &Config) -> anyhow::Result<()> {
    let suffix = args.suffix.as_deref().unwrap_or(&config.data.market_suffix);
    for ticker in parse_tickers(&args.tickers.join(","), suffix)? {
        println!("{}", ticker);
    }
    Ok(())
}
