use crate::allocation::{Allocation, simulate_allocation};
use crate::data_handler::{load_price_data, resolve_tickers};
use crate::error::PortfolioError;
use analytics::{AnalyticsEngine, PortfolioMetrics, PortfolioWeights};
use api_client::{FailedTicker, PriceProvider};
use chrono::NaiveDate;
use configuration::Config;
use core_types::{AlignedPriceTable, PriceSeries, SignalState};
use forecaster::{ForecastResult, ForecastSettings, Trend, train_and_forecast_with};
use serde::Serialize;
use signals::{
    CrossoverPoint, IndicatorSeries, PortfolioTilt, RECENT_CROSSOVER_LIMIT, aggregate_signal,
    compute_signals,
};
use std::sync::Arc;

/// Everything needed for one end-to-end analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Tickers as entered by the user; normalised during the run.
    pub tickers: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Raw comma-separated weights in ticker order. `None` means equal weights.
    pub weights: Option<String>,
    pub investment_amount: f64,
    pub short_window: usize,
    pub long_window: usize,
    pub forecast: ForecastSettings,
    pub trading_days_per_year: u32,
    pub market_suffix: String,
}

impl AnalysisRequest {
    /// Builds a request with every tunable taken from `config`.
    pub fn from_config(config: &Config, tickers: Vec<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            tickers,
            start,
            end,
            weights: None,
            investment_amount: config.portfolio.investment_amount,
            short_window: config.signals.short_window,
            long_window: config.signals.long_window,
            forecast: ForecastSettings {
                lags: config.forecast.lags,
                horizon: config.forecast.horizon,
                min_training_rows: config.forecast.min_training_rows,
            },
            trading_days_per_year: config.portfolio.trading_days_per_year,
            market_suffix: config.data.market_suffix.clone(),
        }
    }

    fn validate(&self) -> Result<(), PortfolioError> {
        if self.tickers.is_empty() {
            return Err(PortfolioError::InvalidRequest("at least one ticker is required".to_string()));
        }
        if self.end < self.start {
            return Err(PortfolioError::InvalidRequest(format!(
                "end date {} is before start date {}",
                self.end, self.start
            )));
        }
        if !self.investment_amount.is_finite() || self.investment_amount < 0.0 {
            return Err(PortfolioError::InvalidRequest(format!(
                "investment amount must be a non-negative number, got {}",
                self.investment_amount
            )));
        }
        Ok(())
    }
}

/// Signals for a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerAnalysis {
    pub ticker: String,
    pub latest_close: Option<f64>,
    pub latest_signal: Option<SignalState>,
    pub indicators: IndicatorSeries,
}

/// The forecast of the primary (first requested) ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSection {
    pub ticker: String,
    /// The reason is kept as text; a failed forecast never fails the run.
    pub outcome: Result<ForecastResult, String>,
    /// Last observed close of the primary ticker, when it loaded.
    pub last_close: Option<f64>,
    pub trend: Option<Trend>,
}

/// Combined metrics and allocation over the tickers' common dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSection {
    pub tickers: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub metrics: PortfolioMetrics,
    pub allocation: Allocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Normalised tickers in request order.
    pub requested: Vec<String>,
    pub tickers: Vec<TickerAnalysis>,
    pub failed: Vec<FailedTicker>,
    /// Weights over the loaded tickers. A fallback to equal weights is flagged here.
    pub weights: PortfolioWeights,
    pub tilt: PortfolioTilt,
    /// Latest BUY / SELL points of the primary ticker, oldest first.
    pub recent_crossovers: Vec<CrossoverPoint>,
    pub forecast: ForecastSection,
    /// `Err` holds why the portfolio could not be evaluated, e.g. no common dates.
    pub portfolio: Result<PortfolioSection, String>,
}

/// Orchestrates one analysis run: data, signals, forecast, portfolio.
pub struct PortfolioManager {
    provider: Arc<dyn PriceProvider>,
}

impl PortfolioManager {
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self { provider }
    }

    /// Runs the full analysis.
    ///
    /// Per-ticker fetch failures, a failed forecast, and a portfolio that
    /// cannot be aligned are all recorded on the report. The run itself only
    /// fails on an invalid request, invalid signal parameters, or when no
    /// ticker could be loaded.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport, PortfolioError> {
        request.validate()?;

        let (requested, mut failed) = resolve_tickers(&request.tickers, &request.market_suffix);
        if requested.is_empty() {
            return Err(PortfolioError::NoData {
                tickers: request.tickers.clone(),
            });
        }
        tracing::info!(tickers = ?requested, start = %request.start, end = %request.end, "Starting analysis");

        // 1. Fetch every ticker concurrently.
        let batch = load_price_data(self.provider.as_ref(), &requested, request.start, request.end).await?;
        failed.extend(batch.failed.iter().cloned());

        // 2. Per-ticker signals.
        let mut tickers = Vec::with_capacity(batch.series.len());
        for series in &batch.series {
            let indicators = compute_signals(series, request.short_window, request.long_window)?;
            tickers.push(TickerAnalysis {
                ticker: series.ticker().to_string(),
                latest_close: series.bars().last().map(|b| b.close),
                latest_signal: indicators.latest_signal(),
                indicators,
            });
        }

        // 3. Weights over whatever loaded, and the basket-level tilt.
        let loaded: Vec<usize> = batch
            .series
            .iter()
            .filter_map(|s| requested.iter().position(|t| t == s.ticker()))
            .collect();
        let weights = PortfolioWeights::parse(request.weights.as_deref().unwrap_or(""), requested.len())
            .select(&loaded);

        let latest: Vec<(String, SignalState)> = tickers
            .iter()
            .map(|t| (t.ticker.clone(), t.latest_signal.unwrap_or(SignalState::Neutral)))
            .collect();
        let user_weighted = request.weights.as_deref().is_some_and(|w| !w.trim().is_empty());
        let tilt = aggregate_signal(&latest, user_weighted.then(|| weights.values()));

        let recent_crossovers = tickers
            .iter()
            .find(|t| t.ticker == requested[0])
            .map(|t| t.indicators.recent_crossovers(RECENT_CROSSOVER_LIMIT))
            .unwrap_or_default();

        // 4. Forecast the primary ticker.
        let forecast = forecast_primary(&requested[0], &batch.series, &failed, request.forecast);

        // 5. Portfolio metrics and allocation.
        let portfolio = evaluate_portfolio(&batch.series, &weights, request).map_err(|e| {
            tracing::warn!(error = %e, "Portfolio section skipped");
            e.to_string()
        });

        tracing::info!(
            loaded = tickers.len(),
            failed = failed.len(),
            tilt = %tilt.tilt,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            start: request.start,
            end: request.end,
            requested,
            tickers,
            failed,
            weights,
            tilt,
            recent_crossovers,
            forecast,
            portfolio,
        })
    }
}

fn forecast_primary(
    primary: &str,
    series: &[PriceSeries],
    failed: &[FailedTicker],
    settings: ForecastSettings,
) -> ForecastSection {
    let primary_series = series.iter().find(|s| s.ticker() == primary);
    let last_close = primary_series.and_then(|s| s.bars().last()).map(|b| b.close);
    let outcome = match primary_series {
        Some(s) => train_and_forecast_with(s, settings).map_err(|e| e.to_string()),
        None => {
            let reason = failed
                .iter()
                .find(|f| f.ticker == primary)
                .map(|f| f.reason.clone())
                .unwrap_or_else(|| "no price data".to_string());
            Err(reason)
        }
    };

    let trend = match (&outcome, last_close) {
        (Ok(result), Some(close)) => result.trend(close),
        _ => None,
    };

    ForecastSection {
        ticker: primary.to_string(),
        outcome,
        last_close,
        trend,
    }
}

fn evaluate_portfolio(
    series: &[PriceSeries],
    weights: &PortfolioWeights,
    request: &AnalysisRequest,
) -> Result<PortfolioSection, PortfolioError> {
    let table = AlignedPriceTable::align(series)?;
    let metrics = AnalyticsEngine::new(request.trading_days_per_year).calculate(&table, weights)?;
    let allocation = simulate_allocation(&table, weights, request.investment_amount)?;

    Ok(PortfolioSection {
        tickers: table.tickers().to_vec(),
        first_date: table.dates().first().copied(),
        last_date: table.dates().last().copied(),
        metrics,
        allocation,
    })
}
