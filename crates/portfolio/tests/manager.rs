use api_client::InMemoryProvider;
use chrono::NaiveDate;
use configuration::Config;
use core_types::{Crossover, PriceSeries};
use forecaster::Trend;
use portfolio::{AnalysisRequest, PortfolioError, PortfolioManager};
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn trending(ticker: &str, start: NaiveDate, n: usize, slope: f64) -> PriceSeries {
    let closes: Vec<f64> = (0..n)
        .map(|t| {
            let t = t as f64;
            100.0 + slope * t + 2.0 * (t / 4.0).sin()
        })
        .collect();
    PriceSeries::from_closes(ticker, start, &closes).unwrap()
}

fn straight(ticker: &str, start: NaiveDate, n: usize, slope: f64) -> PriceSeries {
    let closes: Vec<f64> = (0..n).map(|t| 200.0 + slope * t as f64).collect();
    PriceSeries::from_closes(ticker, start, &closes).unwrap()
}

fn provider() -> Arc<InMemoryProvider> {
    let start = date(2024, 1, 1);
    Arc::new(
        InMemoryProvider::new()
            .with_series(trending("AAA.NS", start, 80, 0.5))
            .with_series(trending("BBB.NS", start, 80, -0.2))
            .with_series(trending("SHORT.NS", start, 12, 0.1))
            .with_series(trending("LATE.NS", date(2025, 1, 1), 40, 0.3))
            .with_series(straight("RISE.NS", start, 60, 1.0))
            .with_series(straight("SINK.NS", start, 60, -1.0)),
    )
}

fn request(tickers: &[&str]) -> AnalysisRequest {
    AnalysisRequest::from_config(
        &Config::default(),
        tickers.iter().map(|t| t.to_string()).collect(),
        date(2024, 1, 1),
        date(2025, 12, 31),
    )
}

#[tokio::test]
async fn failed_ticker_does_not_abort_the_run() {
    let manager = PortfolioManager::new(provider());
    let report = manager.run(&request(&["aaa", "bbb", "zzz"])).await.unwrap();

    assert_eq!(report.requested, vec!["AAA.NS", "BBB.NS", "ZZZ.NS"]);
    assert_eq!(report.tickers.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].ticker, "ZZZ.NS");

    for analysis in &report.tickers {
        assert_eq!(analysis.indicators.len(), 80);
        assert!(analysis.latest_signal.is_some());
    }

    let forecast = report.forecast.outcome.as_ref().unwrap();
    assert_eq!(report.forecast.ticker, "AAA.NS");
    assert_eq!(forecast.predictions.len(), 5);

    let section = report.portfolio.as_ref().unwrap();
    assert_eq!(section.tickers, vec!["AAA.NS", "BBB.NS"]);
    assert_eq!(section.allocation.values.len(), 80);
    assert!(section.metrics.max_drawdown <= 0.0);
    assert!(!report.weights.was_fallback());
}

#[tokio::test]
async fn no_common_dates_only_skips_the_portfolio() {
    let manager = PortfolioManager::new(provider());
    let report = manager.run(&request(&["AAA", "LATE"])).await.unwrap();

    assert_eq!(report.tickers.len(), 2);
    assert!(report.forecast.outcome.is_ok());
    let reason = report.portfolio.unwrap_err();
    assert!(reason.contains("No common trading dates"), "{}", reason);
}

#[tokio::test]
async fn short_history_records_the_forecast_failure() {
    let manager = PortfolioManager::new(provider());
    let report = manager.run(&request(&["SHORT", "AAA"])).await.unwrap();

    assert_eq!(report.forecast.ticker, "SHORT.NS");
    let reason = report.forecast.outcome.unwrap_err();
    assert!(reason.contains("Not enough history"), "{}", reason);
    assert_eq!(report.tickers[0].indicators.len(), 12);
}

#[tokio::test]
async fn missing_primary_reports_the_fetch_error() {
    let manager = PortfolioManager::new(provider());
    let report = manager.run(&request(&["NOPE", "AAA"])).await.unwrap();

    assert_eq!(report.forecast.ticker, "NOPE.NS");
    let reason = report.forecast.outcome.unwrap_err();
    assert!(reason.contains("NOPE.NS"), "{}", reason);
}

#[tokio::test]
async fn all_tickers_failing_is_an_error() {
    let manager = PortfolioManager::new(provider());
    let err = manager.run(&request(&["X1", "X2"])).await.unwrap_err();
    assert!(matches!(err, PortfolioError::NoData { .. }));
}

#[tokio::test]
async fn user_weights_are_applied_and_renormalised() {
    let manager = PortfolioManager::new(provider());

    let mut req = request(&["AAA", "BBB"]);
    req.weights = Some("3, 1".to_string());
    let report = manager.run(&req).await.unwrap();
    assert!((report.weights.values()[0] - 0.75).abs() < 1e-12);
    assert!((report.weights.values()[1] - 0.25).abs() < 1e-12);

    // The weight of a ticker that failed to load is dropped.
    let mut req = request(&["AAA", "ZZZ", "BBB"]);
    req.weights = Some("2,5,2".to_string());
    let report = manager.run(&req).await.unwrap();
    assert!((report.weights.values()[0] - 0.5).abs() < 1e-12);
    assert!((report.weights.values()[1] - 0.5).abs() < 1e-12);
}

#[tokio::test]
async fn bad_weights_fall_back_to_equal() {
    let manager = PortfolioManager::new(provider());
    let mut req = request(&["AAA", "BBB"]);
    req.weights = Some("0.5,lots".to_string());

    let report = manager.run(&req).await.unwrap();
    assert!(report.weights.was_fallback());
    assert_eq!(report.weights.values(), &[0.5, 0.5]);
    assert!(report.portfolio.is_ok());
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let manager = PortfolioManager::new(provider());

    let mut req = request(&["AAA"]);
    req.end = date(2023, 1, 1);
    assert!(matches!(
        manager.run(&req).await,
        Err(PortfolioError::InvalidRequest(_))
    ));

    assert!(matches!(
        manager.run(&request(&[])).await,
        Err(PortfolioError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn report_serialises_to_json() {
    let manager = PortfolioManager::new(provider());
    let report = manager.run(&request(&["AAA", "BBB"])).await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["requested"][0], "AAA.NS");
    assert!(json["portfolio"]["Ok"]["metrics"]["total_return"].is_number());
}

#[tokio::test]
async fn primary_trend_follows_the_last_prediction() {
    let manager = PortfolioManager::new(provider());

    let report = manager.run(&request(&["RISE", "AAA"])).await.unwrap();
    assert_eq!(report.forecast.last_close, Some(259.0));
    assert_eq!(report.forecast.trend, Some(Trend::Up));

    let report = manager.run(&request(&["SINK", "AAA"])).await.unwrap();
    assert_eq!(report.forecast.last_close, Some(141.0));
    assert_eq!(report.forecast.trend, Some(Trend::DownOrFlat));

    let report = manager.run(&request(&["SHORT", "AAA"])).await.unwrap();
    assert!(report.forecast.last_close.is_some());
    assert_eq!(report.forecast.trend, None);
}

#[tokio::test]
async fn recent_crossovers_come_from_the_primary_ticker() {
    let manager = PortfolioManager::new(provider());
    let report = manager.run(&request(&["AAA", "BBB"])).await.unwrap();

    let aaa = &report.tickers[0].indicators;
    let expected: Vec<_> = aaa.crossovers().collect();
    let skip = expected.len().saturating_sub(30);
    assert_eq!(report.recent_crossovers.len(), expected.len() - skip);
    for (point, (date, kind)) in report.recent_crossovers.iter().zip(&expected[skip..]) {
        assert_eq!(point.date, *date);
        assert_eq!(point.kind, *kind);
        assert_ne!(point.kind, Crossover::None);
    }

    let missing = manager.run(&request(&["NOPE", "AAA"])).await.unwrap();
    assert!(missing.recent_crossovers.is_empty());
}
