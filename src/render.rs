use analytics::PortfolioMetrics;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, Table};
use core_types::SignalState;
use core_types::Crossover;
use forecaster::{ForecastResult, Trend};
use portfolio::{AnalysisReport, ForecastSection, PortfolioSection, TickerAnalysis};
use signals::{CrossoverPoint, Tilt};
use std::path::Path;

fn pct(x: f64) -> String {
    format!("{:.2}%", x * 100.0)
}

fn number(x: f64) -> Cell {
    Cell::new(format!("{:.2}", x)).set_alignment(CellAlignment::Right)
}

fn signal_cell(signal: Option<SignalState>) -> Cell {
    match signal {
        Some(SignalState::Bullish) => Cell::new("BULLISH").fg(Color::Green),
        Some(SignalState::Bearish) => Cell::new("BEARISH").fg(Color::Red),
        Some(SignalState::Neutral) => Cell::new("NEUTRAL"),
        None => Cell::new("-"),
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

/// Prints every section of the report to stdout.
pub fn print_report(report: &AnalysisReport) {
    println!("Analysis period: {} to {}", report.start, report.end);

    print_signals(&report.tickers);
    if let Some(primary) = report.requested.first() {
        print_recent_crossovers(primary, &report.recent_crossovers);
    }

    for failed in &report.failed {
        println!("Skipped {}: {}", failed.ticker, failed.reason);
    }

    let tilt = &report.tilt;
    let tilt_text = match tilt.tilt {
        Tilt::Buy => Color::Green,
        Tilt::Sell => Color::Red,
        Tilt::Neutral => Color::Reset,
    };
    let mut summary = new_table(vec!["Basket Signal", "Score", "Bullish", "Bearish", "Neutral"]);
    summary.add_row(vec![
        Cell::new(tilt.tilt.to_string()).fg(tilt_text),
        number(tilt.score),
        Cell::new(tilt.bullish),
        Cell::new(tilt.bearish),
        Cell::new(tilt.neutral),
    ]);
    println!("{summary}");

    match &report.forecast.outcome {
        Ok(result) => print_forecast(&report.forecast, result),
        Err(reason) => println!("Forecast unavailable for {}: {}", report.forecast.ticker, reason),
    }

    if let Some(reason) = report.weights.fallback_reason() {
        println!("Invalid weights ({}); using equal weights instead.", reason);
    }

    match &report.portfolio {
        Ok(section) => print_portfolio(section, report.weights.values()),
        Err(reason) => println!("Portfolio metrics unavailable: {}", reason),
    }
}

fn print_signals(tickers: &[TickerAnalysis]) {
    let mut table = new_table(vec![
        "Ticker",
        "Last Close",
        "Short SMA",
        "Long SMA",
        "Signal",
        "Last Crossover",
    ]);

    for analysis in tickers {
        let latest = analysis.indicators.latest();
        let last_cross = analysis
            .indicators
            .crossovers()
            .last()
            .map(|(date, kind)| format!("{} on {}", kind, date))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(&analysis.ticker),
            analysis.latest_close.map(number).unwrap_or_else(|| Cell::new("-")),
            latest.map(|r| number(r.short_sma)).unwrap_or_else(|| Cell::new("-")),
            latest.map(|r| number(r.long_sma)).unwrap_or_else(|| Cell::new("-")),
            signal_cell(analysis.latest_signal),
            Cell::new(last_cross),
        ]);
    }
    println!("{table}");
}

fn print_recent_crossovers(ticker: &str, points: &[CrossoverPoint]) {
    if points.is_empty() {
        println!("No BUY/SELL points for {} in this period.", ticker);
        return;
    }
    let mut table = new_table(vec!["Date", "Signal", "Close"]);
    for point in points {
        let color = match point.kind {
            Crossover::Buy => Color::Green,
            Crossover::Sell => Color::Red,
            Crossover::None => Color::Reset,
        };
        table.add_row(vec![
            Cell::new(point.date),
            Cell::new(point.kind.to_string()).fg(color),
            number(point.close),
        ]);
    }
    println!("Recent BUY/SELL points for {}", ticker);
    println!("{table}");
}

fn print_forecast(section: &ForecastSection, result: &ForecastResult) {
    let ticker = &section.ticker;
    let mut table = new_table(vec!["Step", "Predicted Close"]);
    for (i, p) in result.predictions.iter().enumerate() {
        table.add_row(vec![Cell::new(format!("t+{}", i + 1)), number(*p)]);
    }
    println!(
        "Forecast for {} ({} lags, {} training rows, RMSE {:.4})",
        ticker, result.lags, result.training_rows, result.rmse
    );
    println!("{table}");
    if let (Some(trend), Some(close)) = (section.trend, section.last_close) {
        let color = match trend {
            Trend::Up => Color::Green,
            Trend::DownOrFlat => Color::Red,
        };
        let mut verdict = new_table(vec!["Last Close", "Short-term Trend"]);
        verdict.add_row(vec![number(close), Cell::new(trend.to_string()).fg(color)]);
        println!("{verdict}");
    }
}

fn print_portfolio(section: &PortfolioSection, weights: &[f64]) {
    if let (Some(first), Some(last)) = (section.first_date, section.last_date) {
        println!(
            "Portfolio over {} common dates ({} to {})",
            section.allocation.dates.len(),
            first,
            last
        );
    }
    println!("{}", metrics_table(&section.metrics));

    let alloc = &section.allocation;
    let mut table = new_table(vec!["Ticker", "Weight", "Shares"]);
    for (i, ticker) in alloc.tickers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(ticker),
            Cell::new(weights.get(i).map(|w| pct(*w)).unwrap_or_default()),
            Cell::new(format!("{:.4}", alloc.shares[i])).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");

    if let (Some(first), Some(last)) = (alloc.values.first(), alloc.final_value()) {
        println!(
            "Holdings bought today for {:.2} would have been worth {:.2} on the first common date.",
            last, first
        );
    }
}

fn metrics_table(m: &PortfolioMetrics) -> Table {
    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total Return"), Cell::new(pct(m.total_return))]);
    table.add_row(vec![Cell::new("CAGR"), Cell::new(pct(m.cagr))]);
    table.add_row(vec![Cell::new("Annualized Return"), Cell::new(pct(m.annualized_return))]);
    table.add_row(vec![Cell::new("Annualized Volatility"), Cell::new(pct(m.annualized_volatility))]);
    table.add_row(vec![
        Cell::new("Sharpe Ratio"),
        Cell::new(m.sharpe_ratio.map(|s| format!("{:.3}", s)).unwrap_or_else(|| "n/a".to_string())),
    ]);
    table.add_row(vec![Cell::new("Max Drawdown"), Cell::new(pct(m.max_drawdown))]);
    table
}

/// Writes the `date,value` series of the simulated allocation.
pub fn export_values(report: &AnalysisReport, path: &Path) -> anyhow::Result<()> {
    let section = report
        .portfolio
        .as_ref()
        .map_err(|reason| anyhow::anyhow!("no portfolio to export: {}", reason))?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "value"])?;
    for (date, value) in section.allocation.history() {
        writer.write_record([date.to_string(), format!("{:.4}", value)])?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = section.allocation.dates.len(), "Exported portfolio values");
    Ok(())
}
