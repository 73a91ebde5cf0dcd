use crate::error::SignalError;
use chrono::NaiveDate;
use core_types::{Crossover, PriceSeries, SignalState};
use serde::Serialize;
use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// The indicator values computed for a single bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub short_sma: f64,
    pub long_sma: f64,
    pub signal: SignalState,
    /// `signal[t] - signal[t-1]`, zero on the first bar.
    pub crossover: i8,
}

impl IndicatorRow {
    pub fn crossover_kind(&self) -> Crossover {
        Crossover::from_delta(self.crossover)
    }
}

/// A BUY or SELL transition together with the close it happened at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossoverPoint {
    pub date: NaiveDate,
    pub kind: Crossover,
    pub close: f64,
}

/// How many crossover points a report lists by default.
pub const RECENT_CROSSOVER_LIMIT: usize = 30;

/// Moving averages and crossover signals for one ticker, one row per input bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub ticker: String,
    pub short_window: usize,
    pub long_window: usize,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The signal on the most recent bar, if any.
    pub fn latest_signal(&self) -> Option<SignalState> {
        self.rows.last().map(|r| r.signal)
    }

    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// The BUY / SELL transitions, in chronological order.
    pub fn crossovers(&self) -> impl Iterator<Item = (NaiveDate, Crossover)> + '_ {
        self.rows
            .iter()
            .map(|r| (r.date, r.crossover_kind()))
            .filter(|(_, c)| *c != Crossover::None)
    }

    /// The last `limit` BUY / SELL transitions with their closes, oldest first.
    pub fn recent_crossovers(&self, limit: usize) -> Vec<CrossoverPoint> {
        let points: Vec<CrossoverPoint> = self
            .rows
            .iter()
            .filter(|r| r.crossover_kind() != Crossover::None)
            .map(|r| CrossoverPoint {
                date: r.date,
                kind: r.crossover_kind(),
                close: r.close,
            })
            .collect();
        let skip = points.len().saturating_sub(limit);
        points.into_iter().skip(skip).collect()
    }
}

/// Pins an SMA to the close when every bar in its window has that same close.
///
/// `ta` keeps a running sum, which drifts by an ulp or so on repeated values.
fn settle(average: f64, close: f64, flat_run: usize, window: usize, bars_seen: usize) -> f64 {
    if flat_run >= window.min(bars_seen) {
        close
    } else {
        average
    }
}

/// Computes short/long simple moving averages and their crossover signal.
///
/// For the first `window - 1` bars the SMA is the mean of the bars available
/// so far, so every bar gets a signal. An empty series yields an empty result.
/// `short_window < long_window` is the usual setup but is not required.
pub fn compute_signals(
    series: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Result<IndicatorSeries, SignalError> {
    if short_window == 0 || long_window == 0 {
        return Err(SignalError::InvalidParameters(format!(
            "SMA windows must be at least 1 (short={}, long={})",
            short_window, long_window
        )));
    }

    let mut ma_short = Sma::new(short_window)
        .map_err(|e| SignalError::IndicatorError(format!("{:?}", e)))?;
    let mut ma_long = Sma::new(long_window)
        .map_err(|e| SignalError::IndicatorError(format!("{:?}", e)))?;

    let mut rows = Vec::with_capacity(series.len());
    let mut prev_signal: Option<SignalState> = None;
    let mut prev_close: Option<f64> = None;
    // Number of consecutive bars, ending at the current one, sharing its close.
    let mut flat_run = 0usize;

    for (i, bar) in series.bars().iter().enumerate() {
        flat_run = match prev_close {
            Some(p) if p == bar.close => flat_run + 1,
            _ => 1,
        };
        prev_close = Some(bar.close);

        let short_sma = settle(ma_short.next(bar.close), bar.close, flat_run, short_window, i + 1);
        let long_sma = settle(ma_long.next(bar.close), bar.close, flat_run, long_window, i + 1);
        let signal = SignalState::from_averages(short_sma, long_sma);

        let crossover = match prev_signal {
            Some(prev) => signal.value() - prev.value(),
            None => 0,
        };
        if crossover.abs() == 2 {
            tracing::debug!(
                ticker = series.ticker(),
                date = %bar.date,
                short_sma,
                long_sma,
                "{} crossover",
                Crossover::from_delta(crossover)
            );
        }

        rows.push(IndicatorRow {
            date: bar.date,
            close: bar.close,
            short_sma,
            long_sma,
            signal,
            crossover,
        });
        prev_signal = Some(signal);
    }

    Ok(IndicatorSeries {
        ticker: series.ticker().to_string(),
        short_window,
        long_window,
        rows,
    })
}
