use serde::{Deserialize, Serialize};
use std::fmt;

const AVERAGE_TOLERANCE: f64 = 1e-12;

/// The relationship between the short and long moving averages on a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalState {
    /// Short SMA above long SMA.
    Bullish,
    /// Short SMA below long SMA.
    Bearish,
    Neutral,
}

impl SignalState {
    /// Returns the numeric encoding: +1, -1 or 0.
    pub fn value(&self) -> i8 {
        match self {
            SignalState::Bullish => 1,
            SignalState::Bearish => -1,
            SignalState::Neutral => 0,
        }
    }

    /// Classifies a pair of moving averages.
    ///
    /// Averages within a relative `1e-12` of each other are treated as equal,
    /// so rounding noise in the averages never produces a signal.
    pub fn from_averages(short: f64, long: f64) -> Self {
        if (short - long).abs() <= AVERAGE_TOLERANCE * short.abs().max(long.abs()) {
            SignalState::Neutral
        } else if short > long {
            SignalState::Bullish
        } else if short < long {
            SignalState::Bearish
        } else {
            SignalState::Neutral
        }
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalState::Bullish => "BULLISH",
            SignalState::Bearish => "BEARISH",
            SignalState::Neutral => "NEUTRAL",
        };
        f.write_str(label)
    }
}

/// A transition between signal states.
///
/// Only a full swing counts: bearish -> bullish is a `Buy` (+2) and
/// bullish -> bearish is a `Sell` (-2). Moves through neutral are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    Buy,
    Sell,
    None,
}

impl Crossover {
    pub fn from_delta(delta: i8) -> Self {
        match delta {
            2 => Crossover::Buy,
            -2 => Crossover::Sell,
            _ => Crossover::None,
        }
    }
}

impl fmt::Display for Crossover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Crossover::Buy => "BUY",
            Crossover::Sell => "SELL",
            Crossover::None => "HOLD",
        };
        f.write_str(label)
    }
}
