use core_types::SignalState;
use serde::Serialize;
use std::fmt;

/// Direction of the basket-level vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tilt {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for Tilt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tilt::Buy => "BUY",
            Tilt::Sell => "SELL",
            Tilt::Neutral => "NEUTRAL",
        };
        f.write_str(label)
    }
}

/// An advisory, basket-level reading of the latest per-ticker signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioTilt {
    pub score: f64,
    pub tilt: Tilt,
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
}

/// Combines the latest signal of each ticker into a single BUY / SELL lean.
///
/// Without weights every ticker casts one vote of +1, -1 or 0. With weights
/// (same order as `latest`) each vote is scaled by the ticker's allocation.
/// A positive score leans BUY, a negative one SELL, and exactly zero is
/// NEUTRAL. Missing weights for trailing tickers count as zero.
pub fn aggregate_signal(latest: &[(String, SignalState)], weights: Option<&[f64]>) -> PortfolioTilt {
    let score: f64 = latest
        .iter()
        .enumerate()
        .map(|(i, (_, state))| {
            let w = match weights {
                Some(ws) => ws.get(i).copied().unwrap_or(0.0),
                None => 1.0,
            };
            w * f64::from(state.value())
        })
        .sum();

    let count = |target: SignalState| latest.iter().filter(|(_, s)| *s == target).count();

    let tilt = if score > 0.0 {
        Tilt::Buy
    } else if score < 0.0 {
        Tilt::Sell
    } else {
        Tilt::Neutral
    };

    PortfolioTilt {
        score,
        tilt,
        bullish: count(SignalState::Bullish),
        bearish: count(SignalState::Bearish),
        neutral: count(SignalState::Neutral),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(states: &[SignalState]) -> Vec<(String, SignalState)> {
        states
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("T{}", i), *s))
            .collect()
    }

    #[test]
    fn unweighted_vote_counts_signals() {
        let latest = votes(&[SignalState::Bullish, SignalState::Bullish, SignalState::Bearish]);
        let tilt = aggregate_signal(&latest, None);
        assert_eq!(tilt.score, 1.0);
        assert_eq!(tilt.tilt, Tilt::Buy);
        assert_eq!((tilt.bullish, tilt.bearish, tilt.neutral), (2, 1, 0));
    }

    #[test]
    fn tie_is_neutral() {
        let latest = votes(&[SignalState::Bullish, SignalState::Bearish, SignalState::Neutral]);
        assert_eq!(aggregate_signal(&latest, None).tilt, Tilt::Neutral);
    }

    #[test]
    fn weights_can_flip_the_vote() {
        let latest = votes(&[SignalState::Bullish, SignalState::Bullish, SignalState::Bearish]);
        let tilt = aggregate_signal(&latest, Some(&[0.1, 0.1, 0.8]));
        assert!((tilt.score + 0.6).abs() < 1e-12);
        assert_eq!(tilt.tilt, Tilt::Sell);
    }

    #[test]
    fn empty_basket_is_neutral() {
        let tilt = aggregate_signal(&[], None);
        assert_eq!(tilt.score, 0.0);
        assert_eq!(tilt.tilt, Tilt::Neutral);
    }
}
