use serde::Serialize;
use thiserror::Error;

/// Why user-supplied weights were replaced by equal weighting.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum InvalidWeights {
    #[error("could not parse weight '{0}' as a number")]
    Unparseable(String),

    #[error("expected {expected} weights, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("weights must be finite and non-negative")]
    Negative,

    #[error("weights sum to zero")]
    ZeroSum,
}

/// Non-negative portfolio weights that sum to one, one per ticker.
///
/// Invalid raw input never fails: it falls back to equal weighting and keeps
/// the reason so the caller can display it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioWeights {
    values: Vec<f64>,
    fallback: Option<InvalidWeights>,
}

impl PortfolioWeights {
    /// `1/n` for each of `n` tickers.
    pub fn equal(n: usize) -> Self {
        Self {
            values: vec![1.0 / n as f64; n],
            fallback: None,
        }
    }

    fn fallback(n: usize, reason: InvalidWeights) -> Self {
        tracing::warn!(%reason, tickers = n, "Falling back to equal weights");
        Self {
            values: vec![1.0 / n as f64; n],
            fallback: Some(reason),
        }
    }

    /// Normalises `raw` by its sum.
    pub fn from_raw(raw: &[f64], n: usize) -> Self {
        if raw.len() != n {
            return Self::fallback(
                n,
                InvalidWeights::LengthMismatch {
                    expected: n,
                    got: raw.len(),
                },
            );
        }
        if raw.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Self::fallback(n, InvalidWeights::Negative);
        }

        let sum: f64 = raw.iter().sum();
        if sum <= 0.0 {
            return Self::fallback(n, InvalidWeights::ZeroSum);
        }

        Self {
            values: raw.iter().map(|w| w / sum).collect(),
            fallback: None,
        }
    }

    /// Parses comma-separated weights such as `"0.6, 0.4"` or `"60,40"`.
    ///
    /// Blank input means "not specified" and gives equal weights without
    /// flagging a fallback.
    pub fn parse(input: &str, n: usize) -> Self {
        if input.trim().is_empty() {
            return Self::equal(n);
        }

        let mut raw = Vec::with_capacity(n);
        for token in input.split(',') {
            let token = token.trim();
            match token.parse::<f64>() {
                Ok(w) => raw.push(w),
                Err(_) => return Self::fallback(n, InvalidWeights::Unparseable(token.to_string())),
            }
        }
        Self::from_raw(&raw, n)
    }

    /// Keeps the weights at `indices` and renormalises them, e.g. after some
    /// tickers failed to load. An earlier fallback reason is preserved.
    pub fn select(&self, indices: &[usize]) -> Self {
        let raw: Vec<f64> = indices
            .iter()
            .filter_map(|&i| self.values.get(i).copied())
            .collect();
        let mut selected = Self::from_raw(&raw, indices.len());
        if selected.fallback.is_none() {
            selected.fallback = self.fallback.clone();
        }
        selected
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn was_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn fallback_reason(&self) -> Option<&InvalidWeights> {
        self.fallback.as_ref()
    }
}
