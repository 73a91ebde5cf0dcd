use serde::Serialize;

/// The `lags` most recent closes before day `t`, paired with the close of day `t`.
///
/// `features[0]` is the close of `t-1`, `features[1]` of `t-2`, and so on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagFeatureRow {
    pub features: Vec<f64>,
    pub label: f64,
}

/// Builds every lag row obtainable from `closes`.
///
/// A history of `n` closes yields `n - lags` rows; fewer than `lags + 1`
/// closes yields none.
pub fn build_lag_dataset(closes: &[f64], lags: usize) -> Vec<LagFeatureRow> {
    if lags == 0 || closes.len() <= lags {
        return Vec::new();
    }

    (lags..closes.len())
        .map(|t| LagFeatureRow {
            features: (1..=lags).map(|j| closes[t - j]).collect(),
            label: closes[t],
        })
        .collect()
}

/// The feature vector for predicting the day after `closes` ends.
pub fn latest_window(closes: &[f64], lags: usize) -> Option<Vec<f64>> {
    if lags == 0 || closes.len() < lags {
        return None;
    }
    Some(closes.iter().rev().take(lags).copied().collect())
}
