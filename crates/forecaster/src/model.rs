use crate::error::ForecastError;
use crate::features::LagFeatureRow;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

/// Relative cut-off below which singular values are treated as zero.
const RCOND: f64 = 1e-12;

/// An ordinary least-squares linear model with an intercept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Fits the model to the lag dataset.
    ///
    /// Features and labels are centred, the centred system is solved for the
    /// minimum-norm least-squares coefficients, and the intercept is recovered
    /// from the means. Collinear features therefore share weight instead of
    /// making the fit fail.
    pub fn fit(rows: &[LagFeatureRow]) -> Result<Self, ForecastError> {
        let n_samples = rows.len();
        if n_samples == 0 {
            return Err(ForecastError::InsufficientData { rows: 0, required: 1 });
        }
        let n_features = rows[0].features.len();
        if rows.iter().any(|r| r.features.len() != n_features) {
            return Err(ForecastError::InvalidParameters(
                "all lag rows must have the same number of features".to_string(),
            ));
        }

        // Calculate means
        let mut means = vec![0.0; n_features];
        for row in rows {
            for (m, x) in means.iter_mut().zip(&row.features) {
                *m += x;
            }
        }
        for m in means.iter_mut() {
            *m /= n_samples as f64;
        }
        let label_mean = rows.iter().map(|r| r.label).sum::<f64>() / n_samples as f64;

        let x = DMatrix::from_fn(n_samples, n_features, |i, j| rows[i].features[j] - means[j]);
        let y = DVector::from_fn(n_samples, |i, _| rows[i].label - label_mean);

        // No variation in any feature: the best fit is the label mean.
        let coefficients: Vec<f64> = if x.amax() == 0.0 {
            vec![0.0; n_features]
        } else {
            let svd = x.svd(true, true);
            let eps = svd.singular_values.max() * RCOND;
            let solution = svd
                .solve(&y, eps)
                .map_err(|e| ForecastError::Solver(e.to_string()))?;
            solution.iter().copied().collect()
        };
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::Solver(
                "least-squares solution is not finite".to_string(),
            ));
        }
        let intercept = label_mean
            - coefficients
                .iter()
                .zip(&means)
                .map(|(c, m)| c * m)
                .sum::<f64>();

        tracing::debug!(n_samples, n_features, intercept, ?coefficients, "Fitted linear model");

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Predicts a single label. `features` must have one value per coefficient.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    /// Root-mean-squared error of the model over `rows`.
    pub fn rmse(&self, rows: &[LagFeatureRow]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }
        let sse: f64 = rows
            .iter()
            .map(|r| (self.predict_row(&r.features) - r.label).powi(2))
            .sum();
        (sse / rows.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(features: &[f64], label: f64) -> LagFeatureRow {
        LagFeatureRow {
            features: features.to_vec(),
            label,
        }
    }

    #[test]
    fn recovers_exact_linear_relationship() {
        // label = 3 + 2*a - 0.5*b
        let rows: Vec<_> = [(1.0, 2.0), (2.0, 1.0), (3.0, 5.0), (4.0, 3.0), (0.5, 7.0)]
            .iter()
            .map(|&(a, b)| row(&[a, b], 3.0 + 2.0 * a - 0.5 * b))
            .collect();

        let model = LinearModel::fit(&rows).unwrap();
        assert!((model.intercept() - 3.0).abs() < 1e-9);
        assert!((model.coefficients()[0] - 2.0).abs() < 1e-9);
        assert!((model.coefficients()[1] + 0.5).abs() < 1e-9);
        assert!(model.rmse(&rows) < 1e-9);
    }

    #[test]
    fn constant_features_fall_back_to_the_mean() {
        let rows = vec![row(&[5.0, 5.0], 5.0), row(&[5.0, 5.0], 5.0), row(&[5.0, 5.0], 5.0)];

        let model = LinearModel::fit(&rows).unwrap();
        assert_eq!(model.coefficients(), &[0.0, 0.0]);
        assert_eq!(model.intercept(), 5.0);
        assert_eq!(model.rmse(&rows), 0.0);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert!(LinearModel::fit(&[]).is_err());
    }
}
