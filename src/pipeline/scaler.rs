//! Standardization to zero mean and unit variance

use serde::Serialize;

use super::error::{validate_dense, ModelError};

/// Per-column mean and standard deviation learned from the training rows.
///
/// Uses the population standard deviation. Constant columns get a scale of
/// 1.0 so they map to zero instead of dividing by zero.
#[derive(Debug, Clone, Serialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit the scaler on dense training rows
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ModelError> {
        let width = validate_dense(rows)?;
        let n = rows.len() as f64;

        let mut means = vec![0.0f64; width];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut variances = vec![0.0f64; width];
        for row in rows {
            for ((var, v), m) in variances.iter_mut().zip(row).zip(&means) {
                let d = v - m;
                *var += d * d;
            }
        }

        let scales = variances
            .iter()
            .map(|var| {
                let std = (var / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Ok(Self { means, scales })
    }

    /// Apply the fitted transform without refitting
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        rows.iter()
            .enumerate()
            .map(|(row_index, row)| {
                if row.len() != self.means.len() {
                    return Err(ModelError::FeatureCountMismatch {
                        expected: self.means.len(),
                        got: row.len(),
                        row_index,
                    });
                }
                Ok(row
                    .iter()
                    .zip(self.means.iter().zip(&self.scales))
                    .map(|(v, (m, s))| (v - m) / s)
                    .collect())
            })
            .collect()
    }

    /// Fit on `rows` and return them transformed
    pub fn fit_transform(rows: &[Vec<f64>]) -> Result<(Self, Vec<Vec<f64>>), ModelError> {
        let scaler = Self::fit(rows)?;
        let scaled = scaler.transform(rows)?;
        Ok((scaler, scaled))
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}
