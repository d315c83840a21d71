//! Missing value analysis and mean imputation

use serde::Serialize;

use super::error::ModelError;

/// Ratio of missing cells per feature, sorted by ratio descending.
///
/// Ties keep the original column order.
pub fn analyze_missing_values(
    features: &[Vec<Option<f64>>],
    feature_names: &[String],
) -> Vec<(String, f64)> {
    if features.is_empty() {
        return Vec::new();
    }

    let n_rows = features.len() as f64;
    let mut missing_ratios: Vec<(String, f64)> = feature_names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let null_count = features
                .iter()
                .filter(|row| row.get(idx).copied().flatten().is_none())
                .count();
            (name.clone(), null_count as f64 / n_rows)
        })
        .collect();

    missing_ratios.sort_by(|a, b| b.1.total_cmp(&a.1));

    missing_ratios
}

/// Number of missing cells in a row-major matrix
pub fn count_missing(features: &[Vec<Option<f64>>]) -> usize {
    features
        .iter()
        .map(|row| row.iter().filter(|v| v.is_none()).count())
        .sum()
}

/// Column-mean imputer.
///
/// Fit on the training rows only, then applied unchanged to any other
/// partition so test statistics never leak into training.
#[derive(Debug, Clone, Serialize)]
pub struct MeanImputer {
    means: Vec<f64>,
}

impl MeanImputer {
    /// Compute the mean of the observed values in each column.
    ///
    /// # Errors
    ///
    /// - [`ModelError::EmptyDataset`] when `rows` is empty
    /// - [`ModelError::FeatureCountMismatch`] for ragged rows
    /// - [`ModelError::AllMissingColumn`] when a column has no observed value
    pub fn fit(rows: &[Vec<Option<f64>>]) -> Result<Self, ModelError> {
        let width = rows.first().ok_or(ModelError::EmptyDataset)?.len();
        if width == 0 {
            return Err(ModelError::ZeroFeatures);
        }

        let mut sums = vec![0.0f64; width];
        let mut counts = vec![0usize; width];
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(ModelError::FeatureCountMismatch {
                    expected: width,
                    got: row.len(),
                    row_index,
                });
            }
            for (j, value) in row.iter().enumerate() {
                if let Some(v) = value {
                    sums[j] += v;
                    counts[j] += 1;
                }
            }
        }

        let means = sums
            .iter()
            .zip(&counts)
            .enumerate()
            .map(|(feature_index, (&sum, &count))| {
                if count == 0 {
                    Err(ModelError::AllMissingColumn { feature_index })
                } else {
                    Ok(sum / count as f64)
                }
            })
            .collect::<Result<Vec<f64>, ModelError>>()?;

        Ok(Self { means })
    }

    /// Replace every missing cell with its column mean
    pub fn transform(&self, rows: &[Vec<Option<f64>>]) -> Result<Vec<Vec<f64>>, ModelError> {
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
                    .zip(&self.means)
                    .map(|(value, &mean)| value.unwrap_or(mean))
                    .collect())
            })
            .collect()
    }

    /// Fitted per-column means
    pub fn means(&self) -> &[f64] {
        &self.means
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_ignores_missing_cells() {
        let rows = vec![
            vec![Some(1.0), None],
            vec![Some(3.0), Some(10.0)],
            vec![None, Some(20.0)],
        ];

        let imputer = MeanImputer::fit(&rows).unwrap();

        assert_eq!(imputer.means(), &[2.0, 15.0]);
    }

    #[test]
    fn test_transform_uses_fitted_means_only() {
        let train = vec![vec![Some(2.0)], vec![Some(4.0)]];
        let test = vec![vec![None], vec![Some(100.0)]];

        let imputer = MeanImputer::fit(&train).unwrap();
        let dense = imputer.transform(&test).unwrap();

        assert_eq!(dense, vec![vec![3.0], vec![100.0]]);
    }

    #[test]
    fn test_all_missing_column_is_an_error() {
        let rows = vec![vec![Some(1.0), None], vec![Some(2.0), None]];

        let err = MeanImputer::fit(&rows).unwrap_err();

        assert!(matches!(err, ModelError::AllMissingColumn { feature_index: 1 }));
    }

    #[test]
    fn test_count_missing() {
        let rows = vec![vec![Some(1.0), None], vec![None, None]];
        assert_eq!(count_missing(&rows), 3);
    }
}
