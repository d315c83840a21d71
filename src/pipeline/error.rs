//! Error types for the numeric pipeline stages.
//!
//! The loader and runner report failures through `anyhow` with context;
//! the model-fitting modules return `ModelError` so callers and tests can
//! match on the specific failure.

/// Errors raised while fitting or applying a pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Returned when a stage receives zero rows.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when rows have zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a row has a different width than the fitted stage expects.
    #[error("row {row_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        expected: usize,
        got: usize,
        row_index: usize,
    },

    /// Returned when features and labels disagree on row count.
    #[error("{n_rows} feature rows but {n_labels} labels")]
    LabelCountMismatch { n_rows: usize, n_labels: usize },

    /// Returned when a value fed to a model is NaN or infinite.
    #[error("non-finite value at row {row_index}, feature {feature_index}")]
    NonFiniteValue {
        row_index: usize,
        feature_index: usize,
    },

    /// Returned when the imputer sees a column with no present values.
    #[error("feature {feature_index} has no observed values in the training rows")]
    AllMissingColumn { feature_index: usize },

    /// Returned when a configuration value is out of range.
    #[error("invalid {parameter}: {reason}")]
    InvalidConfig {
        parameter: &'static str,
        reason: String,
    },

    /// Returned when the Newton system cannot be factorized.
    #[error("Newton system is not positive definite at iteration {iteration}")]
    SingularSystem { iteration: usize },
}

/// Check that `rows` is non-empty, rectangular and finite.
///
/// Returns the common row width.
pub(crate) fn validate_dense(rows: &[Vec<f64>]) -> Result<usize, ModelError> {
    let first = rows.first().ok_or(ModelError::EmptyDataset)?;
    let width = first.len();
    if width == 0 {
        return Err(ModelError::ZeroFeatures);
    }
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ModelError::FeatureCountMismatch {
                expected: width,
                got: row.len(),
                row_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteValue {
                row_index,
                feature_index,
            });
        }
    }
    Ok(width)
}
