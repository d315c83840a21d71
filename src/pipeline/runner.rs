//! The linear pipeline: split, impute, scale, rank, reduce, refit, evaluate.
//!
//! Every fitted stage is returned in [`PipelineOutcome`] so callers and
//! tests can inspect it. Nothing is persisted.

use anyhow::{Context, Result};
use serde::Serialize;

use super::error::ModelError;
use super::evaluate::Evaluation;
use super::forest::{RandomForest, RandomForestConfig};
use super::loader::{Dataset, LoaderConfig};
use super::logistic::{LogisticModel, LogisticRegressionConfig, SolverStatus};
use super::missing::{analyze_missing_values, count_missing, MeanImputer};
use super::scaler::StandardScaler;
use super::selection::{rank_features, select_columns, FeatureRanking};
use super::split::{train_test_split, TrainTestSplit};

/// Literal constants of a run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Seed for the split and the forest
    pub seed: u64,
    pub test_fraction: f64,
    /// Number of top-ranked features the reduced model keeps
    pub top_k: usize,
    pub loader: LoaderConfig,
    pub forest: RandomForestConfig,
    pub logistic: LogisticRegressionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            top_k: 10,
            loader: LoaderConfig::default(),
            forest: RandomForestConfig::default(),
            logistic: LogisticRegressionConfig::default(),
        }
    }
}

/// A selected feature with its positional index and importance
#[derive(Debug, Clone, Serialize)]
pub struct SelectedFeature {
    pub index: usize,
    pub name: String,
    pub importance: f64,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub n_rows: usize,
    pub n_features: usize,
    /// Missing ratio per feature over the whole cleaned dataset
    pub missing_ratios: Vec<(String, f64)>,
    pub missing_cells: usize,
    pub split: TrainTestSplit,
    pub imputer: MeanImputer,
    pub scaler: StandardScaler,
    pub forest: RandomForest,
    /// Forest accuracy on the held-out rows with every feature
    pub forest_test_accuracy: f64,
    pub ranking: FeatureRanking,
    pub selected: Vec<SelectedFeature>,
    pub logistic: LogisticModel,
    pub actual: Vec<u8>,
    pub predictions: Vec<u8>,
    pub evaluation: Evaluation,
}

impl PipelineOutcome {
    /// Indices of the selected features, most important first
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().map(|f| f.index).collect()
    }
}

/// Run every stage after loading.
///
/// The imputer and scaler are fit on the training partition only and then
/// applied unchanged to the test partition.
pub fn run_pipeline(dataset: &Dataset, config: &PipelineConfig) -> Result<PipelineOutcome> {
    if config.top_k == 0 {
        return Err(ModelError::InvalidConfig {
            parameter: "top_k",
            reason: "must be at least 1".to_string(),
        }
        .into());
    }

    let n_rows = dataset.n_rows();
    let n_features = dataset.n_features();
    log::info!("running pipeline on {} rows x {} features", n_rows, n_features);

    let missing_ratios = analyze_missing_values(&dataset.features, &dataset.feature_names);
    let missing_cells = count_missing(&dataset.features);

    // Split
    let split = train_test_split(n_rows, config.test_fraction, config.seed)
        .context("Failed to split dataset")?;
    let (train_raw, test_raw) = split.take(&dataset.features);
    let (train_labels, test_labels) = split.take(&dataset.labels);

    // Impute
    let imputer = MeanImputer::fit(&train_raw).context("Failed to fit mean imputer")?;
    let train_dense = imputer.transform(&train_raw)?;
    let test_dense = imputer.transform(&test_raw)?;

    // Scale
    let (scaler, train_scaled) =
        StandardScaler::fit_transform(&train_dense).context("Failed to fit standard scaler")?;
    let test_scaled = scaler.transform(&test_dense)?;

    // Rank with the full forest
    let forest_labels: Vec<usize> = train_labels.iter().map(|&l| l as usize).collect();
    let forest = config
        .forest
        .clone()
        .with_seed(config.seed)
        .fit(&train_scaled, &forest_labels)
        .context("Failed to train random forest")?;

    let forest_predictions = forest.predict_batch(&test_scaled)?;
    let forest_correct = forest_predictions
        .iter()
        .zip(&test_labels)
        .filter(|&(&p, &a)| p == a as usize)
        .count();
    let forest_test_accuracy = forest_correct as f64 / test_labels.len() as f64;

    let ranking = rank_features(forest.feature_importances());
    let selected: Vec<SelectedFeature> = ranking
        .ranked()
        .iter()
        .take(config.top_k)
        .map(|f| SelectedFeature {
            index: f.index,
            name: dataset.feature_names[f.index].clone(),
            importance: f.importance,
        })
        .collect();
    let top: Vec<usize> = selected.iter().map(|f| f.index).collect();
    log::info!("selected features: {:?}", top);

    // Reduce and refit
    let train_reduced = select_columns(&train_scaled, &top);
    let test_reduced = select_columns(&test_scaled, &top);

    let logistic = config
        .logistic
        .fit(&train_reduced, &train_labels)
        .context("Failed to fit logistic regression")?;
    if logistic.status() == SolverStatus::MaxIterationsReached {
        log::warn!(
            "logistic regression stopped after {} iterations without converging",
            logistic.iterations()
        );
    }

    // Evaluate
    let predictions = logistic.predict_batch(&test_reduced)?;
    let evaluation =
        Evaluation::compute(&test_labels, &predictions).context("Failed to evaluate predictions")?;
    log::info!("test accuracy {:.4}", evaluation.accuracy);

    Ok(PipelineOutcome {
        n_rows,
        n_features,
        missing_ratios,
        missing_cells,
        split,
        imputer,
        scaler,
        forest,
        forest_test_accuracy,
        ranking,
        selected,
        logistic,
        actual: test_labels,
        predictions,
        evaluation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_dataset(n: usize) -> Dataset {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n {
            let label = (i % 2) as u8;
            let base = if label == 1 { 5.0 } else { 0.0 };
            let jitter = ((i * 13) % 7) as f64 * 0.1;
            let noisy = if i % 9 == 0 { None } else { Some(((i * 31) % 17) as f64) };
            features.push(vec![Some(base + jitter), noisy, Some(jitter)]);
            labels.push(label);
        }
        Dataset {
            feature_names: (0..3).map(|i| format!("feature_{i}")).collect(),
            features,
            labels,
        }
    }

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            forest: RandomForestConfig::default().with_n_trees(10),
            top_k: 2,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_pipeline_separable_data() {
        let outcome = run_pipeline(&toy_dataset(60), &small_config()).unwrap();

        assert_eq!(outcome.split.test_len(), 12);
        assert_eq!(outcome.evaluation.confusion.total(), 12);
        assert_eq!(outcome.selected[0].index, 0);
        assert!(outcome.evaluation.accuracy > 0.9);
    }

    #[test]
    fn test_reduced_model_uses_selected_columns() {
        let outcome = run_pipeline(&toy_dataset(60), &small_config()).unwrap();

        assert_eq!(outcome.selected_indices(), outcome.ranking.top(2));
        assert_eq!(outcome.logistic.weights().len(), outcome.selected.len());
        for feature in &outcome.selected {
            assert_eq!(feature.name, format!("feature_{}", feature.index));
        }
    }

    #[test]
    fn test_top_k_clamped_to_feature_count() {
        let config = PipelineConfig {
            top_k: 10,
            ..small_config()
        };
        let outcome = run_pipeline(&toy_dataset(40), &config).unwrap();
        assert_eq!(outcome.selected.len(), 3);
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let config = PipelineConfig {
            top_k: 0,
            ..small_config()
        };
        assert!(run_pipeline(&toy_dataset(40), &config).is_err());
    }
}
