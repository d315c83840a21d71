//! Bagged random forest used to rank features.
//!
//! Trees are grown on bootstrap samples with a random subset of features
//! considered at every split. Per-tree seeds are drawn up front from a
//! master RNG, so the fitted forest does not depend on how rayon schedules
//! the trees.

mod tree;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use super::error::{validate_dense, ModelError};

pub use tree::{DecisionTree, Node};
use tree::TreeParams;

/// Number of features considered at each split
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1
    Sqrt,
    /// Every feature
    All,
    /// A fixed count
    Fixed(usize),
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> Result<usize, ModelError> {
        let resolved = match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt().floor() as usize).max(1),
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(n) => n,
        };
        if resolved == 0 || resolved > n_features {
            return Err(ModelError::InvalidConfig {
                parameter: "max_features",
                reason: format!("resolved to {}, must be in [1, {}]", resolved, n_features),
            });
        }
        Ok(resolved)
    }
}

/// Random forest settings.
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `n_trees`           | 100     |
/// | `max_features`      | `Sqrt`  |
/// | `max_depth`         | `None`  |
/// | `min_samples_split` | 2       |
/// | `min_samples_leaf`  | 1       |
/// | `bootstrap`         | true    |
/// | `seed`              | 42      |
#[derive(Debug, Clone, Serialize)]
pub struct RandomForestConfig {
    pub n_trees: usize,
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl RandomForestConfig {
    #[must_use]
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.n_trees == 0 {
            return Err(ModelError::InvalidConfig {
                parameter: "n_trees",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_depth == Some(0) {
            return Err(ModelError::InvalidConfig {
                parameter: "max_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidConfig {
                parameter: "min_samples_split",
                reason: format!("must be at least 2, got {}", self.min_samples_split),
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(ModelError::InvalidConfig {
                parameter: "min_samples_leaf",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Train a forest on dense row-major features and zero-based labels.
    ///
    /// # Errors
    ///
    /// | Variant                                | When                                 |
    /// |----------------------------------------|--------------------------------------|
    /// | [`ModelError::InvalidConfig`]          | a parameter is out of range          |
    /// | [`ModelError::EmptyDataset`]           | `features` is empty                  |
    /// | [`ModelError::FeatureCountMismatch`]   | rows have different widths           |
    /// | [`ModelError::NonFiniteValue`]         | a value is NaN or infinite           |
    /// | [`ModelError::LabelCountMismatch`]     | `labels` and `features` differ       |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<RandomForest, ModelError> {
        self.validate()?;
        let n_features = validate_dense(features)?;
        if labels.len() != features.len() {
            return Err(ModelError::LabelCountMismatch {
                n_rows: features.len(),
                n_labels: labels.len(),
            });
        }

        let n_samples = features.len();
        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.resolve(n_features)?,
            n_classes,
        };

        log::info!(
            "training random forest: {} trees, {} samples, {} features, max_features {}",
            self.n_trees,
            n_samples,
            n_features,
            params.max_features
        );

        let mut master = ChaCha8Rng::seed_from_u64(self.seed);
        let tree_seeds: Vec<u64> = (0..self.n_trees).map(|_| master.gen()).collect();
        let bootstrap = self.bootstrap;

        let trees = tree_seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let tree_seed = rng.gen();
                if !bootstrap {
                    return DecisionTree::fit(features, labels, params, tree_seed);
                }
                let draws: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                let boot_features: Vec<Vec<f64>> = draws.iter().map(|&i| features[i].clone()).collect();
                let boot_labels: Vec<usize> = draws.iter().map(|&i| labels[i]).collect();
                DecisionTree::fit(&boot_features, &boot_labels, params, tree_seed)
            })
            .collect::<Result<Vec<DecisionTree>, ModelError>>()?;

        let importances = aggregate_importances(&trees, n_features);
        log::debug!(
            "forest trained: {} nodes in total",
            trees.iter().map(|t| t.n_nodes()).sum::<usize>()
        );

        Ok(RandomForest {
            trees,
            n_features,
            n_classes,
            importances,
        })
    }
}

/// Sum the per-tree normalized importances and renormalize to 1
fn aggregate_importances(trees: &[DecisionTree], n_features: usize) -> Vec<f64> {
    let mut totals = vec![0.0f64; n_features];
    for tree in trees {
        for (total, value) in totals.iter_mut().zip(tree.feature_importances()) {
            *total += value;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }
    totals
}

/// A fitted random forest
#[derive(Debug, Clone, Serialize)]
pub struct RandomForest {
    #[serde(skip)]
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
    importances: Vec<f64>,
}

impl RandomForest {
    /// Non-negative impurity importances, one per feature, summing to 1
    /// (all zero when no tree managed a single split).
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Average of the per-tree leaf distributions
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ModelError> {
        let mut proba = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            for (p, v) in proba.iter_mut().zip(tree.predict_proba(sample)?) {
                *p += v;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        Ok(proba)
    }

    /// Most probable class; ties go to the lower class index
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ModelError> {
        let proba = self.predict_proba(sample)?;
        Ok(proba
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (class, &p)| if p > best.1 { (class, p) } else { best })
            .0)
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>, ModelError> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
