//! CART classification tree with Gini impurity.
//!
//! Nodes live in an arena (`Vec<Node>`) and reference their children by
//! index. Each split records its weighted impurity decrease so the tree
//! can report mean-decrease-in-impurity importances.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::pipeline::error::{validate_dense, ModelError};

/// Gini impurity `1 - Σ p_i²` from class counts
pub(crate) fn gini(class_counts: &[usize], n_samples: usize) -> f64 {
    if n_samples == 0 {
        return 0.0;
    }
    let n = n_samples as f64;
    1.0 - class_counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// A node of a fitted tree
#[derive(Debug, Clone, Serialize)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
        impurity_decrease: f64,
    },
    Leaf {
        prediction: usize,
        distribution: Vec<f64>,
        n_samples: usize,
    },
}

/// Growth limits for one tree
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: usize,
    pub n_classes: usize,
}

/// Best split found at a node
struct Candidate {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

/// A fitted CART decision tree
#[derive(Debug, Clone, Serialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

impl DecisionTree {
    /// Grow a tree on row-major `features` and zero-based `labels`.
    pub(crate) fn fit(
        features: &[Vec<f64>],
        labels: &[usize],
        params: TreeParams,
        seed: u64,
    ) -> Result<Self, ModelError> {
        let n_features = validate_dense(features)?;
        if labels.len() != features.len() {
            return Err(ModelError::LabelCountMismatch {
                n_rows: features.len(),
                n_labels: labels.len(),
            });
        }

        // Column-major copy so each candidate feature is scanned contiguously.
        let columns: Vec<Vec<f64>> = (0..n_features)
            .map(|j| features.iter().map(|row| row[j]).collect())
            .collect();

        let mut builder = Builder {
            columns: &columns,
            labels,
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
            nodes: Vec::new(),
        };
        let samples: Vec<usize> = (0..features.len()).collect();
        builder.grow(&samples, 0);

        Ok(Self {
            nodes: builder.nodes,
            n_features,
        })
    }

    /// Class distribution of the leaf reached by `sample`
    pub fn predict_proba(&self, sample: &[f64]) -> Result<&[f64], ModelError> {
        if sample.len() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                got: sample.len(),
                row_index: 0,
            });
        }
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution, .. } => return Ok(distribution),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Mean-decrease-in-impurity importances, normalized to sum to 1.
    ///
    /// All zeros when the tree is a single leaf.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[*feature] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

struct Builder<'a> {
    columns: &'a [Vec<f64>],
    labels: &'a [usize],
    params: TreeParams,
    rng: ChaCha8Rng,
    nodes: Vec<Node>,
}

impl Builder<'_> {
    /// Grow the subtree for `samples` and return its arena index
    fn grow(&mut self, samples: &[usize], depth: usize) -> usize {
        let n_samples = samples.len();
        let mut counts = vec![0usize; self.params.n_classes];
        for &s in samples {
            counts[self.labels[s]] += 1;
        }
        let impurity = gini(&counts, n_samples);

        let stop = n_samples < self.params.min_samples_split
            || impurity == 0.0
            || self.params.max_depth.is_some_and(|d| depth >= d);

        let candidate = if stop {
            None
        } else {
            self.best_split(samples, &counts, impurity)
        };

        let Some(split) = candidate else {
            return self.push_leaf(&counts, n_samples);
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&s| self.columns[split.feature][s] <= split.threshold);

        // Reserve the slot so children get higher indices than their parent.
        let idx = self.push_leaf(&counts, n_samples);
        let left = self.grow(&left_samples, depth + 1);
        let right = self.grow(&right_samples, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            n_samples,
            impurity_decrease: split.decrease.max(0.0),
        };
        idx
    }

    fn push_leaf(&mut self, counts: &[usize], n_samples: usize) -> usize {
        let total = n_samples.max(1) as f64;
        let distribution = counts.iter().map(|&c| c as f64 / total).collect();
        // Ties go to the lowest class index.
        let prediction = counts
            .iter()
            .enumerate()
            .fold((0, 0), |best, (class, &c)| if c > best.1 { (class, c) } else { best })
            .0;
        self.nodes.push(Node::Leaf {
            prediction,
            distribution,
            n_samples,
        });
        self.nodes.len() - 1
    }

    /// Scan `max_features` randomly drawn columns for the split with the
    /// largest weighted impurity decrease.
    ///
    /// Columns that are constant over `samples` are skipped without counting
    /// toward `max_features`, so drawing continues until enough usable
    /// columns were scanned or every column was drawn. A best decrease no
    /// larger than rounding noise means the node stays a leaf.
    fn best_split(&mut self, samples: &[usize], parent_counts: &[usize], impurity: f64) -> Option<Candidate> {
        let n_features = self.columns.len();
        let n_samples = samples.len();
        let take = self.params.max_features.min(n_features);

        // Lazy Fisher-Yates over the feature indices.
        let mut order: Vec<usize> = (0..n_features).collect();
        let mut drawn = 0;
        let mut scanned = 0;

        let mut best: Option<Candidate> = None;
        while scanned < take && drawn < n_features {
            let j = self.rng.gen_range(drawn..n_features);
            order.swap(drawn, j);
            let feature = order[drawn];
            drawn += 1;

            let column = &self.columns[feature];
            let mut sorted: Vec<(f64, usize)> = samples
                .iter()
                .map(|&s| (column[s], self.labels[s]))
                .collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
            if sorted[0].0 == sorted[n_samples - 1].0 {
                continue;
            }
            scanned += 1;

            let mut left_counts = vec![0usize; parent_counts.len()];
            let mut right_counts = parent_counts.to_vec();

            for i in 0..n_samples - 1 {
                let (value, class) = sorted[i];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let next = sorted[i + 1].0;
                if value == next {
                    continue;
                }
                let n_left = i + 1;
                let n_right = n_samples - n_left;
                if n_left < self.params.min_samples_leaf || n_right < self.params.min_samples_leaf {
                    continue;
                }

                let decrease = n_samples as f64 * impurity
                    - n_left as f64 * gini(&left_counts, n_left)
                    - n_right as f64 * gini(&right_counts, n_right);

                if best.as_ref().map_or(true, |b| decrease > b.decrease) {
                    let mut threshold = (value + next) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(Candidate {
                        feature,
                        threshold,
                        decrease,
                    });
                }
            }
        }

        let min_gain = f64::EPSILON * n_samples as f64;
        best.filter(|b| b.decrease > min_gain)
    }
}
