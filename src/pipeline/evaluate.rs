//! Confusion matrix and per-class classification metrics.

use std::fmt;

use serde::Serialize;

use super::error::ModelError;

/// Width of the label column in the classification report
const LABEL_WIDTH: usize = 12;

/// Confusion matrix for class labels `0..n_classes`.
///
/// `matrix[actual][predicted]` counts the samples with true label `actual`
/// that were predicted as `predicted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
}

/// Precision, recall, F1 and support for one class (or an average row)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ConfusionMatrix {
    /// Tabulate actual against predicted labels.
    ///
    /// # Errors
    ///
    /// - [`ModelError::EmptyDataset`] when no labels are given
    /// - [`ModelError::LabelCountMismatch`] when the slices differ in length
    /// - [`ModelError::InvalidConfig`] when a label is `>= n_classes`
    pub fn from_labels(actual: &[u8], predicted: &[u8], n_classes: usize) -> Result<Self, ModelError> {
        if actual.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if actual.len() != predicted.len() {
            return Err(ModelError::LabelCountMismatch {
                n_rows: actual.len(),
                n_labels: predicted.len(),
            });
        }
        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (&a, &p) in actual.iter().zip(predicted) {
            let (a, p) = (a as usize, p as usize);
            if a >= n_classes || p >= n_classes {
                return Err(ModelError::InvalidConfig {
                    parameter: "n_classes",
                    reason: format!("label {} outside 0..{}", a.max(p), n_classes),
                });
            }
            matrix[a][p] += 1;
        }
        Ok(Self { matrix })
    }

    pub fn n_classes(&self) -> usize {
        self.matrix.len()
    }

    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Fraction of samples on the diagonal
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes()).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }

    /// Per-class metrics; zero denominators give 0.0
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.n_classes();
        (0..n)
            .map(|c| {
                let tp = self.matrix[c][c];
                let predicted: usize = (0..n).map(|r| self.matrix[r][c]).sum();
                let support: usize = self.matrix[c].iter().sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    label: c.to_string(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self
            .matrix
            .iter()
            .flatten()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);
        for (i, row) in self.matrix.iter().enumerate() {
            let open = if i == 0 { "[[" } else { " [" };
            let close = if i + 1 == self.matrix.len() { "]]" } else { "]" };
            let cells: Vec<String> = row.iter().map(|v| format!("{:>cell$}", v)).collect();
            writeln!(f, "{}{}{}", open, cells.join(" "), close)?;
        }
        Ok(())
    }
}

/// Per-class metrics plus accuracy, macro and support-weighted averages
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_confusion(matrix: &ConfusionMatrix) -> Self {
        let classes = matrix.class_metrics();
        let total: usize = classes.iter().map(|m| m.support).sum();
        let k = classes.len().max(1) as f64;

        let mean = |f: fn(&ClassMetrics) -> f64| classes.iter().map(f).sum::<f64>() / k;
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total as f64
            }
        };

        let macro_avg = ClassMetrics {
            label: "macro avg".to_string(),
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
            support: total,
        };
        let weighted_avg = ClassMetrics {
            label: "weighted avg".to_string(),
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Self {
            accuracy: matrix.accuracy(),
            classes,
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = LABEL_WIDTH;
        writeln!(
            f,
            "{:>w$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        let row = |f: &mut fmt::Formatter<'_>, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>w$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )
        };
        for m in &self.classes {
            row(f, m)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, &self.macro_avg)?;
        row(f, &self.weighted_avg)
    }
}

/// Everything computed from the held-out predictions
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
}

impl Evaluation {
    /// Evaluate binary predictions with label order [0, 1]
    pub fn compute(actual: &[u8], predicted: &[u8]) -> Result<Self, ModelError> {
        let confusion = ConfusionMatrix::from_labels(actual, predicted, 2)?;
        let report = ClassificationReport::from_confusion(&confusion);
        Ok(Self {
            accuracy: confusion.accuracy(),
            confusion,
            report,
        })
    }
}
