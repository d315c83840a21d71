//! L2-regularized logistic regression fitted by Newton's method (IRLS).
//!
//! Minimizes
//!
//! ```text
//! Σ_i [ log(1 + exp(z_i)) - y_i z_i ] + ‖w‖² / (2C),   z_i = w·x_i + b
//! ```
//!
//! The intercept is not penalized. Each iteration solves the penalized
//! normal equations `(XᵀWX + λI) Δ = g` with a Cholesky factorization and
//! halves the step until the objective does not increase.

use faer::prelude::*;
use faer::{Mat, Side};
use serde::Serialize;

use super::error::{validate_dense, ModelError};

/// Maximum number of step halvings per iteration
const MAX_STEP_HALVINGS: usize = 30;

/// Solver settings.
///
/// | Parameter       | Default  |
/// |-----------------|----------|
/// | `c`             | 1.0      |
/// | `max_iter`      | 10 000   |
/// | `tolerance`     | 1e-8     |
/// | `fit_intercept` | true     |
#[derive(Debug, Clone, Serialize)]
pub struct LogisticRegressionConfig {
    /// Inverse regularization strength
    pub c: f64,
    /// Iteration cap for the Newton loop
    pub max_iter: usize,
    /// Convergence threshold on the largest absolute gradient entry
    pub tolerance: f64,
    pub fit_intercept: bool,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 10_000,
            tolerance: 1e-8,
            fit_intercept: true,
        }
    }
}

/// How the Newton loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolverStatus {
    /// Gradient fell below the tolerance.
    Converged,
    /// No step length reduced the objective; the iterate is at the numerical minimum.
    Stalled,
    /// Iteration cap reached before the gradient tolerance.
    MaxIterationsReached,
}

/// A fitted binary logistic model
#[derive(Debug, Clone, Serialize)]
pub struct LogisticModel {
    weights: Vec<f64>,
    intercept: f64,
    status: SolverStatus,
    iterations: usize,
    objective: f64,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `log(1 + exp(z))` without overflow
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

struct Problem<'a> {
    design: Mat<f64>,
    y: &'a [f64],
    lambda: f64,
    n_penalized: usize,
}

impl Problem<'_> {
    fn linear(&self, theta: &[f64]) -> Vec<f64> {
        (0..self.design.nrows())
            .map(|i| (0..theta.len()).map(|j| self.design[(i, j)] * theta[j]).sum())
            .collect()
    }

    fn objective(&self, theta: &[f64]) -> f64 {
        let data: f64 = self
            .linear(theta)
            .iter()
            .zip(self.y)
            .map(|(&z, &y)| softplus(z) - y * z)
            .sum();
        let penalty: f64 = theta[..self.n_penalized].iter().map(|w| w * w).sum();
        data + 0.5 * self.lambda * penalty
    }
}

impl LogisticRegressionConfig {
    fn validate(&self) -> Result<(), ModelError> {
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(ModelError::InvalidConfig {
                parameter: "c",
                reason: format!("must be positive and finite, got {}", self.c),
            });
        }
        if self.max_iter == 0 {
            return Err(ModelError::InvalidConfig {
                parameter: "max_iter",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Fit on dense rows and 0/1 labels
    pub fn fit(&self, features: &[Vec<f64>], labels: &[u8]) -> Result<LogisticModel, ModelError> {
        self.validate()?;
        let n_features = validate_dense(features)?;
        if labels.len() != features.len() {
            return Err(ModelError::LabelCountMismatch {
                n_rows: features.len(),
                n_labels: labels.len(),
            });
        }

        let n = features.len();
        let p = n_features + usize::from(self.fit_intercept);
        let design = Mat::from_fn(n, p, |i, j| {
            if j < n_features {
                features[i][j]
            } else {
                1.0
            }
        });
        let y: Vec<f64> = labels.iter().map(|&l| f64::from(l)).collect();
        let problem = Problem {
            design,
            y: &y,
            lambda: 1.0 / self.c,
            n_penalized: n_features,
        };

        let mut theta = vec![0.0f64; p];
        let mut objective = problem.objective(&theta);
        let mut status = SolverStatus::MaxIterationsReached;
        let mut iterations = 0;

        while iterations < self.max_iter {
            let mu: Vec<f64> = problem.linear(&theta).into_iter().map(sigmoid).collect();

            let mut gradient = Mat::<f64>::zeros(p, 1);
            for j in 0..p {
                let mut g: f64 = (0..n).map(|i| (mu[i] - y[i]) * problem.design[(i, j)]).sum();
                if j < n_features {
                    g += problem.lambda * theta[j];
                }
                gradient[(j, 0)] = g;
            }
            let max_grad = (0..p).map(|j| gradient[(j, 0)].abs()).fold(0.0f64, f64::max);
            log::debug!(
                "logistic iter {}: objective {:.10e}, max |grad| {:.3e}",
                iterations,
                objective,
                max_grad
            );
            if max_grad <= self.tolerance {
                status = SolverStatus::Converged;
                break;
            }

            let weighted = Mat::from_fn(n, p, |i, j| {
                let w = (mu[i] * (1.0 - mu[i])).sqrt();
                problem.design[(i, j)] * w
            });
            let mut hessian = weighted.transpose() * &weighted;
            for j in 0..n_features {
                hessian[(j, j)] += problem.lambda;
            }

            let cholesky = hessian
                .cholesky(Side::Lower)
                .map_err(|_| ModelError::SingularSystem { iteration: iterations })?;
            let delta = cholesky.solve(gradient.as_ref());

            iterations += 1;

            let mut step = 1.0;
            let mut accepted = false;
            for _ in 0..MAX_STEP_HALVINGS {
                let trial: Vec<f64> = theta
                    .iter()
                    .enumerate()
                    .map(|(j, t)| t - step * delta[(j, 0)])
                    .collect();
                let trial_objective = problem.objective(&trial);
                if trial_objective.is_finite()
                    && trial_objective <= objective + 1e-12 * objective.abs().max(1.0)
                {
                    theta = trial;
                    objective = trial_objective;
                    accepted = true;
                    break;
                }
                step *= 0.5;
            }

            if !accepted {
                status = SolverStatus::Stalled;
                break;
            }
        }

        match status {
            SolverStatus::Converged => {
                log::info!("logistic regression converged after {} iterations", iterations)
            }
            SolverStatus::Stalled => log::info!(
                "logistic regression stopped after {} iterations: no further decrease",
                iterations
            ),
            SolverStatus::MaxIterationsReached => log::warn!(
                "logistic regression hit max_iter = {} without converging",
                self.max_iter
            ),
        }

        let intercept = if self.fit_intercept { theta[n_features] } else { 0.0 };
        theta.truncate(n_features);

        Ok(LogisticModel {
            weights: theta,
            intercept,
            status,
            iterations,
            objective,
        })
    }
}

impl LogisticModel {
    /// Signed distance `w·x + b`
    pub fn decision_function(&self, sample: &[f64]) -> Result<f64, ModelError> {
        if sample.len() != self.weights.len() {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.weights.len(),
                got: sample.len(),
                row_index: 0,
            });
        }
        Ok(self
            .weights
            .iter()
            .zip(sample)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept)
    }

    /// Probability of class 1
    pub fn predict_proba(&self, sample: &[f64]) -> Result<f64, ModelError> {
        Ok(sigmoid(self.decision_function(sample)?))
    }

    /// Class 1 when the decision value is positive, class 0 otherwise
    pub fn predict(&self, sample: &[f64]) -> Result<u8, ModelError> {
        Ok(u8::from(self.decision_function(sample)? > 0.0))
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<u8>, ModelError> {
        rows.iter()
            .enumerate()
            .map(|(row_index, row)| {
                self.predict(row).map_err(|e| match e {
                    ModelError::FeatureCountMismatch { expected, got, .. } => {
                        ModelError::FeatureCountMismatch {
                            expected,
                            got,
                            row_index,
                        }
                    }
                    other => other,
                })
            })
            .collect()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn status(&self) -> SolverStatus {
        self.status
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Final value of the penalized objective
    pub fn objective(&self) -> f64 {
        self.objective
    }
}
