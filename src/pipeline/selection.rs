//! Importance-based feature ranking and column reduction

use serde::Serialize;

/// A feature's positional index and its importance score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedFeature {
    pub index: usize,
    pub importance: f64,
}

/// Features ordered by importance, highest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRanking {
    ranked: Vec<RankedFeature>,
}

impl FeatureRanking {
    /// Indices of the first `k` features (fewer if the ranking is shorter)
    pub fn top(&self, k: usize) -> Vec<usize> {
        self.ranked.iter().take(k).map(|f| f.index).collect()
    }

    pub fn ranked(&self) -> &[RankedFeature] {
        &self.ranked
    }
}

/// Rank features by importance, descending.
///
/// The sort is stable, so equal scores keep their original column order.
pub fn rank_features(importances: &[f64]) -> FeatureRanking {
    let mut ranked: Vec<RankedFeature> = importances
        .iter()
        .enumerate()
        .map(|(index, &importance)| RankedFeature { index, importance })
        .collect();

    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));

    FeatureRanking { ranked }
}

/// Keep only `indices` from every row, in the given order
pub fn select_columns(rows: &[Vec<f64>], indices: &[usize]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| indices.iter().map(|&i| row[i]).collect())
        .collect()
}
