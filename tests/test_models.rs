//! Tests for the split, scaling, forest, selection, logistic and evaluation stages

mod common;

use biopsy::pipeline::*;
use common::{synthetic_wdbc_lines, INFORMATIVE_FEATURES};

/// Dense features and labels parsed straight from the synthetic lines
fn synthetic_matrix(rows: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<u8>) {
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for line in synthetic_wdbc_lines(rows, 30, seed) {
        let cells: Vec<&str> = line.split(',').collect();
        labels.push(if cells[1] == "M" { 1 } else { 0 });
        features.push(cells[2..].iter().map(|c| c.parse::<f64>().unwrap()).collect());
    }
    (features, labels)
}

#[test]
fn test_split_sizes() {
    for (n, expected) in [(569, 114), (100, 20), (10, 2), (3, 1)] {
        let split = train_test_split(n, 0.2, 42).unwrap();
        assert_eq!(split.test_len(), expected, "n = {n}");
        assert_eq!(split.train_len() + split.test_len(), n);
    }
}

#[test]
fn test_split_is_a_partition() {
    let split = train_test_split(50, 0.2, 42).unwrap();
    let mut all: Vec<usize> = split
        .train_indices
        .iter()
        .chain(&split.test_indices)
        .copied()
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..50).collect::<Vec<_>>());
}

#[test]
fn test_split_seeded() {
    assert_eq!(
        train_test_split(80, 0.2, 42).unwrap(),
        train_test_split(80, 0.2, 42).unwrap()
    );
    assert_ne!(
        train_test_split(80, 0.2, 42).unwrap(),
        train_test_split(80, 0.2, 43).unwrap()
    );
}

#[test]
fn test_scaled_training_columns_are_standardized() {
    let (features, _) = synthetic_matrix(120, 7);

    let (_, scaled) = StandardScaler::fit_transform(&features).unwrap();

    let n = scaled.len() as f64;
    for j in 0..30 {
        let mean = scaled.iter().map(|r| r[j]).sum::<f64>() / n;
        let var = scaled.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-9, "column {j} mean {mean}");
        assert!((var.sqrt() - 1.0).abs() < 1e-9, "column {j} std {}", var.sqrt());
    }
}

#[test]
fn test_forest_ranks_informative_features_first() {
    let (features, labels) = synthetic_matrix(200, 11);
    let labels: Vec<usize> = labels.iter().map(|&l| l as usize).collect();

    let forest = RandomForestConfig::default()
        .with_n_trees(50)
        .fit(&features, &labels)
        .unwrap();
    let importances = forest.feature_importances();

    assert_eq!(importances.len(), 30);
    assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    assert!(importances.iter().all(|&v| v >= 0.0));

    let top = rank_features(importances).top(INFORMATIVE_FEATURES);
    let mut sorted = top.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..INFORMATIVE_FEATURES).collect::<Vec<_>>(), "top = {top:?}");
}

#[test]
fn test_ranking_reproducible_with_same_seed() {
    let (features, labels) = synthetic_matrix(120, 13);
    let labels: Vec<usize> = labels.iter().map(|&l| l as usize).collect();
    let config = RandomForestConfig::default().with_n_trees(30);

    let a = rank_features(config.fit(&features, &labels).unwrap().feature_importances()).top(10);
    let b = rank_features(config.fit(&features, &labels).unwrap().feature_importances()).top(10);

    assert_eq!(a, b);
}

#[test]
fn test_logistic_on_reduced_features() {
    let (features, labels) = synthetic_matrix(200, 17);
    let (_, scaled) = StandardScaler::fit_transform(&features).unwrap();
    let reduced = select_columns(&scaled, &[0, 1, 2, 3]);

    let model = LogisticRegressionConfig::default().fit(&reduced, &labels).unwrap();
    let predictions = model.predict_batch(&reduced).unwrap();
    let evaluation = Evaluation::compute(&labels, &predictions).unwrap();

    assert_ne!(model.status(), SolverStatus::MaxIterationsReached);
    assert_eq!(model.weights().len(), 4);
    assert!(model.weights().iter().all(|&w| w > 0.0));
    assert!(evaluation.accuracy > 0.9, "accuracy = {}", evaluation.accuracy);
}

#[test]
fn test_evaluation_totals_match() {
    let actual = vec![0, 1, 1, 0, 1, 0, 0];
    let predicted = vec![0, 1, 0, 0, 1, 1, 0];

    let evaluation = Evaluation::compute(&actual, &predicted).unwrap();

    assert_eq!(evaluation.confusion.total(), actual.len());
    assert_eq!(evaluation.confusion.as_rows(), &[vec![3, 1], vec![1, 2]]);
    assert!((evaluation.accuracy - 5.0 / 7.0).abs() < 1e-12);
    assert_eq!(evaluation.report.macro_avg.support, 7);
}
