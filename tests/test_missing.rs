//! Tests for missing value analysis and mean imputation

use biopsy::pipeline::*;

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("feature_{}", i)).collect()
}

#[test]
fn test_missing_ratios_sorted_descending() {
    let features = vec![
        vec![Some(1.0), None, None],
        vec![Some(2.0), Some(1.0), None],
        vec![Some(3.0), None, None],
        vec![Some(4.0), Some(2.0), Some(5.0)],
    ];

    let ratios = analyze_missing_values(&features, &names(3));

    assert_eq!(ratios[0], ("feature_2".to_string(), 0.75));
    assert_eq!(ratios[1], ("feature_1".to_string(), 0.5));
    assert_eq!(ratios[2], ("feature_0".to_string(), 0.0));
}

#[test]
fn test_imputer_fills_with_training_means() {
    let train = vec![
        vec![Some(1.0), Some(10.0)],
        vec![Some(3.0), None],
        vec![None, Some(20.0)],
    ];
    let test = vec![vec![None, None], vec![Some(7.0), Some(8.0)]];

    let imputer = MeanImputer::fit(&train).unwrap();
    let dense = imputer.transform(&test).unwrap();

    assert_eq!(imputer.means(), &[2.0, 15.0]);
    assert_eq!(dense, vec![vec![2.0, 15.0], vec![7.0, 8.0]]);
}

#[test]
fn test_imputer_ignores_test_statistics() {
    let train = vec![vec![Some(0.0)], vec![Some(2.0)]];
    let test = vec![vec![Some(100.0)], vec![None]];

    let imputer = MeanImputer::fit(&train).unwrap();

    assert_eq!(imputer.transform(&test).unwrap(), vec![vec![100.0], vec![1.0]]);
}

#[test]
fn test_complete_rows_unchanged() {
    let rows = vec![vec![Some(1.5), Some(-2.0)], vec![Some(0.0), Some(4.0)]];
    let imputer = MeanImputer::fit(&rows).unwrap();
    assert_eq!(
        imputer.transform(&rows).unwrap(),
        vec![vec![1.5, -2.0], vec![0.0, 4.0]]
    );
}

#[test]
fn test_all_missing_column_is_an_error() {
    let train = vec![vec![Some(1.0), None], vec![Some(2.0), None]];
    assert!(matches!(
        MeanImputer::fit(&train),
        Err(ModelError::AllMissingColumn { feature_index: 1 })
    ));
}

#[test]
fn test_width_mismatch_on_transform() {
    let imputer = MeanImputer::fit(&[vec![Some(1.0), Some(2.0)]]).unwrap();
    assert!(matches!(
        imputer.transform(&[vec![Some(1.0)]]),
        Err(ModelError::FeatureCountMismatch { .. })
    ));
}
