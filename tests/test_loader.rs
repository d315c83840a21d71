//! Tests for dataset loading and cleaning

mod common;

use biopsy::pipeline::*;
use common::{blank_cell, create_wdbc_csv, synthetic_wdbc_lines, write_temp_csv};

#[test]
fn test_load_canonical_width() {
    let (_dir, path) = create_wdbc_csv(50, 1);

    let report = load_dataset(&DataSource::File(path), &LoaderConfig::default()).unwrap();

    assert_eq!(report.raw_rows, 50);
    assert_eq!(report.raw_columns, 32);
    assert_eq!(report.dataset.n_rows(), 50);
    assert_eq!(report.dataset.n_features(), 30);
    assert_eq!(report.malignant + report.benign, 50);
    assert_eq!(report.dropped_rows, 0);
}

#[test]
fn test_31_column_file_yields_29_features() {
    let lines = synthetic_wdbc_lines(40, 29, 2);
    let (_dir, path) = write_temp_csv(&lines);
    let config = LoaderConfig {
        expected_columns: 31,
        ..LoaderConfig::default()
    };

    let report = load_dataset(&DataSource::File(path), &config).unwrap();

    assert_eq!(report.dataset.n_features(), 29);
    assert!(report.dataset.features.iter().all(|row| row.len() == 29));
    assert_eq!(report.dataset.feature_names[28], "feature_28");
}

#[test]
fn test_width_mismatch_is_an_error() {
    let lines = synthetic_wdbc_lines(20, 29, 3);
    let (_dir, path) = write_temp_csv(&lines);

    let err = load_dataset(&DataSource::File(path), &LoaderConfig::default()).unwrap_err();

    assert!(format!("{:#}", err).contains("Expected 32 columns"));
}

#[test]
fn test_rows_with_unknown_diagnosis_are_dropped() {
    let mut lines = synthetic_wdbc_lines(30, 30, 4);
    blank_cell(&mut lines, 0, 1, "X");
    blank_cell(&mut lines, 5, 1, "m");
    blank_cell(&mut lines, 9, 1, "");
    let (_dir, path) = write_temp_csv(&lines);

    let report = load_dataset(&DataSource::File(path), &LoaderConfig::default()).unwrap();

    assert_eq!(report.dataset.n_rows(), 27);
    assert_eq!(report.dropped_rows, 3);
    assert!(report.dataset.labels.iter().all(|&l| l == 0 || l == 1));
}

#[test]
fn test_label_encoding_follows_diagnosis() {
    let lines = vec![
        format!("1,M,{}", vec!["1.0"; 30].join(",")),
        format!("2,B,{}", vec!["2.0"; 30].join(",")),
    ];
    let (_dir, path) = write_temp_csv(&lines);

    let report = load_dataset(&DataSource::File(path), &LoaderConfig::default()).unwrap();

    assert_eq!(report.dataset.labels, vec![1, 0]);
    assert_eq!(report.dataset.features[0][0], Some(1.0));
    assert_eq!(report.dataset.features[1][29], Some(2.0));
}

#[test]
fn test_non_numeric_cells_become_missing() {
    let mut lines = synthetic_wdbc_lines(20, 30, 5);
    blank_cell(&mut lines, 3, 2, "?");
    blank_cell(&mut lines, 7, 10, "");
    let (_dir, path) = write_temp_csv(&lines);

    let dataset = load_dataset(&DataSource::File(path), &LoaderConfig::default())
        .unwrap()
        .dataset;

    assert_eq!(dataset.features[3][0], None);
    assert_eq!(dataset.features[7][8], None);
    assert_eq!(count_missing(&dataset.features), 2);
}

#[test]
fn test_no_valid_labels_is_an_error() {
    let mut lines = synthetic_wdbc_lines(5, 30, 6);
    for row in 0..5 {
        blank_cell(&mut lines, row, 1, "U");
    }
    let (_dir, path) = write_temp_csv(&lines);

    assert!(load_dataset(&DataSource::File(path), &LoaderConfig::default()).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    let source = DataSource::parse("/nonexistent/path/wdbc.data");
    let err = load_dataset(&source, &LoaderConfig::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read dataset file"));
}

#[test]
fn test_source_parsing() {
    assert!(matches!(DataSource::parse("https://example.org/wdbc.data"), DataSource::Url(_)));
    assert!(matches!(DataSource::parse("HTTP://example.org/wdbc.data"), DataSource::Url(_)));
    assert!(matches!(DataSource::parse("./wdbc.data"), DataSource::File(_)));
    assert_eq!(DataSource::default().to_string(), DEFAULT_DATASET_URL);
}
