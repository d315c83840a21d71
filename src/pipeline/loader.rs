//! Dataset loader: fetch the headerless diagnostic CSV, drop the record
//! identifier, encode the diagnosis and keep the numeric measurements.

use std::io::{Cursor, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::target::{count_mapped_records, create_target_mask, TargetMapping};

/// Location of the Wisconsin Diagnostic Breast Cancer file
pub const DEFAULT_DATASET_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/breast-cancer-wisconsin/wdbc.data";

/// Raw width of the canonical file: identifier, diagnosis, 30 measurements
pub const DEFAULT_EXPECTED_COLUMNS: usize = 32;

/// Column positions in the raw file
const ID_COLUMN: usize = 0;
const LABEL_COLUMN: usize = 1;

/// Where the raw CSV comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    /// Interpret a command-line value: http(s) prefixes are URLs, anything else a path
    pub fn parse(value: &str) -> Self {
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(value.to_string())
        } else {
            DataSource::File(PathBuf::from(value))
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Url(DEFAULT_DATASET_URL.to_string())
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loader settings
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of raw columns every row must have
    pub expected_columns: usize,
    /// Diagnosis category mapping
    pub mapping: TargetMapping,
    /// Rows used by polars for dtype inference (`None` scans everything)
    pub infer_schema_length: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            expected_columns: DEFAULT_EXPECTED_COLUMNS,
            mapping: TargetMapping::default(),
            infer_schema_length: None,
        }
    }
}

/// Cleaned, encoded dataset: one row per retained record
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    /// Positional feature names (`feature_0`, `feature_1`, ...)
    pub feature_names: Vec<String>,
    /// Row-major measurements, `None` where the cell was empty or not numeric
    pub features: Vec<Vec<Option<f64>>>,
    /// Encoded diagnosis, 1 = malignant, 0 = benign
    pub labels: Vec<u8>,
}

impl Dataset {
    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

/// What the loader did, for the console summary
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub dataset: Dataset,
    pub raw_rows: usize,
    pub raw_columns: usize,
    pub dropped_rows: usize,
    pub malignant: usize,
    pub benign: usize,
    pub memory_mb: f64,
}

/// Fetch the raw bytes from a URL or a local file.
///
/// Blocking, no retry: any failure aborts the run.
pub fn fetch_bytes(source: &DataSource) -> Result<Vec<u8>> {
    match source {
        DataSource::Url(url) => {
            log::info!("fetching dataset from {}", url);
            let response = ureq::get(url)
                .call()
                .with_context(|| format!("Failed to fetch dataset from {}", url))?;
            let mut bytes = Vec::new();
            response
                .into_reader()
                .read_to_end(&mut bytes)
                .with_context(|| format!("Failed to read response body from {}", url))?;
            Ok(bytes)
        }
        DataSource::File(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read dataset file: {}", path.display())),
    }
}

/// Parse headerless CSV bytes into a DataFrame
pub fn parse_csv(bytes: Vec<u8>, infer_schema_length: Option<usize>) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(infer_schema_length)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .context("Failed to parse dataset as CSV")
}

/// Drop the identifier, encode the diagnosis and extract the measurements.
///
/// Rows whose diagnosis is not exactly one of the mapped categories are
/// removed before anything else. Measurement cells that are empty, not
/// numeric or NaN become `None`.
pub fn clean_dataset(df: &DataFrame, config: &LoaderConfig) -> Result<Dataset> {
    let width = df.width();
    if width != config.expected_columns {
        anyhow::bail!(
            "Expected {} columns (identifier, diagnosis, {} measurements), found {}",
            config.expected_columns,
            config.expected_columns.saturating_sub(2),
            width
        );
    }

    let columns = df.get_columns();
    log::debug!("dropping identifier column {}", columns[ID_COLUMN].name());

    let mask = create_target_mask(&columns[LABEL_COLUMN], &config.mapping)?;
    let (events, non_events, ignored) = count_mapped_records(&mask);
    log::debug!(
        "label mapping: {} event, {} non-event, {} unmapped",
        events,
        non_events,
        ignored
    );

    let measurement_columns = &columns[LABEL_COLUMN + 1..];
    let mut column_values: Vec<Vec<Option<f64>>> = Vec::with_capacity(measurement_columns.len());
    for (idx, col) in measurement_columns.iter().enumerate() {
        let cast = col
            .cast(&DataType::Float64)
            .with_context(|| format!("Failed to read measurement column {} as numeric", idx))?;
        let values: Vec<Option<f64>> = cast
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        column_values.push(values);
    }

    let mut features = Vec::with_capacity(df.height());
    let mut labels = Vec::with_capacity(df.height());
    for (row_idx, label) in mask.iter().enumerate() {
        if let Some(label) = label {
            features.push(column_values.iter().map(|col| col[row_idx]).collect());
            labels.push(*label);
        }
    }

    let feature_names = (0..measurement_columns.len())
        .map(|i| format!("feature_{}", i))
        .collect();

    Ok(Dataset {
        feature_names,
        features,
        labels,
    })
}

/// Fetch, parse and clean the dataset in one go
pub fn load_dataset(source: &DataSource, config: &LoaderConfig) -> Result<LoadReport> {
    let bytes = fetch_bytes(source)?;
    let df = parse_csv(bytes, config.infer_schema_length)?;
    let (raw_rows, raw_columns) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);

    let dataset = clean_dataset(&df, config)?;
    let malignant = dataset.labels.iter().filter(|l| **l == 1).count();
    let benign = dataset.n_rows() - malignant;
    let dropped_rows = raw_rows - dataset.n_rows();

    if dataset.n_rows() == 0 {
        anyhow::bail!(
            "No rows left after label cleaning: none of the {} rows has diagnosis '{}' or '{}'",
            raw_rows,
            config.mapping.event_value,
            config.mapping.non_event_value
        );
    }

    log::info!(
        "loaded {} rows ({} dropped), {} features",
        dataset.n_rows(),
        dropped_rows,
        dataset.n_features()
    );

    Ok(LoadReport {
        dataset,
        raw_rows,
        raw_columns,
        dropped_rows,
        malignant,
        benign,
        memory_mb,
    })
}
