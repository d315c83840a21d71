//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

/// Number of measurements that differ between the two diagnoses
pub const INFORMATIVE_FEATURES: usize = 4;

/// Generate headerless wdbc-style lines: `id,diagnosis,m_0,...,m_{n-1}`.
///
/// Roughly 37% of rows are malignant. The first [`INFORMATIVE_FEATURES`]
/// measurements are shifted upward for malignant rows, the rest are noise.
pub fn synthetic_wdbc_lines(rows: usize, measurements: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..rows)
        .map(|i| {
            let malignant = rng.gen_bool(0.37);
            let diagnosis = if malignant { "M" } else { "B" };
            let values: Vec<String> = (0..measurements)
                .map(|j| {
                    let base = 10.0 + j as f64;
                    let shift = if malignant && j < INFORMATIVE_FEATURES { 4.0 } else { 0.0 };
                    format!("{:.4}", base + shift + rng.gen_range(-1.5..1.5))
                })
                .collect();
            format!("{},{},{}", 840_000 + i, diagnosis, values.join(","))
        })
        .collect()
}

/// Whether row `i` of [`golden_wdbc_lines`] is malignant (3 rows in 8)
pub fn golden_is_malignant(i: usize) -> bool {
    matches!(i % 8, 0 | 3 | 5)
}

/// Fixed wdbc-style lines with no randomness in them.
///
/// Measurement 0 lies in `[10, 11)` for benign rows and `[20, 21)` for
/// malignant rows; measurement `j > 0` is the constant `10 + j`.
pub fn golden_wdbc_lines(rows: usize) -> Vec<String> {
    (0..rows)
        .map(|i| {
            let malignant = golden_is_malignant(i);
            let diagnosis = if malignant { "M" } else { "B" };
            let base = if malignant { 20.0 } else { 10.0 };
            let mut values = vec![format!("{:.4}", base + ((i * 37) % 10) as f64 * 0.1)];
            values.extend((1..30).map(|j| format!("{:.4}", 10.0 + j as f64)));
            format!("{},{},{}", 840_000 + i, diagnosis, values.join(","))
        })
        .collect()
}

/// Write lines to a CSV file inside a fresh temporary directory
pub fn write_temp_csv(lines: &[String]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("wdbc.data");

    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }

    (temp_dir, path)
}

/// A canonical-width (32 column) synthetic dataset on disk
pub fn create_wdbc_csv(rows: usize, seed: u64) -> (TempDir, PathBuf) {
    write_temp_csv(&synthetic_wdbc_lines(rows, 30, seed))
}

/// Replace the cell at `column` (raw position) of the given lines
pub fn blank_cell(lines: &mut [String], row: usize, column: usize, replacement: &str) {
    let mut cells: Vec<String> = lines[row].split(',').map(String::from).collect();
    cells[column] = replacement.to_string();
    lines[row] = cells.join(",");
}
