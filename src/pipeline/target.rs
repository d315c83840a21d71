//! Diagnosis label mapping
//!
//! The raw file carries the diagnosis as a string category. This module
//! maps it onto the binary 0/1 label the models train on and reports which
//! rows could not be mapped.

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Category that marks a malignant tumour (maps to 1)
pub const MALIGNANT: &str = "M";
/// Category that marks a benign tumour (maps to 0)
pub const BENIGN: &str = "B";

/// Mapping configuration for converting label values to binary 0/1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMapping {
    /// Value that maps to 1 (event)
    pub event_value: String,
    /// Value that maps to 0 (non-event)
    pub non_event_value: String,
}

impl TargetMapping {
    /// Create a new target mapping
    pub fn new(event_value: impl Into<String>, non_event_value: impl Into<String>) -> Self {
        Self {
            event_value: event_value.into(),
            non_event_value: non_event_value.into(),
        }
    }

    /// Map a single raw value. Comparison is exact: no trimming, no case folding.
    pub fn encode(&self, value: Option<&str>) -> Option<u8> {
        match value {
            Some(s) if s == self.event_value => Some(1),
            Some(s) if s == self.non_event_value => Some(0),
            _ => None,
        }
    }
}

impl Default for TargetMapping {
    fn default() -> Self {
        Self::new(MALIGNANT, BENIGN)
    }
}

/// Create a binary label mask for a column.
///
/// Returns one entry per row:
/// - `Some(1)` for event values
/// - `Some(0)` for non-event values
/// - `None` for missing values or anything else (the row gets dropped)
pub fn create_target_mask(col: &Column, mapping: &TargetMapping) -> Result<Vec<Option<u8>>> {
    let string_values = column_to_string_vec(col)?;

    Ok(string_values
        .iter()
        .map(|v| mapping.encode(v.as_deref()))
        .collect())
}

/// Convert a column to a Vec of Option<String> for comparison
fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        DataType::Null => vec![None; col.len()],
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

/// Count events, non-events and unmapped rows in a mask
pub fn count_mapped_records(mask: &[Option<u8>]) -> (usize, usize, usize) {
    let events = mask.iter().filter(|v| **v == Some(1)).count();
    let non_events = mask.iter().filter(|v| **v == Some(0)).count();
    let ignored = mask.iter().filter(|v| v.is_none()).count();

    (events, non_events, ignored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping_is_malignant_benign() {
        let mapping = TargetMapping::default();
        assert_eq!(mapping.encode(Some("M")), Some(1));
        assert_eq!(mapping.encode(Some("B")), Some(0));
    }

    #[test]
    fn test_encode_is_exact() {
        let mapping = TargetMapping::default();
        assert_eq!(mapping.encode(Some("m")), None);
        assert_eq!(mapping.encode(Some(" M")), None);
        assert_eq!(mapping.encode(Some("")), None);
        assert_eq!(mapping.encode(None), None);
    }

    #[test]
    fn test_create_target_mask() {
        let col = Column::new("diagnosis".into(), [Some("M"), Some("B"), None, Some("X"), Some("B")]);

        let mask = create_target_mask(&col, &TargetMapping::default()).unwrap();

        assert_eq!(mask, vec![Some(1), Some(0), None, None, Some(0)]);
    }

    #[test]
    fn test_numeric_label_column_never_maps() {
        let col = Column::new("diagnosis".into(), [1i64, 0, 1]);

        let mask = create_target_mask(&col, &TargetMapping::default()).unwrap();

        assert!(mask.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_count_mapped_records() {
        let mask = vec![Some(1), Some(0), Some(0), None, Some(1), None];

        let (events, non_events, ignored) = count_mapped_records(&mask);

        assert_eq!(events, 2);
        assert_eq!(non_events, 2);
        assert_eq!(ignored, 2);
    }
}
