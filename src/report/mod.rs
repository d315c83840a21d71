//! Report module - console summary and confusion matrix heatmap

pub mod heatmap;
pub mod summary;

pub use heatmap::*;
pub use summary::*;
