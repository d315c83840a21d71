//! biopsy: feature-ranked diagnostic classifier
//!
//! Loads the Wisconsin Diagnostic Breast Cancer data, ranks the
//! measurements with a random forest, refits a logistic regression on the
//! most important ones and evaluates it on a held-out partition.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
