//! Pipeline module - loading, preprocessing, models and evaluation

pub mod error;
pub mod evaluate;
pub mod forest;
pub mod loader;
pub mod logistic;
pub mod missing;
pub mod runner;
pub mod scaler;
pub mod selection;
pub mod split;
pub mod target;

pub use error::ModelError;
pub use evaluate::*;
pub use forest::{DecisionTree, MaxFeatures, Node, RandomForest, RandomForestConfig};
pub use loader::*;
pub use logistic::*;
pub use missing::*;
pub use runner::*;
pub use scaler::*;
pub use selection::*;
pub use split::*;
pub use target::*;
