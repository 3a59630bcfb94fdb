//! One-class Support Vector Machines
//!
//! Learns the support of a "normal" population from normal examples only,
//! then flags new vectors as normal or outlier. Two formulations are
//! available: Schölkopf's separating hyperplane and Tax and Duin's minimum
//! enclosing hypersphere. Both are trained with a decomposition solver
//! using second-order working set selection (WSS3).

pub mod api;
pub mod core;
pub mod data;
pub mod kernel;
pub mod matrix;
pub mod model;
pub mod persistence;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, GridSearchResult, OneClassSvm, ParamRange, ParameterGrid};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{OcsvmError, Result};
pub use crate::data::VectorDataset;
pub use crate::kernel::{Kernel, KernelFunction, KernelType};
pub use crate::matrix::SymmetricMatrix;
pub use crate::model::{Method, OneClassTrainer, Threshold, TrainedModel};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
