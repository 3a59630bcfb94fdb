//! Error types for one-class SVM training and prediction

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcsvmError {
    #[error("Invalid matrix shape: {0}")]
    InvalidMatrixShape(String),

    #[error("Insufficient training data: need at least 2 vectors, got {0}")]
    InsufficientTrainingData(usize),

    #[error("Degenerate support set: no free support vector (0 < alpha < {c})")]
    DegenerateSupportSet { c: f64 },

    #[error("Model not trained")]
    ModelNotTrained,

    #[error("Invalid kernel parameters for {kernel}: expected {expected}, got {actual}")]
    InvalidKernelParams {
        kernel: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, OcsvmError>;
