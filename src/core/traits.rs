//! Core traits for one-class SVM

use crate::core::{FeatureVector, PredictionResult, Result};

/// Dataset abstraction over a collection of feature vectors
pub trait Dataset {
    /// Number of vectors in the dataset
    fn len(&self) -> usize;

    /// Number of coordinates per vector
    fn dim(&self) -> usize;

    /// All vectors, in input order
    fn vectors(&self) -> &[FeatureVector];

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Anything that can score feature vectors as normal or outlier
pub trait Detector {
    /// Score a single vector
    fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult>;

    /// Score several vectors, stopping at the first failure
    fn predict_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<PredictionResult>> {
        vectors.iter().map(|v| self.predict(v)).collect()
    }

    /// Number of training vectors with a positive dual coefficient
    fn n_support_vectors(&self) -> usize;
}
