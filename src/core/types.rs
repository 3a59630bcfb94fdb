//! Core type definitions for one-class SVM

use crate::core::{OcsvmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label string used for the normal (target) class
pub const NORMAL_LABEL: &str = "1";
/// Label string used for outliers
pub const OUTLIER_LABEL: &str = "-1";

/// Dense feature vector with an identifier and an optional class label
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Identifier carried through to predictions
    pub id: String,
    /// Class label as read from the input ("1" normal, "-1" outlier)
    pub label: Option<String>,
    /// Coordinates
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Create a new labeled feature vector
    pub fn new(id: impl Into<String>, label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
            values,
        }
    }

    /// Create a feature vector without a class label
    pub fn unlabeled(id: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            label: None,
            values,
        }
    }

    /// Number of coordinates
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Squared L2 norm
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Whether this vector may be used for training.
    ///
    /// Unlabeled vectors and vectors labeled as normal belong to the target class.
    pub fn is_target(&self) -> bool {
        match &self.label {
            None => true,
            Some(label) => label == NORMAL_LABEL,
        }
    }
}

/// Predicted class of a scored vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Normal,
    Outlier,
}

impl Label {
    /// Label string as used in data files
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Normal => NORMAL_LABEL,
            Label::Outlier => OUTLIER_LABEL,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = OcsvmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1" | "+1" => Ok(Label::Normal),
            "-1" => Ok(Label::Outlier),
            other => Err(OcsvmError::ParseError(format!("unknown label: {other}"))),
        }
    }
}

/// Result of scoring a single vector against a trained model
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Identifier of the scored vector
    pub id: String,
    /// Label the vector carried on input, if any
    pub true_label: Option<String>,
    /// Signed distance from the decision boundary (or sphere)
    pub score: f64,
    /// Predicted label
    pub label: Label,
}

impl PredictionResult {
    /// Create a prediction for `vector`
    pub fn new(vector: &FeatureVector, score: f64, label: Label) -> Self {
        Self {
            id: vector.id.clone(),
            true_label: vector.label.clone(),
            score,
            label,
        }
    }

    /// Whether the vector was predicted as an outlier
    pub fn is_outlier(&self) -> bool {
        self.label == Label::Outlier
    }
}

/// Configuration for the decomposition solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Stopping tolerance on the maximal KKT violation
    pub tolerance: f64,
    /// Floor applied to non-positive curvature
    pub tau: f64,
    /// Hard cap on solver iterations
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            tau: 1.0e-12,
            max_iterations: 1_000_000,
        }
    }
}
