//! Trained one-class models
//!
//! A [`TrainedModel`] keeps the full training set together with the solved
//! dual coefficients and the kernel matrix, so it can be persisted and
//! restored without retraining. [`OneClassTrainer`] owns the lifecycle
//! (train, reset, load) and [`predict`] holds the scoring rules.

pub mod method;
pub mod predict;
pub mod trainer;

pub use self::method::*;
pub use self::trainer::*;

use crate::core::{FeatureVector, OcsvmError, Result};
use crate::kernel::Kernel;
use crate::matrix::SymmetricMatrix;
use serde::{Deserialize, Serialize};

/// Decision threshold derived from the solved coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Hyperplane offset (Schölkopf)
    Rho(f64),
    /// Squared sphere radius (Tax and Duin)
    SquaredRadius(f64),
}

impl Threshold {
    /// Raw threshold value
    pub fn value(&self) -> f64 {
        match self {
            Threshold::Rho(value) | Threshold::SquaredRadius(value) => *value,
        }
    }

    /// Method this kind of threshold belongs to
    pub fn method(&self) -> Method {
        match self {
            Threshold::Rho(_) => Method::Scholkopf,
            Threshold::SquaredRadius(_) => Method::TaxAndDuin,
        }
    }

    /// Threshold of the kind `method` uses, holding `value`
    pub fn for_method(method: Method, value: f64) -> Self {
        match method {
            Method::Scholkopf => Threshold::Rho(value),
            Method::TaxAndDuin => Threshold::SquaredRadius(value),
        }
    }
}

/// Everything needed to score new vectors
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    id: String,
    method: Method,
    nu: f64,
    tolerance: f64,
    kernel: Kernel,
    alphas: Vec<f64>,
    kernel_matrix: SymmetricMatrix,
    vectors: Vec<FeatureVector>,
    threshold: Threshold,
    // αᵀKα, constant for the lifetime of the model
    alpha_k_alpha: f64,
}

impl TrainedModel {
    /// Assemble a model from its parts, validating that the shapes agree.
    ///
    /// `alphas`, `kernel_matrix` and `vectors` must all describe the same
    /// number of training vectors, and `threshold` must be the kind used by
    /// `method`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: impl Into<String>,
        method: Method,
        nu: f64,
        tolerance: f64,
        kernel: Kernel,
        alphas: Vec<f64>,
        kernel_matrix: SymmetricMatrix,
        vectors: Vec<FeatureVector>,
        threshold: Threshold,
    ) -> Result<Self> {
        let n = kernel_matrix.size();
        if alphas.len() != n || vectors.len() != n {
            return Err(OcsvmError::InvalidMatrixShape(format!(
                "{} coefficients and {} training vectors for a {n}x{n} kernel matrix",
                alphas.len(),
                vectors.len()
            )));
        }
        if let Some(dim) = vectors.first().map(FeatureVector::dim) {
            if let Some(bad) = vectors.iter().find(|v| v.dim() != dim) {
                return Err(OcsvmError::DimensionMismatch {
                    expected: dim,
                    actual: bad.dim(),
                });
            }
        }
        if threshold.method() != method {
            return Err(OcsvmError::InvalidParameter(format!(
                "{method} model cannot use a {} threshold",
                threshold.method()
            )));
        }

        let alpha_k_alpha = kernel_matrix.quadratic_form(&alphas);
        Ok(Self {
            id: id.into(),
            method,
            nu,
            tolerance,
            kernel,
            alphas,
            kernel_matrix,
            vectors,
            threshold,
            alpha_k_alpha,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Regularization parameter ν
    pub fn nu(&self) -> f64 {
        self.nu
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Dual coefficients, one per training vector
    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    pub fn kernel_matrix(&self) -> &SymmetricMatrix {
        &self.kernel_matrix
    }

    /// Training vectors, in the order the coefficients refer to
    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Cached αᵀKα
    pub fn alpha_k_alpha(&self) -> f64 {
        self.alpha_k_alpha
    }

    /// Number of training vectors kept by the model
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimensionality of the training vectors
    pub fn dim(&self) -> usize {
        self.vectors.first().map_or(0, FeatureVector::dim)
    }

    /// Indices of training vectors with a positive coefficient
    pub fn support_vector_indices(&self) -> Vec<usize> {
        self.alphas
            .iter()
            .enumerate()
            .filter(|(_, &alpha)| alpha > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of support vectors strictly inside the box (0 < α < c)
    pub fn free_support_vector_indices(&self) -> Vec<usize> {
        free_indices(&self.alphas, self.method.box_bound(self.nu))
    }
}

pub(crate) fn free_indices(alphas: &[f64], c: f64) -> Vec<usize> {
    alphas
        .iter()
        .enumerate()
        .filter(|(_, &alpha)| alpha > 0.0 && alpha < c)
        .map(|(i, _)| i)
        .collect()
}
