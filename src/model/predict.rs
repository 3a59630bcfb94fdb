//! Scoring rules for trained models
//!
//! Schölkopf: score = Σ α_i K(x_i, x) - rho, outlier when score < 0.
//!
//! Tax and Duin: score = ‖x‖² - 2 Σ α_i K(x, x_i) + αᵀKα - r², outlier
//! when score > 0.

use crate::core::{Detector, FeatureVector, Label, OcsvmError, PredictionResult, Result};
use crate::kernel::KernelFunction;
use crate::model::{Threshold, TrainedModel};

impl TrainedModel {
    /// Σ α_i K(x_i, x) over all training vectors
    pub fn kernel_expansion(&self, x: &[f64]) -> f64 {
        self.alphas()
            .iter()
            .zip(self.vectors())
            .map(|(alpha, sv)| alpha * self.kernel().compute(&sv.values, x))
            .sum()
    }

    /// Raw score of `vector` under the model's method
    pub fn decision_value(&self, vector: &FeatureVector) -> Result<f64> {
        if vector.dim() != self.dim() {
            return Err(OcsvmError::DimensionMismatch {
                expected: self.dim(),
                actual: vector.dim(),
            });
        }

        let x = &vector.values;
        let score = match self.threshold() {
            Threshold::Rho(rho) => self.kernel_expansion(x) - rho,
            Threshold::SquaredRadius(r2) => {
                vector.norm_squared() - 2.0 * self.kernel_expansion(x) + self.alpha_k_alpha() - r2
            }
        };
        Ok(score)
    }

    /// Label implied by a raw score
    pub fn label_for(&self, score: f64) -> Label {
        let outlier = match self.threshold() {
            Threshold::Rho(_) => score < 0.0,
            Threshold::SquaredRadius(_) => score > 0.0,
        };
        if outlier {
            Label::Outlier
        } else {
            Label::Normal
        }
    }
}

impl Detector for TrainedModel {
    fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult> {
        let score = self.decision_value(vector)?;
        Ok(PredictionResult::new(vector, score, self.label_for(score)))
    }

    fn n_support_vectors(&self) -> usize {
        self.support_vector_indices().len()
    }
}
