//! High-level API for one-class SVM operations
//!
//! This module provides a builder front-end over [`OneClassTrainer`],
//! leave-one-out cross-validation, TPR/TNR metrics and a parameter grid
//! search.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ocsvm::api::OneClassSvm;
//! use ocsvm::kernel::Kernel;
//! use ocsvm::model::Method;
//! use ocsvm::Detector;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = OneClassSvm::new()
//!     .with_nu(0.1)
//!     .with_method(Method::Scholkopf)
//!     .with_kernel(Kernel::gaussian(0.5)?)
//!     .train_from_file("normal.tsv", false)?;
//!
//! let dataset = ocsvm::VectorDataset::from_file("test.tsv", false)?;
//! for result in model.predict_batch(ocsvm::Dataset::vectors(&dataset))? {
//!     println!("{}\t{}\t{:.6}", result.id, result.label, result.score);
//! }
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Dataset, Detector, FeatureVector, Label, OcsvmError, PredictionResult, Result, SolverConfig,
    NORMAL_LABEL, OUTLIER_LABEL,
};
use crate::data::VectorDataset;
use crate::kernel::Kernel;
use crate::model::{Method, OneClassTrainer, TrainedModel};
use log::{debug, warn};
use std::path::Path;

/// One-class SVM builder
#[derive(Debug, Clone)]
pub struct OneClassSvm {
    id: String,
    nu: f64,
    method: Method,
    kernel: Kernel,
    config: SolverConfig,
}

impl OneClassSvm {
    /// Scholkopf method with a Gaussian kernel (sigma 0.3) and nu = 0.1
    pub fn new() -> Self {
        Self {
            id: "ocsvm".to_string(),
            nu: 0.1,
            method: Method::default(),
            kernel: Kernel::Gaussian(Default::default()),
            config: SolverConfig::default(),
        }
    }

    /// Set the model identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set regularization parameter nu
    pub fn with_nu(mut self, nu: f64) -> Self {
        self.nu = nu;
        self
    }

    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set maximum number of solver iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn nu(&self) -> f64 {
        self.nu
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Untrained trainer with the builder's settings
    pub fn trainer(&self) -> Result<OneClassTrainer> {
        OneClassTrainer::with_config(
            self.id.clone(),
            self.nu,
            self.method,
            self.kernel,
            self.config.clone(),
        )
    }

    /// Train on feature vectors; outlier-labeled vectors are ignored
    pub fn train(&self, vectors: &[FeatureVector]) -> Result<TrainedModel> {
        let mut trainer = self.trainer()?;
        trainer.train(vectors)?;
        trainer.into_trained_model()
    }

    /// Train on a dataset
    pub fn train_dataset<D: Dataset>(&self, dataset: &D) -> Result<TrainedModel> {
        self.train(dataset.vectors())
    }

    /// Train from a delimited text file
    pub fn train_from_file<P: AsRef<Path>>(&self, path: P, has_id: bool) -> Result<TrainedModel> {
        let dataset = VectorDataset::from_file(path, has_id)?;
        self.train_dataset(&dataset)
    }

    /// Leave-one-out cross-validation.
    ///
    /// Each vector is held out in turn, a model is trained on the rest and
    /// the held-out vector is scored. Results keep the input order.
    pub fn leave_one_out(&self, vectors: &[FeatureVector]) -> Result<Vec<PredictionResult>> {
        let mut trainer = self.trainer()?;
        let mut results = Vec::with_capacity(vectors.len());

        for (held_out, vector) in vectors.iter().enumerate() {
            let rest: Vec<FeatureVector> = vectors
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != held_out)
                .map(|(_, v)| v.clone())
                .collect();

            trainer.train(&rest)?;
            results.push(trainer.predict(vector)?);
            trainer.reset();
        }

        Ok(results)
    }

    /// TPR and TNR of leave-one-out cross-validation
    pub fn cross_validate(&self, vectors: &[FeatureVector]) -> Result<EvaluationMetrics> {
        let results = self.leave_one_out(vectors)?;
        Ok(EvaluationMetrics::from_results(&results))
    }

    /// Sweep nu and the kernel parameters, scoring each combination by
    /// the mean of TPR and TNR from leave-one-out cross-validation.
    ///
    /// Combinations that cannot be trained are skipped. The first best
    /// combination wins ties.
    pub fn grid_search(&self, vectors: &[FeatureVector], grid: &ParameterGrid) -> Result<GridSearchResult> {
        let expected = self.kernel.kind().param_count();
        if grid.kernel_params.len() != expected {
            return Err(OcsvmError::InvalidKernelParams {
                kernel: self.kernel.kind().name().to_string(),
                expected,
                actual: grid.kernel_params.len(),
            });
        }

        let nu_values = grid.nu.values()?;
        let kernel_values = grid
            .kernel_params
            .iter()
            .map(ParamRange::values)
            .collect::<Result<Vec<_>>>()?;

        let mut best: Option<GridSearchResult> = None;
        let mut evaluated = 0;

        for &nu in &nu_values {
            for params in cartesian_product(&kernel_values) {
                let kernel = match self.kernel.with_params(&params) {
                    Ok(kernel) => kernel,
                    Err(e) => {
                        warn!("Skipping kernel parameters {params:?}: {e}");
                        continue;
                    }
                };
                let candidate = self.clone().with_nu(nu).with_kernel(kernel);
                let metrics = match candidate.cross_validate(vectors) {
                    Ok(metrics) => metrics,
                    Err(e) => {
                        warn!("Skipping nu={nu}, kernel={kernel}: {e}");
                        continue;
                    }
                };
                evaluated += 1;

                let score = metrics.balanced_accuracy();
                debug!("nu={nu}, kernel={kernel}: tpr={:.4}, tnr={:.4}", metrics.tpr(), metrics.tnr());

                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(GridSearchResult {
                        nu,
                        kernel,
                        score,
                        metrics,
                        evaluated: 0,
                    });
                }
            }
        }

        match best {
            Some(mut result) => {
                result.evaluated = evaluated;
                Ok(result)
            }
            None => Err(OcsvmError::InvalidParameter(
                "no parameter combination could be evaluated".to_string(),
            )),
        }
    }
}

impl Default for OneClassSvm {
    fn default() -> Self {
        Self::new()
    }
}

/// Confusion counts over results whose true label is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
}

impl EvaluationMetrics {
    /// Count results labeled "1" (positives) and "-1" (negatives); other labels are ignored
    pub fn from_results(results: &[PredictionResult]) -> Self {
        let mut metrics = Self::default();
        for result in results {
            match (result.true_label.as_deref(), result.label) {
                (Some(NORMAL_LABEL), Label::Normal) => metrics.true_positives += 1,
                (Some(NORMAL_LABEL), Label::Outlier) => metrics.false_negatives += 1,
                (Some(OUTLIER_LABEL), Label::Outlier) => metrics.true_negatives += 1,
                (Some(OUTLIER_LABEL), Label::Normal) => metrics.false_positives += 1,
                _ => {}
            }
        }
        metrics
    }

    /// TP / (TP + FN), 0 when there are no normal vectors
    pub fn tpr(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// TN / (TN + FP), 0 when there are no outlier vectors
    pub fn tnr(&self) -> f64 {
        ratio(self.true_negatives, self.true_negatives + self.false_positives)
    }

    /// (TP + TN) / total
    pub fn accuracy(&self) -> f64 {
        ratio(
            self.true_positives + self.true_negatives,
            self.true_positives + self.true_negatives + self.false_positives + self.false_negatives,
        )
    }

    /// Mean of TPR and TNR
    pub fn balanced_accuracy(&self) -> f64 {
        (self.tpr() + self.tnr()) / 2.0
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Upper bound on the number of values a single [`ParamRange`] may produce
pub const MAX_RANGE_VALUES: usize = 10_000;

/// Inclusive `start..=end` sweep with a fixed step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl ParamRange {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// A range holding a single value
    pub fn fixed(value: f64) -> Self {
        Self::new(value, value, 1.0)
    }

    /// Values of the sweep; `end` is included when it lies on the grid
    pub fn values(&self) -> Result<Vec<f64>> {
        if self.step.is_nan() || self.step <= 0.0 || !self.start.is_finite() || !self.end.is_finite() || self.start > self.end {
            return Err(OcsvmError::InvalidParameter(format!(
                "invalid range {}..={} step {}",
                self.start, self.end, self.step
            )));
        }

        let steps = ((self.end - self.start) / self.step + 1e-9).floor();
        if steps >= MAX_RANGE_VALUES as f64 {
            return Err(OcsvmError::InvalidParameter(format!(
                "range {}..={} step {} has more than {MAX_RANGE_VALUES} values",
                self.start, self.end, self.step
            )));
        }

        // Values are computed from the index to avoid accumulating rounding error
        let slack = self.step * 1e-9;
        Ok((0..=steps as usize + 1)
            .map(|k| self.start + k as f64 * self.step)
            .take_while(|&value| value <= self.end + slack)
            .collect())
    }
}

/// Parameter sweep for [`OneClassSvm::grid_search`]
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    pub nu: ParamRange,
    /// One range per kernel parameter, in family order
    pub kernel_params: Vec<ParamRange>,
}

/// Best combination found by a grid search
#[derive(Debug, Clone, PartialEq)]
pub struct GridSearchResult {
    pub nu: f64,
    pub kernel: Kernel,
    /// Mean of TPR and TNR
    pub score: f64,
    pub metrics: EvaluationMetrics,
    /// Number of combinations that could be evaluated
    pub evaluated: usize,
}

fn cartesian_product(axes: &[Vec<f64>]) -> Vec<Vec<f64>> {
    axes.iter().fold(vec![Vec::new()], |acc, axis| {
        acc.iter()
            .flat_map(|prefix| {
                axis.iter().map(move |&value| {
                    let mut combination = prefix.clone();
                    combination.push(value);
                    combination
                })
            })
            .collect()
    })
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a Scholkopf model with a Gaussian kernel on a delimited file
    pub fn train_gaussian<P: AsRef<Path>>(path: P, nu: f64, sigma: f64) -> Result<TrainedModel> {
        OneClassSvm::new()
            .with_nu(nu)
            .with_kernel(Kernel::gaussian(sigma)?)
            .train_from_file(path, false)
    }

    /// Train on one file and score every vector of another
    pub fn train_and_predict<P1: AsRef<Path>, P2: AsRef<Path>>(
        train_path: P1,
        test_path: P2,
        svm: &OneClassSvm,
    ) -> Result<Vec<PredictionResult>> {
        let model = svm.train_from_file(train_path, false)?;
        let test = VectorDataset::from_file(test_path, false)?;
        model.predict_batch(test.vectors())
    }
}
