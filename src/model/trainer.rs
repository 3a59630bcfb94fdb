//! One-class trainer
//!
//! Drives the WSS3 solver for either formulation and derives the decision
//! threshold from the solved coefficients.

use crate::core::{
    Detector, FeatureVector, OcsvmError, PredictionResult, Result, SolverConfig,
};
use crate::kernel::Kernel;
use crate::matrix::SymmetricMatrix;
use crate::model::{free_indices, Method, Threshold, TrainedModel};
use crate::solver::{initial_alphas, SolverResult, Wss3Solver};
use crate::utils::memory::estimate_kernel_matrix_memory;
use log::debug;

/// Trainer holding the settings of one model and, once trained, the model itself
#[derive(Debug, Clone)]
pub struct OneClassTrainer {
    id: String,
    nu: f64,
    method: Method,
    kernel: Kernel,
    config: SolverConfig,
    model: Option<TrainedModel>,
}

impl OneClassTrainer {
    /// Create an untrained trainer.
    ///
    /// `nu` must lie in (0, 1] and `tolerance` must be positive.
    pub fn new(
        id: impl Into<String>,
        nu: f64,
        tolerance: f64,
        method: Method,
        kernel: Kernel,
    ) -> Result<Self> {
        let config = SolverConfig {
            tolerance,
            ..SolverConfig::default()
        };
        Self::with_config(id, nu, method, kernel, config)
    }

    /// Create an untrained trainer with a full solver configuration
    pub fn with_config(
        id: impl Into<String>,
        nu: f64,
        method: Method,
        kernel: Kernel,
        config: SolverConfig,
    ) -> Result<Self> {
        validate_nu(nu)?;
        if config.tolerance.is_nan() || config.tolerance <= 0.0 {
            return Err(OcsvmError::InvalidParameter(format!(
                "tolerance must be positive, got {}",
                config.tolerance
            )));
        }
        if config.tau.is_nan() || config.tau <= 0.0 {
            return Err(OcsvmError::InvalidParameter(format!(
                "tau must be positive, got {}",
                config.tau
            )));
        }

        Ok(Self {
            id: id.into(),
            nu,
            method,
            kernel,
            config,
            model: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
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

    /// Whether a model is currently available for prediction
    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Train on the target-class vectors of `vectors`.
    ///
    /// Vectors labeled as outliers are ignored. Any previously trained
    /// model is discarded first, so a failed run leaves the trainer untrained.
    pub fn train(&mut self, vectors: &[FeatureVector]) -> Result<&TrainedModel> {
        self.model = None;

        let targets: Vec<FeatureVector> = vectors.iter().filter(|v| v.is_target()).cloned().collect();
        let n = targets.len();
        if n < 2 {
            return Err(OcsvmError::InsufficientTrainingData(n));
        }
        let dim = targets[0].dim();
        if let Some(bad) = targets.iter().find(|v| v.dim() != dim) {
            return Err(OcsvmError::DimensionMismatch {
                expected: dim,
                actual: bad.dim(),
            });
        }
        if self.method == Method::TaxAndDuin && self.nu * (n as f64) < 1.0 {
            return Err(OcsvmError::InvalidParameter(format!(
                "tax-and-duin needs nu * n >= 1 for a feasible sphere, got nu={} with n={n}",
                self.nu
            )));
        }

        let c = self.method.box_bound(self.nu);
        debug!(
            "Training {} model '{}': n={n}, nu={}, c={c}, kernel={}, kernel matrix {} bytes",
            self.method,
            self.id,
            self.nu,
            self.kernel,
            estimate_kernel_matrix_memory(n)
        );

        let kernel_matrix = self.kernel.matrix(&targets)?;
        let alphas = initial_alphas(self.nu, n, self.method.normalizes_alphas());
        let solver = Wss3Solver::new(&kernel_matrix, self.config.clone());
        let result = solver.solve(c, alphas)?;

        let threshold = compute_threshold(self.method, c, &kernel_matrix, &result)?;
        debug!(
            "Model '{}' trained in {} iterations, threshold {:?}",
            self.id, result.iterations, threshold
        );

        let model = TrainedModel::from_parts(
            self.id.clone(),
            self.method,
            self.nu,
            self.config.tolerance,
            self.kernel,
            result.alphas,
            kernel_matrix,
            targets,
            threshold,
        )?;
        Ok(self.model.insert(model))
    }

    /// Drop the trained model; predictions fail until the next train or load
    pub fn reset(&mut self) {
        self.model = None;
    }

    /// The trained model, for persistence or inspection
    pub fn trained_model(&self) -> Result<&TrainedModel> {
        self.model.as_ref().ok_or(OcsvmError::ModelNotTrained)
    }

    /// Restore a previously trained model.
    ///
    /// The trainer adopts the model's id, method, nu, tolerance and kernel.
    pub fn load_trained_model(&mut self, model: TrainedModel) -> Result<()> {
        validate_nu(model.nu())?;
        self.id = model.id().to_string();
        self.nu = model.nu();
        self.method = model.method();
        self.kernel = *model.kernel();
        self.config.tolerance = model.tolerance();
        self.model = Some(model);
        Ok(())
    }

    /// Take the trained model out of the trainer, leaving it untrained
    pub fn into_trained_model(self) -> Result<TrainedModel> {
        self.model.ok_or(OcsvmError::ModelNotTrained)
    }
}

impl Detector for OneClassTrainer {
    fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult> {
        self.trained_model()?.predict(vector)
    }

    fn n_support_vectors(&self) -> usize {
        self.model.as_ref().map_or(0, |m| m.n_support_vectors())
    }
}

fn validate_nu(nu: f64) -> Result<()> {
    if nu > 0.0 && nu <= 1.0 {
        Ok(())
    } else {
        Err(OcsvmError::InvalidParameter(format!(
            "nu must be in (0, 1], got {nu}"
        )))
    }
}

/// rho (mean gradient over free support vectors) for Schölkopf, or
/// r² = K_kk - 2 Σ α_i K_ik + αᵀKα at the first free support vector k for Tax and Duin.
fn compute_threshold(
    method: Method,
    c: f64,
    kernel_matrix: &SymmetricMatrix,
    result: &SolverResult,
) -> Result<Threshold> {
    let free = free_indices(&result.alphas, c);
    if free.is_empty() {
        return Err(OcsvmError::DegenerateSupportSet { c });
    }

    let threshold = match method {
        Method::Scholkopf => {
            let sum: f64 = free.iter().map(|&i| result.gradients[i]).sum();
            Threshold::Rho(sum / free.len() as f64)
        }
        Method::TaxAndDuin => {
            let k = free[0];
            let cross: f64 = result
                .alphas
                .iter()
                .enumerate()
                .map(|(i, alpha)| alpha * kernel_matrix.get(i, k))
                .sum();
            let r2 = kernel_matrix.get(k, k) - 2.0 * cross + kernel_matrix.quadratic_form(&result.alphas);
            Threshold::SquaredRadius(r2)
        }
    };
    Ok(threshold)
}
