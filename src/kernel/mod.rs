//! Kernel functions for one-class SVM
//!
//! Each family lives in its own module and implements [`KernelFunction`].
//! [`Kernel`] is the value object the trainer works with: a family tag
//! plus its ordered parameter list, validated on construction.

pub mod gaussian;
pub mod linear;
pub mod polynomial;
pub mod sigmoid;
pub mod traits;

pub use self::gaussian::*;
pub use self::linear::*;
pub use self::polynomial::*;
pub use self::sigmoid::*;
pub use self::traits::*;

use crate::core::{FeatureVector, OcsvmError, Result};
use crate::matrix::SymmetricMatrix;
use std::fmt;
use std::str::FromStr;

/// Kernel family tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelType {
    Linear,
    Polynomial,
    Gaussian,
    Sigmoid,
}

impl KernelType {
    /// Number of parameters the family takes
    pub fn param_count(&self) -> usize {
        match self {
            KernelType::Linear => 0,
            KernelType::Polynomial => 2,
            KernelType::Gaussian => 1,
            KernelType::Sigmoid => 2,
        }
    }

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            KernelType::Linear => "linear",
            KernelType::Polynomial => "polynomial",
            KernelType::Gaussian => "gaussian",
            KernelType::Sigmoid => "sigmoid",
        }
    }

    /// Parameters used when none are given
    pub fn default_params(&self) -> Vec<f64> {
        match self {
            KernelType::Linear => Vec::new(),
            KernelType::Polynomial => {
                let kernel = PolynomialKernel::default();
                vec![kernel.constant, kernel.power]
            }
            KernelType::Gaussian => vec![GaussianKernel::default().sigma()],
            KernelType::Sigmoid => vec![1.0, 0.0],
        }
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelType {
    type Err = OcsvmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "linear kernel" => Ok(KernelType::Linear),
            "polynomial" | "poly" | "polynomial kernel" => Ok(KernelType::Polynomial),
            "gaussian" | "rbf" | "gaussian kernel" => Ok(KernelType::Gaussian),
            "sigmoid" | "tanh" | "sigmoid kernel" => Ok(KernelType::Sigmoid),
            other => Err(OcsvmError::InvalidParameter(format!(
                "unknown kernel type: {other}"
            ))),
        }
    }
}

/// A kernel family together with its parameters
///
/// Parameter order per family:
/// - linear: none
/// - polynomial: constant, power
/// - gaussian: sigma
/// - sigmoid: scale, offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    Linear(LinearKernel),
    Polynomial(PolynomialKernel),
    Gaussian(GaussianKernel),
    Sigmoid(SigmoidKernel),
}

impl Kernel {
    /// Build a kernel from its family tag and ordered parameter list
    ///
    /// # Examples
    /// ```
    /// use ocsvm::kernel::{Kernel, KernelType};
    ///
    /// let kernel = Kernel::new(KernelType::Gaussian, &[0.5]).unwrap();
    /// assert_eq!(kernel.evaluate(&[1.0, 2.0], &[1.0, 2.0]), 1.0);
    /// assert!(Kernel::new(KernelType::Gaussian, &[0.5, 1.0]).is_err());
    /// ```
    pub fn new(kind: KernelType, params: &[f64]) -> Result<Self> {
        let expected = kind.param_count();
        if params.len() != expected {
            return Err(OcsvmError::InvalidKernelParams {
                kernel: kind.name().to_string(),
                expected,
                actual: params.len(),
            });
        }
        if let Some(bad) = params.iter().find(|p| !p.is_finite()) {
            return Err(OcsvmError::InvalidParameter(format!(
                "{kind} kernel parameter must be finite, got {bad}"
            )));
        }

        let kernel = match kind {
            KernelType::Linear => Kernel::Linear(LinearKernel::new()),
            KernelType::Polynomial => Kernel::Polynomial(PolynomialKernel::new(params[0], params[1])),
            KernelType::Gaussian => {
                if params[0] <= 0.0 {
                    return Err(OcsvmError::InvalidParameter(format!(
                        "gaussian sigma must be positive, got {}",
                        params[0]
                    )));
                }
                Kernel::Gaussian(GaussianKernel::new(params[0]))
            }
            KernelType::Sigmoid => Kernel::Sigmoid(SigmoidKernel::new(params[0], params[1])),
        };

        Ok(kernel)
    }

    /// Linear kernel
    pub fn linear() -> Self {
        Kernel::Linear(LinearKernel::new())
    }

    /// Gaussian kernel with bandwidth `sigma`
    pub fn gaussian(sigma: f64) -> Result<Self> {
        Self::new(KernelType::Gaussian, &[sigma])
    }

    /// Polynomial kernel (<x, y> + constant)^power
    pub fn polynomial(constant: f64, power: f64) -> Result<Self> {
        Self::new(KernelType::Polynomial, &[constant, power])
    }

    /// Sigmoid kernel tanh(scale * <x, y> + offset)
    pub fn sigmoid(scale: f64, offset: f64) -> Result<Self> {
        Self::new(KernelType::Sigmoid, &[scale, offset])
    }

    /// Family tag
    pub fn kind(&self) -> KernelType {
        match self {
            Kernel::Linear(_) => KernelType::Linear,
            Kernel::Polynomial(_) => KernelType::Polynomial,
            Kernel::Gaussian(_) => KernelType::Gaussian,
            Kernel::Sigmoid(_) => KernelType::Sigmoid,
        }
    }

    /// Ordered parameter list
    pub fn params(&self) -> Vec<f64> {
        match self {
            Kernel::Linear(_) => Vec::new(),
            Kernel::Polynomial(k) => vec![k.constant, k.power],
            Kernel::Gaussian(k) => vec![k.sigma()],
            Kernel::Sigmoid(k) => vec![k.scale, k.offset],
        }
    }

    /// Same family with different parameters
    pub fn with_params(&self, params: &[f64]) -> Result<Self> {
        Self::new(self.kind(), params)
    }

    /// Evaluate K(x, y)
    pub fn evaluate(&self, x: &[f64], y: &[f64]) -> f64 {
        self.compute(x, y)
    }

    /// Kernel matrix over `vectors`, K[i][j] = K(vectors[i], vectors[j])
    pub fn matrix(&self, vectors: &[FeatureVector]) -> Result<SymmetricMatrix> {
        SymmetricMatrix::from_fn(vectors.len(), |i, j| {
            self.compute(&vectors[i].values, &vectors[j].values)
        })
    }
}

impl KernelFunction for Kernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            Kernel::Linear(k) => k.compute(x, y),
            Kernel::Polynomial(k) => k.compute(x, y),
            Kernel::Gaussian(k) => k.compute(x, y),
            Kernel::Sigmoid(k) => k.compute(x, y),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        for param in self.params() {
            write!(f, " {param}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kernels() -> Vec<Kernel> {
        vec![
            Kernel::linear(),
            Kernel::polynomial(1.0, 3.0).unwrap(),
            Kernel::gaussian(0.5).unwrap(),
            Kernel::sigmoid(0.2, -0.1).unwrap(),
        ]
    }

    #[test]
    fn test_param_count_validation() {
        assert!(Kernel::new(KernelType::Linear, &[]).is_ok());
        assert!(matches!(
            Kernel::new(KernelType::Linear, &[1.0]),
            Err(OcsvmError::InvalidKernelParams {
                expected: 0,
                actual: 1,
                ..
            })
        ));
        assert!(matches!(
            Kernel::new(KernelType::Polynomial, &[1.0]),
            Err(OcsvmError::InvalidKernelParams {
                expected: 2,
                actual: 1,
                ..
            })
        ));
        assert!(matches!(
            Kernel::new(KernelType::Gaussian, &[]),
            Err(OcsvmError::InvalidKernelParams { .. })
        ));
        assert!(matches!(
            Kernel::new(KernelType::Sigmoid, &[1.0, 2.0, 3.0]),
            Err(OcsvmError::InvalidKernelParams { .. })
        ));
    }

    #[test]
    fn test_invalid_gaussian_sigma() {
        assert!(matches!(
            Kernel::gaussian(0.0),
            Err(OcsvmError::InvalidParameter(_))
        ));
        assert!(matches!(
            Kernel::gaussian(f64::NAN),
            Err(OcsvmError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_kind_and_params_roundtrip() {
        for kernel in all_kernels() {
            let rebuilt = Kernel::new(kernel.kind(), &kernel.params()).unwrap();
            assert_eq!(rebuilt, kernel);
        }
    }

    #[test]
    fn test_with_params_keeps_family() {
        let kernel = Kernel::gaussian(0.5).unwrap();
        let swept = kernel.with_params(&[2.0]).unwrap();
        assert_eq!(swept.kind(), KernelType::Gaussian);
        assert_eq!(swept.params(), vec![2.0]);
    }

    #[test]
    fn test_default_params_are_valid() {
        for kind in [
            KernelType::Linear,
            KernelType::Polynomial,
            KernelType::Gaussian,
            KernelType::Sigmoid,
        ] {
            let params = kind.default_params();
            assert_eq!(params.len(), kind.param_count());
            assert!(Kernel::new(kind, &params).is_ok());
        }
        assert_eq!(KernelType::Gaussian.default_params(), vec![0.3]);
    }

    #[test]
    fn test_kernel_type_parsing() {
        assert_eq!("linear".parse::<KernelType>().unwrap(), KernelType::Linear);
        assert_eq!("RBF".parse::<KernelType>().unwrap(), KernelType::Gaussian);
        assert_eq!(
            "GAUSSIAN KERNEL".parse::<KernelType>().unwrap(),
            KernelType::Gaussian
        );
        assert_eq!("poly".parse::<KernelType>().unwrap(), KernelType::Polynomial);
        assert_eq!("sigmoid".parse::<KernelType>().unwrap(), KernelType::Sigmoid);
        assert!(matches!(
            "chi2".parse::<KernelType>(),
            Err(OcsvmError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_kernel_symmetry_all_families() {
        let x = [0.3, -1.2, 2.5];
        let y = [1.7, 0.4, -0.6];
        for kernel in all_kernels() {
            assert_eq!(kernel.evaluate(&x, &y), kernel.evaluate(&y, &x), "{kernel}");
        }
    }

    #[test]
    fn test_kernel_is_deterministic() {
        let x = [0.1, 0.2];
        let y = [0.3, 0.4];
        for kernel in all_kernels() {
            assert_eq!(kernel.evaluate(&x, &y), kernel.evaluate(&x, &y));
        }
    }

    #[test]
    fn test_kernel_matrix() {
        let vectors = vec![
            FeatureVector::unlabeled("0", vec![1.0, 0.0]),
            FeatureVector::unlabeled("1", vec![0.0, 1.0]),
            FeatureVector::unlabeled("2", vec![1.0, 1.0]),
        ];
        let matrix = Kernel::linear().matrix(&vectors).unwrap();

        assert_eq!(matrix.size(), 3);
        assert_eq!(matrix.get(0, 0), 1.0);
        assert_eq!(matrix.get(0, 1), 0.0);
        assert_eq!(matrix.get(2, 0), 1.0);
        assert_eq!(matrix.get(2, 2), 2.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Kernel::linear().to_string(), "linear");
        assert_eq!(Kernel::gaussian(0.5).unwrap().to_string(), "gaussian 0.5");
    }
}
