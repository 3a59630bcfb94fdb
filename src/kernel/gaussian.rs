//! Gaussian (RBF) kernel implementation
//!
//! The Gaussian kernel is defined as: K(x, y) = exp(-||x - y||² / (2σ²))
//! where σ (sigma) is the bandwidth.

use crate::kernel::KernelFunction;
use crate::utils::linalg::squared_euclidean_distance;

/// Gaussian kernel: K(x, y) = exp(-||x - y||² / (2σ²))
///
/// The bandwidth controls the "reach" of each training vector:
/// - Small sigma: only close points are similar (tight boundary)
/// - Large sigma: distant points still contribute (smooth boundary)
///
/// K(x, x) is always 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel {
    sigma: f64,
}

impl GaussianKernel {
    /// Create a new Gaussian kernel with bandwidth `sigma`
    ///
    /// Validation of `sigma` happens in [`crate::kernel::Kernel::new`].
    pub fn new(sigma: f64) -> Self {
        Self { sigma }
    }

    /// Get the bandwidth
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl KernelFunction for GaussianKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        let squared_distance = squared_euclidean_distance(x, y);
        (-squared_distance / (2.0 * self.sigma * self.sigma)).exp()
    }
}
