//! Linear kernel implementation

use crate::kernel::KernelFunction;
use crate::utils::linalg::inner_product;

/// Linear kernel: K(x, y) = x^T * y
///
/// This is the simplest kernel function, computing the inner product of the two vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl KernelFunction for LinearKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        inner_product(x, y)
    }
}
