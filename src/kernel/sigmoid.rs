//! Sigmoid (Tanh) Kernel Implementation
//!
//! K(x, y) = tanh(c * <x, y> + θ)
//!
//! where c scales the inner product and θ shifts it. Output always lies
//! in [-1, 1]. The kernel is not positive semi-definite for every choice
//! of parameters, which the solver tolerates through its curvature floor.

use crate::kernel::KernelFunction;
use crate::utils::linalg::inner_product;

/// Sigmoid (hyperbolic tangent) kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidKernel {
    /// Scaling applied to the inner product
    pub scale: f64,
    /// Offset added after scaling
    pub offset: f64,
}

impl SigmoidKernel {
    /// Creates a new sigmoid kernel tanh(scale * <x, y> + offset)
    ///
    /// # Examples
    /// ```
    /// use ocsvm::kernel::{KernelFunction, SigmoidKernel};
    ///
    /// let kernel = SigmoidKernel::new(1.0, 0.0);
    /// assert_eq!(kernel.compute(&[0.0], &[5.0]), 0.0);
    /// ```
    pub fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }
}

impl KernelFunction for SigmoidKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (self.scale * inner_product(x, y) + self.offset).tanh()
    }
}
