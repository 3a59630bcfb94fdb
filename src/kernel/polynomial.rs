//! Polynomial kernel implementation
//!
//! K(x, y) = (<x, y> + c)^p
//!
//! where c is a constant offset and p the power. The power is a real
//! number; integer powers are evaluated with `powi` for accuracy.

use crate::kernel::KernelFunction;
use crate::utils::linalg::inner_product;

/// Polynomial kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialKernel {
    /// Constant added to the inner product
    pub constant: f64,
    /// Power applied to the shifted inner product
    pub power: f64,
}

impl PolynomialKernel {
    /// Creates a new polynomial kernel (<x, y> + constant)^power
    ///
    /// # Examples
    /// ```
    /// use ocsvm::kernel::{KernelFunction, PolynomialKernel};
    ///
    /// let kernel = PolynomialKernel::new(1.0, 2.0);
    /// assert_eq!(kernel.compute(&[1.0, 2.0], &[3.0, 4.0]), 144.0);
    /// ```
    pub fn new(constant: f64, power: f64) -> Self {
        Self { constant, power }
    }
}

impl Default for PolynomialKernel {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl KernelFunction for PolynomialKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        let base = inner_product(x, y) + self.constant;
        if self.power.fract() == 0.0 && self.power.abs() <= i32::MAX as f64 {
            base.powi(self.power as i32)
        } else {
            base.powf(self.power)
        }
    }
}
