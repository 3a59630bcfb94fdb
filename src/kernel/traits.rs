//! Kernel trait definition

/// Kernel function trait
///
/// A kernel function K(x, y) computes a similarity between two dense
/// vectors of equal length. Implementations must be pure and symmetric:
/// `compute(x, y) == compute(y, x)`.
pub trait KernelFunction: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &[f64], y: &[f64]) -> f64;
}
