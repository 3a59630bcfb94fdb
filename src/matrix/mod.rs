//! Packed symmetric matrix
//!
//! Kernel matrices are symmetric, so only entries K(i,j) with i <= j are
//! stored, row by row, in a flat buffer of length n(n+1)/2.

use crate::core::{OcsvmError, Result};

/// Symmetric n×n matrix backed by its upper triangle
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricMatrix {
    size: usize,
    data: Vec<f64>,
}

impl SymmetricMatrix {
    /// Build from a full square matrix, keeping only the upper triangle
    pub fn new(matrix: &[Vec<f64>]) -> Result<Self> {
        let size = matrix.len();
        if size == 0 {
            return Err(OcsvmError::InvalidMatrixShape(
                "matrix must not be empty".to_string(),
            ));
        }
        if let Some((row, values)) = matrix.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(OcsvmError::InvalidMatrixShape(format!(
                "row {row} has {} columns, expected {size}",
                values.len()
            )));
        }

        let mut data = Vec::with_capacity(packed_len(size));
        for (i, row) in matrix.iter().enumerate() {
            data.extend_from_slice(&row[i..]);
        }

        Ok(Self { size, data })
    }

    /// Build by evaluating `f(i, j)` for every i <= j
    pub fn from_fn<F>(size: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f64,
    {
        if size == 0 {
            return Err(OcsvmError::InvalidMatrixShape(
                "matrix must not be empty".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(packed_len(size));
        for i in 0..size {
            for j in i..size {
                data.push(f(i, j));
            }
        }

        Ok(Self { size, data })
    }

    /// Rebuild from a packed upper triangle (as returned by [`Self::packed`])
    pub fn from_packed(size: usize, data: Vec<f64>) -> Result<Self> {
        if size == 0 || data.len() != packed_len(size) {
            return Err(OcsvmError::InvalidMatrixShape(format!(
                "packed buffer of length {} does not describe a non-empty {size}x{size} matrix",
                data.len()
            )));
        }
        Ok(Self { size, data })
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entry (i, j)
    ///
    /// # Panics
    /// Panics if i or j >= size()
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.index(i, j)]
    }

    /// Overwrite entry (i, j), which is also entry (j, i)
    ///
    /// # Panics
    /// Panics if i or j >= size()
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let index = self.index(i, j);
        self.data[index] = value;
    }

    /// Materialize row i
    pub fn row(&self, i: usize) -> Vec<f64> {
        (0..self.size).map(|j| self.get(i, j)).collect()
    }

    /// Packed upper triangle, row-major
    pub fn packed(&self) -> &[f64] {
        &self.data
    }

    /// Expand into a full square matrix
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        (0..self.size).map(|i| self.row(i)).collect()
    }

    /// Quadratic form αᵀMα
    pub fn quadratic_form(&self, alphas: &[f64]) -> f64 {
        let mut sum = 0.0;
        for (i, &alpha_i) in alphas.iter().enumerate() {
            for (j, &alpha_j) in alphas.iter().enumerate() {
                sum += alpha_i * alpha_j * self.get(i, j);
            }
        }
        sum
    }

    fn index(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        assert!(j < self.size, "index ({i}, {j}) out of bounds for size {}", self.size);
        i * self.size - i * (i + 1) / 2 + j
    }
}

fn packed_len(size: usize) -> usize {
    size * (size + 1) / 2
}
