//! Decomposition solver with second-order working set selection (WSS3)
//!
//! Solves the one-class dual problem
//!
//! ```text
//! min ½ αᵀKα   subject to   0 ≤ α ≤ c,  Σα fixed by the initial point
//! ```
//!
//! by repeatedly picking the pair (i, j) of maximal second-order gain
//! (R. Fan et al., "Working Set Selection Using Second Order Information
//! for Training Support Vector Machines") and optimizing it analytically.
//! Every training vector carries the same label, so the pair update keeps
//! α_i + α_j constant.

use crate::core::{OcsvmError, Result, SolverConfig};
use crate::matrix::SymmetricMatrix;
use crate::utils::linalg::inner_product;
use log::{debug, info, warn};

/// Result of a solver run
#[derive(Debug, Clone)]
pub struct SolverResult {
    /// Dual coefficients
    pub alphas: Vec<f64>,
    /// Gradient Kα at the final point
    pub gradients: Vec<f64>,
    /// Number of pair updates performed
    pub iterations: usize,
    /// Whether the KKT gap fell below the tolerance (false when the cap was hit)
    pub converged: bool,
    /// Final objective value ½ αᵀKα
    pub objective_value: f64,
}

/// Initial dual coefficients for a target fraction `nu` of `n` vectors.
///
/// With vl = nu·n, the first ⌊vl⌋ coefficients are 1, the next one takes
/// the fractional remainder vl - ⌊vl⌋ and the rest are 0, so Σα = vl.
/// With `normalize` every coefficient is divided by vl, so Σα = 1.
pub fn initial_alphas(nu: f64, n: usize, normalize: bool) -> Vec<f64> {
    let vl = nu * n as f64;
    let whole = vl.floor();
    let mut alphas: Vec<f64> = (0..n)
        .map(|i| {
            let i = i as f64;
            if i < whole {
                1.0
            } else if i < whole + 1.0 {
                vl - whole
            } else {
                0.0
            }
        })
        .collect();

    if normalize {
        for alpha in alphas.iter_mut() {
            *alpha /= vl;
        }
    }
    alphas
}

/// Maximal KKT violation m(α) - M(α) at the point described by `alphas`/`gradients`.
///
/// m(α) is the largest -G over coefficients that may still grow (α < c),
/// M(α) the smallest -G over coefficients that may shrink (α > 0). The
/// point is optimal within `tolerance` when the result is below it.
pub fn kkt_gap(c: f64, alphas: &[f64], gradients: &[f64]) -> f64 {
    let mut gradient_max = f64::NEG_INFINITY;
    let mut gradient_min = f64::INFINITY;
    for (&alpha, &gradient) in alphas.iter().zip(gradients) {
        if alpha < c {
            gradient_max = gradient_max.max(-gradient);
        }
        if alpha > 0.0 {
            gradient_min = gradient_min.min(-gradient);
        }
    }
    gradient_max - gradient_min
}

/// WSS3 solver over a precomputed kernel matrix
pub struct Wss3Solver<'a> {
    kernel_matrix: &'a SymmetricMatrix,
    config: SolverConfig,
}

impl<'a> Wss3Solver<'a> {
    /// Create a new solver over `kernel_matrix`
    pub fn new(kernel_matrix: &'a SymmetricMatrix, config: SolverConfig) -> Self {
        Self {
            kernel_matrix,
            config,
        }
    }

    /// Get the solver configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Run the decomposition method from the feasible starting point `alphas`
    /// with box bound `c`.
    pub fn solve(&self, c: f64, mut alphas: Vec<f64>) -> Result<SolverResult> {
        let n = self.kernel_matrix.size();
        if n < 2 {
            return Err(OcsvmError::InsufficientTrainingData(n));
        }
        if alphas.len() != n {
            return Err(OcsvmError::InvalidMatrixShape(format!(
                "{} coefficients for a {n}x{n} kernel matrix",
                alphas.len()
            )));
        }

        debug!("WSS3: n={n}, c={c}, tolerance={}", self.config.tolerance);

        let mut gradients: Vec<f64> = (0..n)
            .map(|i| inner_product(&self.kernel_matrix.row(i), &alphas))
            .collect();

        let mut iterations = 0;
        let converged = loop {
            if iterations >= self.config.max_iterations {
                warn!(
                    "WSS3 reached the iteration cap ({}) before convergence",
                    self.config.max_iterations
                );
                break false;
            }

            match self.select_working_set(c, &alphas, &gradients) {
                Some((i, j)) => {
                    self.update_pair(c, i, j, &mut alphas, &mut gradients);
                    iterations += 1;
                }
                None => break true,
            }
        };

        if converged {
            info!("WSS3 converged after {iterations} iterations");
        }

        let objective_value = 0.5 * inner_product(&alphas, &gradients);

        Ok(SolverResult {
            alphas,
            gradients,
            iterations,
            converged,
            objective_value,
        })
    }

    /// Select the working pair, or `None` once the KKT gap is below tolerance.
    ///
    /// i maximizes -G over coefficients below c; j minimizes the
    /// second-order gain -b²/a over coefficients above 0 with b > 0.
    fn select_working_set(&self, c: f64, alphas: &[f64], gradients: &[f64]) -> Option<(usize, usize)> {
        let k = self.kernel_matrix;

        let mut i = None;
        let mut gradient_max = f64::MIN;
        for t in 0..alphas.len() {
            if alphas[t] < c {
                let gradient = -gradients[t];
                if gradient >= gradient_max {
                    i = Some(t);
                    gradient_max = gradient;
                }
            }
        }
        // Nothing can grow
        let i = i?;

        let mut j = None;
        let mut gradient_min = f64::MAX;
        let mut value_min = f64::MAX;
        for t in 0..alphas.len() {
            if alphas[t] > 0.0 {
                let b = gradient_max + gradients[t];
                let gradient = -gradients[t];
                if gradient <= gradient_min {
                    gradient_min = gradient;
                }

                if b > 0.0 {
                    let a = self.curvature(k.get(i, i), k.get(t, t), k.get(i, t));
                    let value = -(b * b) / a;
                    if value <= value_min {
                        j = Some(t);
                        value_min = value;
                    }
                }
            }
        }

        if gradient_max - gradient_min < self.config.tolerance {
            return None;
        }
        j.map(|j| (i, j))
    }

    /// Analytic update of (α_i, α_j) followed by the box projection and
    /// the incremental gradient refresh.
    fn update_pair(&self, c: f64, i: usize, j: usize, alphas: &mut [f64], gradients: &mut [f64]) {
        let k = self.kernel_matrix;
        let a = self.curvature(k.get(i, i), k.get(j, j), k.get(i, j));
        let b = -gradients[i] + gradients[j];

        let old_alpha_i = alphas[i];
        let old_alpha_j = alphas[j];
        alphas[i] += b / a;
        alphas[j] -= b / a;

        // Project back onto the box keeping α_i + α_j unchanged
        let sum = old_alpha_i + old_alpha_j;
        alphas[i] = clip(alphas[i], c);
        alphas[j] = clip(sum - alphas[i], c);
        alphas[i] = sum - alphas[j];

        let delta_alpha_i = alphas[i] - old_alpha_i;
        let delta_alpha_j = alphas[j] - old_alpha_j;
        for (t, gradient) in gradients.iter_mut().enumerate() {
            *gradient += k.get(t, i) * delta_alpha_i + k.get(t, j) * delta_alpha_j;
        }
    }

    /// K_ii + K_tt - 2K_it, floored to tau when not positive
    fn curvature(&self, k_ii: f64, k_tt: f64, k_it: f64) -> f64 {
        let a = k_ii + k_tt - 2.0 * k_it;
        if a <= 0.0 {
            self.config.tau
        } else {
            a
        }
    }
}

fn clip(value: f64, c: f64) -> f64 {
    if value > c {
        c
    } else if value < 0.0 {
        0.0
    } else {
        value
    }
}
