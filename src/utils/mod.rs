//! Utility functions for dense feature vectors

use crate::core::FeatureVector;

/// Dense vector arithmetic used by the kernels and the model scoring code
pub mod linalg {
    /// Inner product <x, y>
    ///
    /// Both slices are expected to have the same length; extra trailing
    /// coordinates of the longer one are ignored.
    pub fn inner_product(x: &[f64], y: &[f64]) -> f64 {
        x.iter().zip(y).map(|(&a, &b)| a * b).sum()
    }

    /// Squared Euclidean distance ||x - y||²
    pub fn squared_euclidean_distance(x: &[f64], y: &[f64]) -> f64 {
        x.iter()
            .zip(y)
            .map(|(&a, &b)| {
                let diff = a - b;
                diff * diff
            })
            .sum()
    }
}

/// Feature scaling utilities
pub mod scaling {
    use super::*;

    /// Feature scaling methods
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ScalingMethod {
        /// Min-max normalization to [0, 1]: (x - min) / (max - min)
        MinMax,
        /// Standard (z-score) normalization: (x - mean) / sd
        Standardize,
    }

    /// Per-coordinate statistics fitted on a base set of vectors
    #[derive(Debug, Clone)]
    pub struct ScalingParams {
        pub method: ScalingMethod,
        pub feature_stats: Vec<FeatureStats>,
    }

    /// Statistics for a single coordinate
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct FeatureStats {
        pub min: f64,
        pub max: f64,
        pub mean: f64,
        /// Population standard deviation
        pub std: f64,
    }

    impl ScalingParams {
        /// Compute scaling parameters from base vectors
        ///
        /// The dimensionality is taken from the first vector; shorter vectors
        /// simply do not contribute to the missing coordinates.
        pub fn fit(vectors: &[FeatureVector], method: ScalingMethod) -> Self {
            let dim = vectors.first().map(|v| v.dim()).unwrap_or(0);
            let mut feature_stats = Vec::with_capacity(dim);

            for index in 0..dim {
                let values: Vec<f64> = vectors
                    .iter()
                    .filter_map(|v| v.values.get(index).copied())
                    .collect();

                let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
                let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                let variance =
                    values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;

                feature_stats.push(FeatureStats {
                    min,
                    max,
                    mean,
                    std: variance.sqrt(),
                });
            }

            Self {
                method,
                feature_stats,
            }
        }

        /// Transform a single vector using fitted parameters
        pub fn transform(&self, vector: &FeatureVector) -> FeatureVector {
            let values = vector
                .values
                .iter()
                .enumerate()
                .map(|(index, &value)| match self.feature_stats.get(index) {
                    Some(stats) => self.scale_value(value, stats),
                    // Coordinate not seen in the base set - keep original value
                    None => value,
                })
                .collect();

            FeatureVector {
                id: vector.id.clone(),
                label: vector.label.clone(),
                values,
            }
        }

        /// Transform multiple vectors
        pub fn transform_all(&self, vectors: &[FeatureVector]) -> Vec<FeatureVector> {
            vectors.iter().map(|v| self.transform(v)).collect()
        }

        // Constant coordinates are passed through unchanged.
        fn scale_value(&self, value: f64, stats: &FeatureStats) -> f64 {
            match self.method {
                ScalingMethod::MinMax => {
                    if stats.max == stats.min {
                        value
                    } else {
                        (value - stats.min) / (stats.max - stats.min)
                    }
                }
                ScalingMethod::Standardize => {
                    if stats.std == 0.0 {
                        value
                    } else {
                        (value - stats.mean) / stats.std
                    }
                }
            }
        }
    }

    /// Convenience function: fit and transform in one step
    pub fn fit_transform(
        vectors: &[FeatureVector],
        method: ScalingMethod,
    ) -> (Vec<FeatureVector>, ScalingParams) {
        let params = ScalingParams::fit(vectors, method);
        let transformed = params.transform_all(vectors);
        (transformed, params)
    }
}

/// Memory management utilities
pub mod memory {
    /// Bytes needed for a packed symmetric kernel matrix over `n_vectors`
    pub fn estimate_kernel_matrix_memory(n_vectors: usize) -> usize {
        n_vectors * (n_vectors + 1) / 2 * std::mem::size_of::<f64>()
    }
}
