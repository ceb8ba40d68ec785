//! Normalized optimizer outcome.

use ndarray::Array1;

/// Outcome of a local optimization run, in the caller's space and
/// orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerResult {
    /// Best parameter vector found.
    pub x: Array1<f64>,
    /// Objective value at `x`.
    pub y: f64,
    /// Every evaluated vector, in call order (cache hits included).
    pub x_log: Vec<Array1<f64>>,
    /// Objective value of each entry of `x_log`.
    pub y_log: Vec<f64>,
    /// Distinct objective evaluations (cache misses).
    pub n_eval: usize,
    /// Backend iterations.
    pub n_iter: usize,
    /// Whether the backend terminated on its own criteria.
    pub success: bool,
    /// Human-readable termination status.
    pub status: String,
}
