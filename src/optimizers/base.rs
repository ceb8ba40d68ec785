//! Shared optimizer state and the `LocalOptimizer` contract.
//!
//! Purpose
//! -------
//! Every local optimizer composes [`OptimizerBase`], which owns the two
//! orthogonal toggles of the layer: an elementwise log transform of the
//! search space and a maximize flag implemented as a sign flip, so every
//! backend minimizes.
//!
//! Conventions
//! -----------
//! - The objective closure is always in the caller's space and
//!   orientation; transforms and sign flips stay inside the optimizer.
//! - `x0`, result `x` and the evaluation logs are in the caller's space.

use ndarray::Array1;

use crate::optimizers::{
    errors::{OptError, OptResult},
    result::OptimizerResult,
};
use crate::variables::Variable;

/// Objective in the caller's space and orientation, arguments already
/// bound.
pub type Objective<'a> = dyn Fn(&Array1<f64>) -> OptResult<f64> + 'a;

/// Log-transform and orientation state shared by every optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizerBase {
    log_transform: bool,
    maximize: bool,
}

impl OptimizerBase {
    pub fn new(log_transform: bool, maximize: bool) -> Self {
        OptimizerBase { log_transform, maximize }
    }

    pub fn log_transform(&self) -> bool {
        self.log_transform
    }

    pub fn maximize(&self) -> bool {
        self.maximize
    }

    /// Sign applied to objective values so the backend always minimizes.
    pub fn sign(&self) -> f64 {
        if self.maximize { -1.0 } else { 1.0 }
    }

    /// Caller space -> search space.
    pub fn transform(&self, x: &Array1<f64>) -> Array1<f64> {
        if self.log_transform { x.mapv(f64::ln) } else { x.clone() }
    }

    /// Search space -> caller space.
    pub fn inv_transform(&self, x: &Array1<f64>) -> Array1<f64> {
        if self.log_transform { x.mapv(f64::exp) } else { x.clone() }
    }

    /// Transform a domain into the search space. `ln(0)` becomes `-inf`,
    /// which downstream bound handling treats as a one-sided domain.
    pub fn transform_domain(&self, domain: [f64; 2]) -> [f64; 2] {
        if self.log_transform { [domain[0].ln(), domain[1].ln()] } else { domain }
    }
}

/// Termination knobs shared by every backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeOptions {
    /// Iteration budget; `None` leaves termination to the tolerances.
    pub maxiter: Option<u64>,
    /// Simplex standard-deviation tolerance (Nelder-Mead).
    pub sd_tolerance: f64,
    /// Gradient-norm tolerance (gradient-based methods).
    pub tol_grad: f64,
    /// Cost-change tolerance (gradient-based methods).
    pub tol_cost: f64,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        OptimizeOptions {
            maxiter: None,
            sd_tolerance: 1e-8,
            tol_grad: 1e-6,
            tol_cost: f64::EPSILON,
        }
    }
}

/// A local optimization strategy over typed variables.
pub trait LocalOptimizer {
    /// Minimize (or maximize) `f` from `x0` inside the variables' domains.
    fn optimize(
        &self, f: &Objective<'_>, variables: &[Variable], x0: &Array1<f64>,
        options: &OptimizeOptions,
    ) -> OptResult<OptimizerResult>;

    /// Reject variable lists this strategy cannot search.
    fn check_variables(&self, variables: &[Variable]) -> OptResult<()>;
}

/// Marker for strategies that ignore domains entirely.
pub trait UnconstrainedOptimizer: LocalOptimizer {}

/// Marker for strategies that honor domains.
pub trait ConstrainedOptimizer: LocalOptimizer {}

// ---- Shared checks --------------------------------------------------------

/// Extract the continuous domain of every variable, rejecting discrete and
/// dynamics variables.
pub fn continuous_domains(variables: &[Variable]) -> OptResult<Vec<[f64; 2]>> {
    variables
        .iter()
        .map(|variable| match variable {
            Variable::Continuous(v) => Ok(v.domain()),
            other => Err(OptError::NonContinuousVariable { name: other.name().to_string() }),
        })
        .collect()
}

/// Validate the start point's length and finiteness.
pub fn check_start_point(x0: &Array1<f64>, expected: usize) -> OptResult<()> {
    if x0.len() != expected {
        return Err(OptError::StartDimMismatch { expected, actual: x0.len() });
    }
    for (index, &value) in x0.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidStartPoint { index, value });
        }
    }
    Ok(())
}
