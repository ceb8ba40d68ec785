//! Execution helpers that run `argmin` solvers on a search problem and
//! normalize the outcome.
//!
//! Three runner shapes cover the backend set: simplex (Nelder-Mead, start
//! point expanded into an initial simplex), gradient-based (L-BFGS,
//! steepest descent) and BFGS (which additionally seeds an identity
//! inverse Hessian). [`finish`] converts the raw backend outcome into an
//! [`OptimizerResult`], running the end-of-run consistency checks against
//! the evaluation cache.

use argmin::core::{Executor, IterState, Solver, State, TerminationStatus};
use argmin::solver::gradientdescent::SteepestDescent;
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::neldermead::NelderMead;
use argmin::solver::quasinewton::{BFGS, LBFGS};
use ndarray::{Array1, Array2};

use crate::optimizers::{
    adapter::SearchProblem,
    base::{OptimizeOptions, OptimizerBase},
    cache::EvalCache,
    errors::{OptError, OptResult},
    result::OptimizerResult,
};

/// L-BFGS history length.
pub const DEFAULT_LBFGS_MEM: usize = 10;

/// Iteration cap for steepest descent, which has no tolerance-based
/// termination of its own.
pub const DEFAULT_SD_MAX_ITERS: u64 = 500;

type MtLineSearch = MoreThuenteLineSearch<Array1<f64>, Array1<f64>, f64>;
type GradState = IterState<Array1<f64>, Array1<f64>, (), (), (), f64>;

/// Backend outcome before mapping back to the caller's space.
#[derive(Debug, Clone)]
pub struct RawOutcome {
    /// Best point, in the optimizer's transformed (but bounded) space.
    pub x_search: Array1<f64>,
    /// Best cost as the backend saw it (sign-flipped when maximizing).
    pub best_cost: f64,
    pub n_iter: u64,
    pub success: bool,
    pub status: String,
}

fn outcome_from_state<I>(state: I) -> OptResult<RawOutcome>
where
    I: State<Param = Array1<f64>, Float = f64>,
{
    let n_iter = state.get_iter();
    let status = state.get_termination_status().clone();
    let best_cost = state.get_best_cost();
    let x_search = state.get_best_param().cloned().ok_or(OptError::MissingBestParam)?;
    Ok(RawOutcome {
        x_search,
        best_cost,
        n_iter,
        success: !matches!(status, TerminationStatus::NotTerminated),
        status: format!("{status:?}"),
    })
}

/// Initial simplex around `x0`: one vertex per coordinate, perturbed by 5%
/// (or a small absolute step at zero).
pub fn initial_simplex(x0: &Array1<f64>) -> Vec<Array1<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.clone());
    for i in 0..x0.len() {
        let mut vertex = x0.clone();
        vertex[i] = if vertex[i] != 0.0 { vertex[i] * 1.05 } else { 2.5e-4 };
        simplex.push(vertex);
    }
    simplex
}

// ---- Builders -------------------------------------------------------------

pub fn build_lbfgs(
    options: &OptimizeOptions,
) -> OptResult<LBFGS<MtLineSearch, Array1<f64>, Array1<f64>, f64>> {
    Ok(LBFGS::new(MoreThuenteLineSearch::new(), DEFAULT_LBFGS_MEM)
        .with_tolerance_grad(options.tol_grad)?
        .with_tolerance_cost(options.tol_cost)?)
}

pub fn build_bfgs(options: &OptimizeOptions) -> OptResult<BFGS<MtLineSearch, f64>> {
    Ok(BFGS::new(MoreThuenteLineSearch::new())
        .with_tolerance_grad(options.tol_grad)?
        .with_tolerance_cost(options.tol_cost)?)
}

pub fn build_steepest_descent() -> SteepestDescent<MtLineSearch> {
    SteepestDescent::new(MoreThuenteLineSearch::new())
}

// ---- Runners --------------------------------------------------------------

/// Nelder-Mead: the start point becomes the initial simplex.
pub fn run_simplex(
    problem: SearchProblem<'_>, z0: &Array1<f64>, options: &OptimizeOptions,
) -> OptResult<RawOutcome> {
    let solver =
        NelderMead::new(initial_simplex(z0)).with_sd_tolerance(options.sd_tolerance)?;
    let mut executor = Executor::new(problem, solver);
    if let Some(maxiter) = options.maxiter {
        executor = executor.configure(|state| state.max_iters(maxiter));
    }
    let state = executor.run()?.state().clone();
    outcome_from_state(state)
}

/// Gradient-based solvers that only need a start point.
pub fn run_gradient<'a, S>(
    problem: SearchProblem<'a>, solver: S, z0: Array1<f64>, maxiter: Option<u64>,
) -> OptResult<RawOutcome>
where
    S: Solver<SearchProblem<'a>, GradState> + Send + 'static,
{
    let mut executor = Executor::new(problem, solver);
    executor = executor.configure(|state| state.param(z0));
    if let Some(maxiter) = maxiter {
        executor = executor.configure(|state| state.max_iters(maxiter));
    }
    let state = executor.run()?.state().clone();
    outcome_from_state(state)
}

/// BFGS carries its inverse Hessian in the state; seed it with identity.
pub fn run_bfgs(
    problem: SearchProblem<'_>, solver: BFGS<MtLineSearch, f64>, z0: Array1<f64>,
    maxiter: Option<u64>,
) -> OptResult<RawOutcome> {
    let dim = z0.len();
    let mut executor = Executor::new(problem, solver);
    executor = executor.configure(|state| state.param(z0).inv_hessian(Array2::eye(dim)));
    if let Some(maxiter) = maxiter {
        executor = executor.configure(|state| state.max_iters(maxiter));
    }
    let state = executor.run()?.state().clone();
    outcome_from_state(state)
}

// ---- Finishing ------------------------------------------------------------

/// Map a raw outcome back to the caller's space and run the end-of-run
/// consistency checks: cache bookkeeping must balance and the backend's
/// best value must agree with a fresh evaluation through the wrapper.
pub fn finish(
    base: &OptimizerBase, cache: &EvalCache<'_>, raw: RawOutcome,
) -> OptResult<OptimizerResult> {
    cache.check_consistency()?;
    let (x_log, y_log) = cache.call_log();
    let n_eval = cache.misses();

    let x = base.inv_transform(&raw.x_search);
    // Re-evaluates through the wrapper; the backend saw this exact point,
    // so this is a cache hit and the comparison is exact.
    let y = cache.eval(&x)?;
    if base.sign() * y != raw.best_cost {
        return Err(OptError::OptimumMismatch {
            reported: base.sign() * raw.best_cost,
            fresh: y,
        });
    }

    log::debug!(
        target: "demographic_inference::optimizers",
        "run finished: status {}, {} iters, {} evaluations",
        raw.status,
        raw.n_iter,
        n_eval
    );

    Ok(OptimizerResult {
        x,
        y,
        x_log,
        y_log,
        n_eval,
        n_iter: raw.n_iter as usize,
        success: raw.success,
        status: raw.status,
    })
}

/// Degenerate run with no free parameters: one evaluation at `x0`.
pub fn finish_trivial(cache: &EvalCache<'_>, x0: &Array1<f64>) -> OptResult<OptimizerResult> {
    let y = cache.eval(x0)?;
    let (x_log, y_log) = cache.call_log();
    Ok(OptimizerResult {
        x: x0.clone(),
        y,
        x_log,
        y_log,
        n_eval: cache.misses(),
        n_iter: 0,
        success: true,
        status: "NoFreeParameters".to_string(),
    })
}
