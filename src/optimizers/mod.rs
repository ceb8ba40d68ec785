//! optimizers — argmin-powered local optimization over typed variables.
//!
//! Purpose
//! -------
//! Provide a uniform local-optimization layer for demographic inference:
//! callers hand a closure objective, a variable list and a start point to
//! any [`LocalOptimizer`] and get back a normalized [`OptimizerResult`],
//! regardless of which backend ran underneath.
//!
//! Key behaviors
//! -------------
//! - [`OptimizerBase`] owns the two orthogonal toggles of the layer: an
//!   elementwise log transform of the search space and a maximize flag
//!   implemented as a sign flip, so every backend minimizes.
//! - [`local::ArgminUnconstrOptimizer`] runs the allow-listed
//!   unconstrained methods (Nelder-Mead, BFGS, L-BFGS, steepest descent)
//!   through [`run`]; gradient-based methods finite-difference the cached
//!   cost via [`adapter::SearchProblem`].
//! - Constrained search composes over unconstrained search:
//!   [`bounded::BoundedLbfgsOptimizer`] reparameterizes coordinates onto
//!   ℝ (logistic / softplus maps from [`transforms`]), while
//!   [`manual::ManuallyConstrOptimizer`] rejects out-of-bounds probes
//!   with an infinite sentinel around any allow-listed method.
//! - Exactly one [`cache::EvalCache`] per run wraps the real objective:
//!   memoized by bit pattern, ordered call log, every call mirrored to
//!   `log::trace!`.
//! - [`registry`] maps stable string ids to shared instances
//!   (`Nelder-Mead`, `BFGS`, `L-BFGS`, their `_log` variants,
//!   `L-BFGS-B`, `L-BFGS-B_log`).
//!
//! Invariants & assumptions
//! ------------------------
//! - The objective closure is always in the caller's space and
//!   orientation; transforms, bounds and sign flips never leak out of the
//!   layer.
//! - Sentinel probes never reach the cache; `n_eval` counts real, distinct
//!   evaluations.
//! - End of run, bookkeeping must balance (`hits + misses == calls`) and
//!   the backend's best value must agree with a fresh evaluation through
//!   the wrapper; violations are errors, not warnings.
//! - Errors bubble up as [`OptResult`] / [`OptError`]; this module and its
//!   children never intentionally panic or use `unsafe`.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover method parsing, domain compatibility,
//!   cache accounting, coordinate-map round trips and sentinel behavior.
//! - Integration tests drive every registered optimizer against convex
//!   objectives and the demographic-model pipeline.

pub mod adapter;
pub mod base;
pub mod bounded;
pub mod cache;
pub mod errors;
pub mod local;
pub mod manual;
pub mod registry;
pub mod result;
pub mod run;
pub mod transforms;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::base::{
    ConstrainedOptimizer, LocalOptimizer, Objective, OptimizeOptions, OptimizerBase,
    UnconstrainedOptimizer,
};
pub use self::bounded::BoundedLbfgsOptimizer;
pub use self::cache::EvalCache;
pub use self::errors::{OptError, OptResult};
pub use self::local::{ArgminUnconstrOptimizer, UnconstrMethod};
pub use self::manual::{ManuallyConstrOptimizer, OUT_OF_BOUNDS_SENTINEL};
pub use self::registry::{
    DEFAULT_LOCAL_OPTIMIZER, OptimizerRegistry, SharedOptimizer, get_local_optimizer,
    local_optimizer_ids, register_local_optimizer,
};
pub use self::result::OptimizerResult;
