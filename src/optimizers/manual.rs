//! Bound handling by rejection around an unconstrained strategy.
//!
//! Purpose
//! -------
//! [`ManuallyConstrOptimizer`] turns any allow-listed unconstrained method
//! into a constrained one: proposed points are checked against the
//! transformed bounds and out-of-bounds probes answer with an infinite
//! sentinel without touching the real objective. The wrapped strategy
//! sees unbounded variables and always minimizes; orientation and log
//! transform live on the wrapper.
//!
//! Invariants & assumptions
//! ------------------------
//! - Sentinel probes never reach the evaluation cache, so the call log and
//!   `n_eval` count real evaluations only.
//! - The inner strategy must be plain (no maximize flag); wrapping a
//!   maximizing strategy is a configuration error.

use ndarray::Array1;

use crate::optimizers::{
    base::{
        ConstrainedOptimizer, LocalOptimizer, Objective, OptimizeOptions, OptimizerBase,
        check_start_point, continuous_domains,
    },
    cache::EvalCache,
    errors::{OptError, OptResult},
    local::ArgminUnconstrOptimizer,
    result::OptimizerResult,
};
use crate::variables::Variable;

/// Value answered for an out-of-bounds probe.
pub const OUT_OF_BOUNDS_SENTINEL: f64 = f64::INFINITY;

/// Rejection-based constrained wrapper around an unconstrained strategy.
#[derive(Debug, Clone, Copy)]
pub struct ManuallyConstrOptimizer {
    base: OptimizerBase,
    inner: ArgminUnconstrOptimizer,
}

impl ManuallyConstrOptimizer {
    /// Wrap `inner`, which must be plain: the wrapper owns the log
    /// transform and the orientation.
    pub fn new(
        inner: ArgminUnconstrOptimizer, log_transform: bool, maximize: bool,
    ) -> OptResult<Self> {
        if inner.base().maximize() {
            return Err(OptError::MaximizingInner);
        }
        Ok(ManuallyConstrOptimizer { base: OptimizerBase::new(log_transform, maximize), inner })
    }

    pub fn base(&self) -> OptimizerBase {
        self.base
    }

    pub fn inner(&self) -> &ArgminUnconstrOptimizer {
        &self.inner
    }

    fn unbounded_twins(&self, variables: &[Variable]) -> OptResult<Vec<Variable>> {
        variables
            .iter()
            .map(|variable| match variable {
                Variable::Continuous(v) => Ok(Variable::Continuous(
                    v.with_domain([f64::NEG_INFINITY, f64::INFINITY])?,
                )),
                other => {
                    Err(OptError::NonContinuousVariable { name: other.name().to_string() })
                }
            })
            .collect()
    }
}

impl LocalOptimizer for ManuallyConstrOptimizer {
    fn check_variables(&self, variables: &[Variable]) -> OptResult<()> {
        for (variable, domain) in variables.iter().zip(continuous_domains(variables)?) {
            if !domain[0].is_finite() || !domain[1].is_finite() {
                return Err(OptError::IncompatibleDomain {
                    name: variable.name().to_string(),
                    reason: "constrained methods need finite domains",
                });
            }
            if self.base.log_transform() && domain[0] < 0.0 {
                return Err(OptError::IncompatibleDomain {
                    name: variable.name().to_string(),
                    reason: "log transform needs non-negative domains",
                });
            }
        }
        Ok(())
    }

    fn optimize(
        &self, f: &Objective<'_>, variables: &[Variable], x0: &Array1<f64>,
        options: &OptimizeOptions,
    ) -> OptResult<OptimizerResult> {
        self.check_variables(variables)?;
        check_start_point(x0, variables.len())?;

        let base = self.base;
        let domains = continuous_domains(variables)?;
        let bounds_t: Vec<[f64; 2]> =
            domains.iter().map(|&domain| base.transform_domain(domain)).collect();

        let cache = EvalCache::new(f);
        let sign = base.sign();
        let guarded = |z: &Array1<f64>| -> OptResult<f64> {
            let out_of_bounds =
                z.iter().zip(&bounds_t).any(|(&v, bounds)| v < bounds[0] || v > bounds[1]);
            if out_of_bounds {
                return Ok(OUT_OF_BOUNDS_SENTINEL);
            }
            let x = base.inv_transform(z);
            Ok(sign * cache.eval(&x)?)
        };

        let unbounded = self.unbounded_twins(variables)?;
        let z0 = base.transform(x0);
        let inner_result = self.inner.optimize(&guarded, &unbounded, &z0, options)?;

        cache.check_consistency()?;
        let (x_log, y_log) = cache.call_log();
        let n_eval = cache.misses();

        let x = base.inv_transform(&inner_result.x);
        let y = if inner_result.y.is_infinite() {
            // Every probe was infeasible; report the sentinel rather than
            // evaluate outside the domain.
            sign * inner_result.y
        } else {
            let expected = sign * inner_result.y;
            let fresh = cache.eval(&x)?;
            if fresh != expected {
                return Err(OptError::OptimumMismatch { reported: expected, fresh });
            }
            fresh
        };

        Ok(OptimizerResult {
            x,
            y,
            x_log,
            y_log,
            n_eval,
            n_iter: inner_result.n_iter,
            success: inner_result.success,
            status: inner_result.status,
        })
    }
}

impl ConstrainedOptimizer for ManuallyConstrOptimizer {}
