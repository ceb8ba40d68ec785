//! Bounded L-BFGS through coordinate reparameterization.
//!
//! Purpose
//! -------
//! [`BoundedLbfgsOptimizer`] searches inside variable domains by mapping
//! each coordinate onto the whole real line: a logistic map for two finite
//! bounds, a softplus shift for one (which is what a log transform turns a
//! zero lower bound into). The inner L-BFGS never sees a bound, so every
//! probe it makes is feasible by construction.
//!
//! Invariants & assumptions
//! ------------------------
//! - Raw variable domains must be finite; the *transformed* domain may be
//!   semi-infinite (log transform of a zero lower bound).
//! - A start point outside the open domain is projected strictly inside
//!   before the first evaluation.
//! - The iteration budget is halved for this method; its line searches
//!   spend roughly two evaluations per accepted step.

use argmin::core::Error;
use ndarray::Array1;

use crate::optimizers::{
    adapter::SearchProblem,
    base::{
        ConstrainedOptimizer, LocalOptimizer, Objective, OptimizeOptions, OptimizerBase,
        check_start_point, continuous_domains,
    },
    cache::EvalCache,
    errors::{OptError, OptResult},
    result::OptimizerResult,
    run::{RawOutcome, build_lbfgs, finish, finish_trivial, run_gradient},
    transforms::{logit, safe_sigmoid, safe_softplus, safe_softplus_inv},
};
use crate::variables::Variable;

/// Relative margin used when projecting a start point strictly inside its
/// domain.
const PROJECTION_MARGIN: f64 = 1e-8;

/// Per-coordinate map between a (possibly semi-infinite) interval and ℝ.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CoordMap {
    /// Both bounds infinite.
    Identity,
    /// Both bounds finite and distinct.
    Logistic { low: f64, span: f64 },
    /// Finite lower bound only.
    LowerShift { low: f64 },
    /// Finite upper bound only.
    UpperShift { high: f64 },
    /// Degenerate single-point domain.
    Fixed { value: f64 },
}

impl CoordMap {
    fn new(domain: [f64; 2]) -> Self {
        match (domain[0].is_finite(), domain[1].is_finite()) {
            (true, true) if domain[0] == domain[1] => CoordMap::Fixed { value: domain[0] },
            (true, true) => CoordMap::Logistic { low: domain[0], span: domain[1] - domain[0] },
            (true, false) => CoordMap::LowerShift { low: domain[0] },
            (false, true) => CoordMap::UpperShift { high: domain[1] },
            (false, false) => CoordMap::Identity,
        }
    }

    /// ℝ -> interval.
    fn to_bounded(&self, z: f64) -> f64 {
        match *self {
            CoordMap::Identity => z,
            CoordMap::Logistic { low, span } => low + span * safe_sigmoid(z),
            CoordMap::LowerShift { low } => low + safe_softplus(z),
            CoordMap::UpperShift { high } => high - safe_softplus(z),
            CoordMap::Fixed { value } => value,
        }
    }

    /// Interval -> ℝ; the input must be strictly inside the open interval.
    fn to_unbounded(&self, x: f64) -> f64 {
        match *self {
            CoordMap::Identity => x,
            CoordMap::Logistic { low, span } => logit((x - low) / span),
            CoordMap::LowerShift { low } => safe_softplus_inv(x - low),
            CoordMap::UpperShift { high } => safe_softplus_inv(high - x),
            CoordMap::Fixed { .. } => 0.0,
        }
    }

    /// Move `x` strictly inside the open interval.
    fn project(&self, x: f64) -> f64 {
        match *self {
            CoordMap::Identity => x,
            CoordMap::Logistic { low, span } => {
                let margin = PROJECTION_MARGIN * span;
                x.clamp(low + margin, low + span - margin)
            }
            CoordMap::LowerShift { low } => {
                let margin = PROJECTION_MARGIN * low.abs().max(1.0);
                x.max(low + margin)
            }
            CoordMap::UpperShift { high } => {
                let margin = PROJECTION_MARGIN * high.abs().max(1.0);
                x.min(high - margin)
            }
            CoordMap::Fixed { value } => value,
        }
    }
}

/// L-BFGS over reparameterized coordinates; registry id `L-BFGS-B`.
#[derive(Debug, Clone, Copy)]
pub struct BoundedLbfgsOptimizer {
    base: OptimizerBase,
}

impl BoundedLbfgsOptimizer {
    pub fn new(log_transform: bool, maximize: bool) -> Self {
        BoundedLbfgsOptimizer { base: OptimizerBase::new(log_transform, maximize) }
    }

    pub fn base(&self) -> OptimizerBase {
        self.base
    }
}

impl LocalOptimizer for BoundedLbfgsOptimizer {
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

        let cache = EvalCache::new(f);
        if x0.is_empty() {
            return finish_trivial(&cache, x0);
        }

        let base = self.base;
        let domains = continuous_domains(variables)?;
        let maps: Vec<CoordMap> =
            domains.iter().map(|&d| CoordMap::new(base.transform_domain(d))).collect();

        let x0_t = base.transform(x0);
        let z0: Array1<f64> = maps
            .iter()
            .zip(x0_t.iter())
            .map(|(map, &v)| map.to_unbounded(map.project(v)))
            .collect();

        let sign = base.sign();
        let eval = |z: &Array1<f64>| -> Result<f64, Error> {
            let x_t: Array1<f64> =
                maps.iter().zip(z.iter()).map(|(map, &zi)| map.to_bounded(zi)).collect();
            let x = base.inv_transform(&x_t);
            let value = cache.eval(&x).map_err(Error::from)?;
            Ok(sign * value)
        };
        let problem = SearchProblem::new(&eval);

        // The evaluation budget counts about two probes per accepted step.
        let budget = options.maxiter.map(|maxiter| (maxiter / 2).max(1));
        let raw = run_gradient(problem, build_lbfgs(options)?, z0, budget)?;

        let x_t_best: Array1<f64> =
            maps.iter().zip(raw.x_search.iter()).map(|(map, &zi)| map.to_bounded(zi)).collect();
        finish(&base, &cache, RawOutcome { x_search: x_t_best, ..raw })
    }
}

impl ConstrainedOptimizer for BoundedLbfgsOptimizer {}
