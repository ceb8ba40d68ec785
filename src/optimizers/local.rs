//! Unconstrained local optimizers over the allow-listed method set.
//!
//! Purpose
//! -------
//! [`ArgminUnconstrOptimizer`] runs one of the allow-listed unconstrained
//! methods ([`UnconstrMethod`]) through the shared runner layer, with the
//! optimizer base handling log transforms and orientation and a single
//! [`EvalCache`] wrapping the caller's objective.
//!
//! Invariants & assumptions
//! ------------------------
//! - Unconstrained methods require full-line domains; bounded search is
//!   the job of the constrained wrappers.
//! - Gradient-based methods finite-difference the cached cost, so one real
//!   evaluation per distinct point regardless of how often the backend
//!   probes it.

use std::str::FromStr;

use argmin::core::Error;
use ndarray::Array1;

use crate::optimizers::{
    adapter::SearchProblem,
    base::{
        LocalOptimizer, Objective, OptimizeOptions, OptimizerBase, UnconstrainedOptimizer,
        check_start_point, continuous_domains,
    },
    cache::EvalCache,
    errors::{OptError, OptResult},
    result::OptimizerResult,
    run::{
        DEFAULT_SD_MAX_ITERS, build_bfgs, build_lbfgs, build_steepest_descent, finish,
        finish_trivial, run_bfgs, run_gradient, run_simplex,
    },
};
use crate::variables::Variable;

/// Allow-listed unconstrained methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnconstrMethod {
    NelderMead,
    Bfgs,
    Lbfgs,
    SteepestDescent,
}

impl UnconstrMethod {
    /// Canonical display name, also used in registry ids.
    pub fn name(&self) -> &'static str {
        match self {
            UnconstrMethod::NelderMead => "Nelder-Mead",
            UnconstrMethod::Bfgs => "BFGS",
            UnconstrMethod::Lbfgs => "L-BFGS",
            UnconstrMethod::SteepestDescent => "SteepestDescent",
        }
    }
}

impl FromStr for UnconstrMethod {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "neldermead" => Ok(UnconstrMethod::NelderMead),
            "bfgs" => Ok(UnconstrMethod::Bfgs),
            "lbfgs" => Ok(UnconstrMethod::Lbfgs),
            "steepestdescent" => Ok(UnconstrMethod::SteepestDescent),
            _ => Err(OptError::UnknownMethod {
                name: s.to_string(),
                reason: "expected one of Nelder-Mead, BFGS, L-BFGS, SteepestDescent",
            }),
        }
    }
}

impl std::fmt::Display for UnconstrMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An allow-listed unconstrained method behind the shared optimizer
/// surface.
#[derive(Debug, Clone, Copy)]
pub struct ArgminUnconstrOptimizer {
    base: OptimizerBase,
    method: UnconstrMethod,
}

impl ArgminUnconstrOptimizer {
    pub fn new(method: UnconstrMethod, log_transform: bool, maximize: bool) -> Self {
        ArgminUnconstrOptimizer { base: OptimizerBase::new(log_transform, maximize), method }
    }

    /// Parse the method from its registry-style name.
    pub fn from_name(name: &str, log_transform: bool, maximize: bool) -> OptResult<Self> {
        Ok(Self::new(name.parse()?, log_transform, maximize))
    }

    pub fn method(&self) -> UnconstrMethod {
        self.method
    }

    pub fn base(&self) -> OptimizerBase {
        self.base
    }
}

impl LocalOptimizer for ArgminUnconstrOptimizer {
    fn check_variables(&self, variables: &[Variable]) -> OptResult<()> {
        for (variable, domain) in variables.iter().zip(continuous_domains(variables)?) {
            if domain[0] != f64::NEG_INFINITY || domain[1] != f64::INFINITY {
                return Err(OptError::IncompatibleDomain {
                    name: variable.name().to_string(),
                    reason: "unconstrained methods need full-line domains",
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
        let sign = base.sign();
        let eval = |z: &Array1<f64>| -> Result<f64, Error> {
            let x = base.inv_transform(z);
            let value = cache.eval(&x).map_err(Error::from)?;
            Ok(sign * value)
        };
        let problem = SearchProblem::new(&eval);
        let z0 = base.transform(x0);

        let raw = match self.method {
            UnconstrMethod::NelderMead => run_simplex(problem, &z0, options)?,
            UnconstrMethod::Lbfgs => {
                run_gradient(problem, build_lbfgs(options)?, z0, options.maxiter)?
            }
            UnconstrMethod::SteepestDescent => {
                let maxiter = options.maxiter.unwrap_or(DEFAULT_SD_MAX_ITERS);
                run_gradient(problem, build_steepest_descent(), z0, Some(maxiter))?
            }
            UnconstrMethod::Bfgs => run_bfgs(problem, build_bfgs(options)?, z0, options.maxiter)?,
        };
        finish(&base, &cache, raw)
    }
}

impl UnconstrainedOptimizer for ArgminUnconstrOptimizer {}

#[cfg(test)]
mod tests {
    //! Scope
    //! -----
    //! - Method-name parsing against the allow-list.
    //! - Domain compatibility checks.
    //! - Convergence on a shifted quadratic per method, with cache and
    //!   fresh-evaluation invariants.

    use ndarray::array;

    use super::*;
    use crate::variables::ContinuousVariable;

    fn unbounded_vars(names: &[&str]) -> Vec<Variable> {
        names
            .iter()
            .map(|name| {
                Variable::Continuous(
                    ContinuousVariable::population_size(name)
                        .with_domain([f64::NEG_INFINITY, f64::INFINITY])
                        .unwrap(),
                )
            })
            .collect()
    }

    fn quadratic(x: &Array1<f64>) -> OptResult<f64> {
        Ok(x.iter().map(|v| (v - 2.0) * (v - 2.0)).sum::<f64>() + 1.0)
    }

    #[test]
    fn method_parsing_follows_the_allow_list() {
        assert_eq!("Nelder-Mead".parse::<UnconstrMethod>().unwrap(), UnconstrMethod::NelderMead);
        assert_eq!("l-bfgs".parse::<UnconstrMethod>().unwrap(), UnconstrMethod::Lbfgs);
        assert_eq!("BFGS".parse::<UnconstrMethod>().unwrap(), UnconstrMethod::Bfgs);
        assert_eq!(
            "steepest_descent".parse::<UnconstrMethod>().unwrap(),
            UnconstrMethod::SteepestDescent
        );
        assert!(matches!(
            "Powell".parse::<UnconstrMethod>().unwrap_err(),
            OptError::UnknownMethod { .. }
        ));
    }

    #[test]
    fn bounded_domains_are_rejected() {
        let optimizer = ArgminUnconstrOptimizer::new(UnconstrMethod::NelderMead, false, false);
        let bounded = vec![Variable::Continuous(ContinuousVariable::population_size("nu"))];
        assert!(matches!(
            optimizer.check_variables(&bounded).unwrap_err(),
            OptError::IncompatibleDomain { .. }
        ));
        assert!(optimizer.check_variables(&unbounded_vars(&["nu"])).is_ok());
    }

    // Purpose: every allow-listed method minimizes a shifted quadratic and
    // the result honors the cache contract.
    // Given: f(x) = sum (x_i - 2)^2 + 1 from x0 = (0, 4).
    // Expect: x near (2, 2), y == f(x) exactly, n_eval <= call count.
    #[test]
    fn methods_minimize_a_shifted_quadratic() {
        let variables = unbounded_vars(&["a", "b"]);
        let x0 = array![0.0, 4.0];
        let f = |x: &Array1<f64>| quadratic(x);

        for method in [
            UnconstrMethod::NelderMead,
            UnconstrMethod::Bfgs,
            UnconstrMethod::Lbfgs,
            UnconstrMethod::SteepestDescent,
        ] {
            // Arrange
            let optimizer = ArgminUnconstrOptimizer::new(method, false, false);
            let options = OptimizeOptions { maxiter: Some(500), ..Default::default() };

            // Act
            let result = optimizer.optimize(&f, &variables, &x0, &options).unwrap();

            // Assert
            assert!(
                (result.x[0] - 2.0).abs() < 1e-2 && (result.x[1] - 2.0).abs() < 1e-2,
                "{method}: best x = {}",
                result.x
            );
            assert!((result.y - 1.0).abs() < 1e-3, "{method}: best y = {}", result.y);
            assert_eq!(result.y, quadratic(&result.x).unwrap(), "{method}");
            assert!(result.n_eval <= result.x_log.len(), "{method}");
            assert_eq!(result.x_log.len(), result.y_log.len(), "{method}");
        }
    }

    // Purpose: maximize flips orientation without touching the caller's
    // values.
    #[test]
    fn maximize_flips_the_orientation() {
        let variables = unbounded_vars(&["a"]);
        let f = |x: &Array1<f64>| -> OptResult<f64> { Ok(-(x[0] - 3.0) * (x[0] - 3.0)) };
        let optimizer = ArgminUnconstrOptimizer::new(UnconstrMethod::NelderMead, false, true);

        let result =
            optimizer.optimize(&f, &variables, &array![0.5], &OptimizeOptions::default()).unwrap();

        assert!((result.x[0] - 3.0).abs() < 1e-3);
        assert!(result.y.abs() < 1e-6);
    }

    #[test]
    fn start_point_length_is_checked() {
        let optimizer = ArgminUnconstrOptimizer::new(UnconstrMethod::Bfgs, false, false);
        let f = |x: &Array1<f64>| quadratic(x);
        let err = optimizer
            .optimize(&f, &unbounded_vars(&["a", "b"]), &array![1.0], &OptimizeOptions::default())
            .unwrap_err();
        assert!(matches!(err, OptError::StartDimMismatch { expected: 2, actual: 1 }));
    }
}
