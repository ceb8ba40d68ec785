//! Adapter that exposes a search-space evaluation closure as an `argmin`
//! problem.
//!
//! The closure owns every layer between the backend and the caller's
//! objective: coordinate maps, log transforms, sign flips and the
//! evaluation cache. This adapter only bridges it to `argmin`'s
//! `CostFunction` and finite-differences the cost for `Gradient`, trying
//! central differences first and falling back to forward differences when
//! an evaluation inside the stencil failed or produced a bad entry.

use std::cell::RefCell;

use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;
use ndarray::Array1;

use crate::optimizers::errors::{OptError, OptResult};

/// Bridges a search-space closure to `argmin`.
pub struct SearchProblem<'a> {
    eval: &'a dyn Fn(&Array1<f64>) -> Result<f64, Error>,
}

impl<'a> SearchProblem<'a> {
    pub fn new(eval: &'a dyn Fn(&Array1<f64>) -> Result<f64, Error>) -> Self {
        SearchProblem { eval }
    }
}

impl CostFunction for SearchProblem<'_> {
    type Param = Array1<f64>;
    type Output = f64;

    /// Evaluate the search-space cost.
    ///
    /// Infinities pass through untouched; bound handling uses them as
    /// sentinels. NaN is always a caller bug and becomes an error.
    fn cost(&self, z: &Self::Param) -> Result<Self::Output, Error> {
        let value = (self.eval)(z)?;
        if value.is_nan() {
            return Err((OptError::Objective { text: "objective returned NaN".to_string() })
                .into());
        }
        Ok(value)
    }
}

impl Gradient for SearchProblem<'_> {
    type Param = Array1<f64>;
    type Gradient = Array1<f64>;

    /// Finite-difference gradient of the cost at `z`.
    ///
    /// The FD closure must return `f64`, so errors raised by the cost are
    /// captured in `closure_err` and surfaced afterwards; a failed or
    /// non-finite central-difference gradient triggers one forward-
    /// difference retry.
    fn gradient(&self, z: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = z.len();
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |z: &Array1<f64>| -> f64 {
            match self.cost(z) {
                Ok(value) => value,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };
        let fd_grad = z.central_diff(&cost_func);
        if closure_err.borrow().is_some() {
            return run_fd_diff(z, &cost_func, &closure_err);
        }
        match validate_grad(&fd_grad, dim) {
            Ok(()) => Ok(fd_grad),
            Err(_) => run_fd_diff(z, &cost_func, &closure_err),
        }
    }
}

/// Forward-difference retry with error capture.
fn run_fd_diff<G: Fn(&Array1<f64>) -> f64>(
    z: &Array1<f64>, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Array1<f64>, Error> {
    closure_err.replace(None);
    let fd_grad = z.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, z.len())?;
    Ok(fd_grad)
}

/// Check a gradient's dimension and finiteness.
pub fn validate_grad(grad: &Array1<f64>, expected: usize) -> OptResult<()> {
    if grad.len() != expected {
        return Err(OptError::GradientDimMismatch { expected, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "gradient entries must be finite",
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Scope
    //! -----
    //! - Cost bridging, NaN rejection, sentinel pass-through.
    //! - Finite-difference gradients against an analytic quadratic.

    use ndarray::array;

    use super::*;

    #[test]
    fn cost_passes_infinities_and_rejects_nan() {
        let inf = |_: &Array1<f64>| -> Result<f64, Error> { Ok(f64::INFINITY) };
        let problem = SearchProblem::new(&inf);
        assert_eq!(problem.cost(&array![1.0]).unwrap(), f64::INFINITY);

        let nan = |_: &Array1<f64>| -> Result<f64, Error> { Ok(f64::NAN) };
        let problem = SearchProblem::new(&nan);
        let err: OptError = problem.cost(&array![1.0]).unwrap_err().into();
        assert!(matches!(err, OptError::Objective { .. }));
    }

    // Purpose: FD gradient of a quadratic matches 2 (x - c).
    #[test]
    fn gradient_matches_analytic_quadratic() {
        let f = |z: &Array1<f64>| -> Result<f64, Error> {
            Ok(z.iter().map(|v| (v - 3.0) * (v - 3.0)).sum())
        };
        let problem = SearchProblem::new(&f);

        let grad = problem.gradient(&array![1.0, 5.0]).unwrap();

        assert!((grad[0] - (-4.0)).abs() < 1e-5);
        assert!((grad[1] - 4.0).abs() < 1e-5);
    }

    #[test]
    fn gradient_surfaces_objective_errors() {
        let f = |_: &Array1<f64>| -> Result<f64, Error> {
            Err((OptError::Objective { text: "boom".to_string() }).into())
        };
        let problem = SearchProblem::new(&f);
        let err: OptError = problem.gradient(&array![1.0]).unwrap_err().into();
        assert!(matches!(err, OptError::Objective { .. }));
    }
}
