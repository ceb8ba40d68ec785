//! Insertion-ordered evaluation cache over the real objective.
//!
//! Purpose
//! -------
//! Every optimizer wraps the caller's objective in exactly one
//! [`EvalCache`]. It memoizes by the bit pattern of the parameter vector,
//! keeps an ordered log of every call (hits included) that becomes the
//! result's evaluation history, and mirrors each call to `log::trace!`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Keys are exact bit patterns; a hit requires the numerically identical
//!   vector, which is what repeated probes of the same point produce.
//! - `hits + misses == calls` at all times; [`EvalCache::check_consistency`]
//!   turns a violation into a fatal error instead of returning corrupt
//!   counts.
//! - Sentinel values produced by bound handling must be returned *before*
//!   reaching the cache; everything recorded here was a real evaluation.

use std::cell::RefCell;
use std::collections::HashMap;

use ndarray::Array1;

use crate::optimizers::base::Objective;
use crate::optimizers::errors::{OptError, OptResult};

struct CacheState {
    map: HashMap<Vec<u64>, f64>,
    calls: Vec<(Array1<f64>, f64)>,
    hits: usize,
    misses: usize,
}

/// Memoizing, order-keeping wrapper around one objective closure.
pub struct EvalCache<'a> {
    f: &'a Objective<'a>,
    state: RefCell<CacheState>,
}

impl<'a> EvalCache<'a> {
    pub fn new(f: &'a Objective<'a>) -> Self {
        EvalCache {
            f,
            state: RefCell::new(CacheState {
                map: HashMap::new(),
                calls: Vec::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    fn key(x: &Array1<f64>) -> Vec<u64> {
        x.iter().map(|value| value.to_bits()).collect()
    }

    /// Evaluate `x`, memoized. Hits and misses both land in the call log.
    pub fn eval(&self, x: &Array1<f64>) -> OptResult<f64> {
        let key = Self::key(x);
        let cached = self.state.borrow().map.get(&key).copied();
        let value = match cached {
            Some(value) => {
                self.state.borrow_mut().hits += 1;
                value
            }
            None => {
                let value = (self.f)(x)?;
                let mut state = self.state.borrow_mut();
                state.misses += 1;
                state.map.insert(key, value);
                value
            }
        };
        log::trace!(target: "demographic_inference::eval", "f({x}) = {value}");
        self.state.borrow_mut().calls.push((x.clone(), value));
        Ok(value)
    }

    pub fn hits(&self) -> usize {
        self.state.borrow().hits
    }

    pub fn misses(&self) -> usize {
        self.state.borrow().misses
    }

    pub fn n_calls(&self) -> usize {
        self.state.borrow().calls.len()
    }

    /// Snapshot of the ordered call log.
    pub fn call_log(&self) -> (Vec<Array1<f64>>, Vec<f64>) {
        let state = self.state.borrow();
        let xs = state.calls.iter().map(|(x, _)| x.clone()).collect();
        let ys = state.calls.iter().map(|(_, y)| *y).collect();
        (xs, ys)
    }

    /// Fatal bookkeeping check: every logged call was a hit or a miss.
    pub fn check_consistency(&self) -> OptResult<()> {
        let state = self.state.borrow();
        if state.hits + state.misses != state.calls.len() {
            return Err(OptError::EvalCountMismatch {
                calls: state.calls.len(),
                hits: state.hits,
                misses: state.misses,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Scope
    //! -----
    //! - Hit/miss accounting and call-log ordering.
    //! - Error propagation from the wrapped objective.

    use std::cell::Cell;

    use ndarray::array;

    use super::*;

    // Purpose: repeated probes of the same point hit the cache and still
    // appear in the ordered log.
    #[test]
    fn hits_and_misses_are_counted_in_order() {
        // Arrange
        let real_calls = Cell::new(0usize);
        let f = |x: &Array1<f64>| -> OptResult<f64> {
            real_calls.set(real_calls.get() + 1);
            Ok(x.iter().map(|v| v * v).sum())
        };
        let cache = EvalCache::new(&f);
        let a = array![1.0, 2.0];
        let b = array![3.0, 0.0];

        // Act
        assert_eq!(cache.eval(&a).unwrap(), 5.0);
        assert_eq!(cache.eval(&b).unwrap(), 9.0);
        assert_eq!(cache.eval(&a).unwrap(), 5.0);

        // Assert
        assert_eq!(real_calls.get(), 2);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.n_calls(), 3);
        let (xs, ys) = cache.call_log();
        assert_eq!(xs, vec![a.clone(), b, a]);
        assert_eq!(ys, vec![5.0, 9.0, 5.0]);
        cache.check_consistency().unwrap();
    }

    // Purpose: objective failures propagate and are not cached or logged.
    #[test]
    fn objective_errors_propagate_uncached() {
        let f = |_: &Array1<f64>| -> OptResult<f64> {
            Err(OptError::Objective { text: "diverged".to_string() })
        };
        let cache = EvalCache::new(&f);

        assert!(cache.eval(&array![1.0]).is_err());
        assert_eq!(cache.misses(), 0);
        assert_eq!(cache.n_calls(), 0);
        cache.check_consistency().unwrap();
    }
}
