//! Numerically safe scalar transforms for bound handling.
//!
//! Bounded solving is implemented by reparameterizing each coordinate onto
//! the whole real line: a sigmoid for two finite bounds, a softplus shift
//! for one. The implementations use explicit cutoffs (`x > 20.0`, `|z| <=
//! 40.0`) to keep `f64` arithmetic in a well-conditioned regime.

/// Stable softplus: `ln(1 + exp(x))`, mapping ℝ → (0, ∞).
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: `ln(exp(x) - 1)`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Stable logistic sigmoid, mapping ℝ → (0, 1).
pub fn safe_sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Inverse of the sigmoid on `(0, 1)`.
pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}
