//! Population-size dynamics within a single epoch.
//!
//! - [`DynamicKind`] is the closed set of supported size trajectories.
//! - [`DynamicKind::inner_func`] materializes the trajectory as a closure
//!   over time within the epoch.
//!
//! Notes
//! -----
//! - `Sudden` jumps to the end size at the start of the epoch, so its
//!   trajectory is the constant `y_end`. `Linear` and `Exponential`
//!   interpolate from `y_start` to `y_end` over the epoch duration.

use std::str::FromStr;

use crate::variables::errors::VarError;

/// How a population size changes over one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicKind {
    /// Instant change to the end size.
    Sudden,
    /// Linear interpolation between start and end size.
    Linear,
    /// Exponential interpolation between start and end size.
    Exponential,
}

impl DynamicKind {
    /// All supported dynamics, in canonical order.
    pub const ALL: [DynamicKind; 3] =
        [DynamicKind::Sudden, DynamicKind::Linear, DynamicKind::Exponential];

    /// Short canonical name (`Sud`, `Lin`, `Exp`).
    pub fn short_name(&self) -> &'static str {
        match self {
            DynamicKind::Sudden => "Sud",
            DynamicKind::Linear => "Lin",
            DynamicKind::Exponential => "Exp",
        }
    }

    /// Size trajectory `f(t)` for `t` in `[0, duration]`.
    ///
    /// `f(duration) == y_end` for every kind. For `Linear` and
    /// `Exponential`, `f(0) == y_start`; `Sudden` is the constant `y_end`.
    /// A zero-duration epoch degenerates to the constant `y_end`, and an
    /// `Exponential` trajectory from a zero start size (a fully one-sided
    /// fractional split) degrades to the linear ramp.
    pub fn inner_func(&self, y_start: f64, y_end: f64, duration: f64) -> impl Fn(f64) -> f64 {
        let kind = *self;
        move |t: f64| -> f64 {
            if duration == 0.0 {
                return y_end;
            }
            match kind {
                DynamicKind::Sudden => y_end,
                DynamicKind::Linear => y_start + (y_end - y_start) * t / duration,
                DynamicKind::Exponential => {
                    // A zero start size has no exponential trajectory;
                    // degrade to the linear ramp so the value stays finite.
                    if y_start == 0.0 {
                        y_end * t / duration
                    } else {
                        y_start * (y_end / y_start).powf(t / duration)
                    }
                }
            }
        }
    }
}

impl FromStr for DynamicKind {
    type Err = VarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sud" | "sudden" => Ok(DynamicKind::Sudden),
            "lin" | "linear" => Ok(DynamicKind::Linear),
            "exp" | "exponential" => Ok(DynamicKind::Exponential),
            _ => Err(VarError::UnknownDynamic { value: s.to_string() }),
        }
    }
}

impl std::fmt::Display for DynamicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}
