//! engine — the contract between models and simulation backends.
//!
//! Purpose
//! -------
//! Declare the trait a simulation/likelihood backend implements to score
//! structured demographic models against observed data. The crate ships
//! the contract and the resolved-history surface only; concrete engines
//! live with their callers.
//!
//! Conventions
//! -----------
//! - `evaluate` returns a log-likelihood in the caller's orientation
//!   (higher is better); optimizers handle the sign themselves.
//! - `args` is an engine-specific grid specification (for example,
//!   integration grid sizes) passed through untouched.

use crate::model::{ModelResult, StructureDemographicModel};
use crate::variables::ParamValue;

/// A simulation backend that scores demographic models against data.
pub trait DemographicEngine {
    /// Observed-data payload the engine consumes and produces.
    type Data;

    /// Stable identifier for diagnostics.
    fn id(&self) -> &'static str;

    /// Attach the model whose parameter vectors `evaluate` and `simulate`
    /// will receive.
    fn set_model(&mut self, model: StructureDemographicModel);

    /// Attach the observed data `evaluate` scores against.
    fn set_data(&mut self, data: Self::Data);

    /// Log-likelihood of the attached data under parameters `x`.
    fn evaluate(&self, x: &[ParamValue], args: &[usize]) -> ModelResult<f64>;

    /// Simulate expected data under parameters `x` for per-population
    /// sample sizes `sizes`.
    fn simulate(&self, x: &[ParamValue], sizes: &[usize], args: &[usize])
    -> ModelResult<Self::Data>;
}
