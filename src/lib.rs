//! demographic_inference — structured demographic models with
//! likelihood-preserving growth and argmin-backed local optimizers.
//!
//! Purpose
//! -------
//! Serve as the crate root for demographic-history inference tooling: a
//! typed, unit-aware variable system, a demographic model whose parameter
//! list grows with its structure, and a local-optimization layer that
//! searches those parameters against engine-evaluated likelihoods.
//!
//! Key behaviors
//! -------------
//! - [`variables`] defines continuous/discrete/dynamics variables with
//!   per-class default domains and genetic-physical unit translation.
//! - [`model`] generates variables from structure vectors, assembles
//!   parameter vectors into resolved event histories, and grows the
//!   structure one interval at a time without changing the history a
//!   vector describes.
//! - [`engine`] declares the contract simulation backends implement to
//!   score models against data.
//! - [`optimizers`] wraps argmin solvers behind a uniform surface with
//!   log transforms, bound handling, evaluation caching and a string-id
//!   registry.
//!
//! Conventions
//! -----------
//! - Parameter vectors align positionally with a model's variable list;
//!   optimizer-facing vectors are `ndarray::Array1<f64>`.
//! - Every layer reports failures through its own `Result` alias
//!   (`VarResult`, `ModelResult`, `OptResult`); nothing here intentionally
//!   panics or uses `unsafe`.
//! - The `log` facade carries evaluation traces and run summaries; the
//!   library never installs a logger.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code; the `tests/` suites exercise the
//!   cross-module properties (structure growth against reference engines,
//!   optimizer convergence per registry id).

pub mod engine;
pub mod model;
pub mod optimizers;
pub mod variables;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use demographic_inference::prelude::*;
//
// to import the main surface in a single line.

pub mod prelude {
    pub use crate::engine::DemographicEngine;
    pub use crate::model::{
        DemographicHistory, Epoch, Event, ModelError, ModelResult, Split,
        StructureDemographicModel, StructureOptions,
    };
    pub use crate::optimizers::{
        DEFAULT_LOCAL_OPTIMIZER, LocalOptimizer, OptError, OptResult, OptimizeOptions,
        OptimizerRegistry, OptimizerResult, get_local_optimizer,
    };
    pub use crate::variables::{
        ContinuousVariable, DynamicKind, ParamValue, Units, VarError, VarResult, Variable,
        VariableClass,
    };
}
