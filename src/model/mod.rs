//! model — structured demographic models and resolved histories.
//!
//! Purpose
//! -------
//! Turn a structure vector (interval counts per population-count phase)
//! plus option flags into a typed variable list, assemble parameter
//! vectors into event histories for engines, and grow the structure one
//! interval at a time without changing the history a parameter vector
//! describes.
//!
//! Key behaviors
//! -------------
//! - [`structure`] holds the structure-vector validation and transition
//!   rules; [`structure_model`] generates variables with a positional
//!   schema and implements growth and remapping;
//!   [`history`] is the resolved event surface engines read.
//! - Growth appends a zero-duration constant epoch, so likelihoods under
//!   any deterministic engine are preserved exactly.
//!
//! Conventions
//! -----------
//! - Parameter vectors align positionally with
//!   [`StructureDemographicModel::variables`].
//! - Errors bubble up as [`ModelResult`] / [`ModelError`]; nothing here
//!   panics.

pub mod errors;
pub mod history;
pub mod structure;
pub mod structure_model;

pub use self::errors::{ModelError, ModelResult};
pub use self::history::{DemographicHistory, Epoch, Event, Split};
pub use self::structure_model::{
    EpochSchema, PhaseSchema, SplitSchema, StructureDemographicModel, StructureOptions,
    StructureSchema, migration_pairs,
};
