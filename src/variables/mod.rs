//! variables — typed, unit-aware model parameters.
//!
//! Purpose
//! -------
//! Provide the vocabulary the structured demographic model is generated
//! from: continuous variables tagged with a demographic class
//! (population size, time, migration, selection, fraction) and a unit
//! system, plus discrete variables over numeric sets and over epoch
//! dynamics.
//!
//! Key behaviors
//! -------------
//! - Class-specific default domains in genetic units, exported as public
//!   constants ([`POPULATION_SIZE_DOMAIN`] and friends).
//! - Unit translation through the ancestral population size: values with
//!   [`ContinuousVariable::translate_value_into`], whole domains with
//!   [`ContinuousVariable::translate_units_to`]; universal classes never
//!   rescale.
//! - Uniform resampling and value correction per variable kind.
//!
//! Conventions
//! -----------
//! - Parameter vectors are `Vec<ParamValue>` aligned positionally with a
//!   variable list; [`ParamValue`] is a float or a [`DynamicKind`].
//! - Errors bubble up as [`VarResult`] / [`VarError`]; nothing here panics.

pub mod dynamics;
pub mod errors;
pub mod variable;

pub use self::dynamics::DynamicKind;
pub use self::errors::{VarError, VarResult};
pub use self::variable::{
    ContinuousVariable, DEFAULT_N_A_DOMAIN, DiscreteVariable, DynamicVariable, FRACTION_DOMAIN,
    MIGRATION_DOMAIN, POPULATION_SIZE_DOMAIN, ParamValue, SELECTION_DOMAIN, TIME_DOMAIN, Units,
    VarType, Variable, VariableClass,
};
