//! Error types for the variable layer.
//!
//! Purpose
//! -------
//! Collect every failure mode of variable construction, domain handling and
//! unit translation into a single enum with readable diagnostics through
//! `Display`.
//!
//! Notes
//! -----
//! - Variants carry the offending payload (name, value, bounds) so callers
//!   can report precisely what was rejected.
//! - Errors here are recoverable values, never panics.

/// Result alias for variable operations.
pub type VarResult<T> = Result<T, VarError>;

#[derive(Debug, Clone, PartialEq)]
pub enum VarError {
    // ---- Domains ----
    /// Lower bound exceeds upper bound.
    ReversedDomain {
        name: String,
        low: f64,
        high: f64,
    },

    /// Domain bounds must not be NaN.
    NanDomain {
        name: String,
    },

    /// A discrete variable with no values has no bounds.
    EmptyDomain {
        name: String,
    },

    /// Value lies outside the variable's discrete value set.
    ValueNotInDomain {
        name: String,
        value: f64,
    },

    // ---- Units ----
    /// Units the variable's class cannot carry.
    UnsupportedUnits {
        name: String,
        reason: &'static str,
    },

    /// A units change was requested without an ancestral population size.
    MissingAncestralSize {
        name: String,
    },

    /// Translating the domain produced an unordered interval.
    UnorderedTranslation {
        name: String,
        low: f64,
        high: f64,
    },

    // ---- Parsing ----
    /// Unknown dynamics name.
    UnknownDynamic {
        value: String,
    },

    // ---- Operations ----
    /// Operation the variable kind does not define.
    UnsupportedOperation {
        name: String,
        what: &'static str,
    },
}

impl std::error::Error for VarError {}

impl std::fmt::Display for VarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Domains ----
            VarError::ReversedDomain { name, low, high } => {
                write!(f, "Reversed domain for variable '{name}': [{low}, {high}]")
            }
            VarError::NanDomain { name } => {
                write!(f, "Domain of variable '{name}' contains NaN")
            }
            VarError::EmptyDomain { name } => {
                write!(f, "Variable '{name}' has an empty value set")
            }
            VarError::ValueNotInDomain { name, value } => {
                write!(f, "Value {value} is not in the value set of variable '{name}'")
            }

            // ---- Units ----
            VarError::UnsupportedUnits { name, reason } => {
                write!(f, "Unsupported units for variable '{name}': {reason}")
            }
            VarError::MissingAncestralSize { name } => {
                write!(
                    f,
                    "Translating variable '{name}' requires an ancestral population size"
                )
            }
            VarError::UnorderedTranslation { name, low, high } => {
                write!(
                    f,
                    "Translated domain of variable '{name}' is unordered: [{low}, {high}]"
                )
            }

            // ---- Parsing ----
            VarError::UnknownDynamic { value } => {
                write!(f, "Unknown dynamic '{value}', expected one of Sud, Lin, Exp")
            }

            // ---- Operations ----
            VarError::UnsupportedOperation { name, what } => {
                write!(f, "Variable '{name}' does not support {what}")
            }
        }
    }
}
