//! Error types for the optimizer layer.
//!
//! Purpose
//! -------
//! Collect configuration, domain-compatibility, backend and
//! internal-consistency failures behind a single enum with readable
//! `Display` diagnostics, plus the downcasting conversion from
//! `argmin::core::Error`.
//!
//! Notes
//! -----
//! - Objective failures raised by the caller's closure travel through the
//!   backend as `argmin` errors and are recovered by downcasting, so `?`
//!   works on both sides of the bridge.

use argmin::core::{ArgminError, Error};

use crate::variables::errors::VarError;

/// Result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Configuration ----
    /// Unknown unconstrained method name.
    UnknownMethod {
        name: String,
        reason: &'static str,
    },

    /// A wrapped strategy must not carry its own maximize flag.
    MaximizingInner,

    // ---- Registry ----
    /// An optimizer id registered twice.
    DuplicateOptimizer {
        id: String,
    },

    /// Lookup of an unregistered optimizer id.
    UnknownOptimizer {
        id: String,
    },

    // ---- Domains and start points ----
    /// A variable's domain is incompatible with the optimizer kind.
    IncompatibleDomain {
        name: String,
        reason: &'static str,
    },

    /// The optimizer only handles continuous variables.
    NonContinuousVariable {
        name: String,
    },

    /// Start point length does not match the variable list.
    StartDimMismatch {
        expected: usize,
        actual: usize,
    },

    /// Start point coordinates must be finite.
    InvalidStartPoint {
        index: usize,
        value: f64,
    },

    // ---- Gradients ----
    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- Run outcome ----
    /// The backend finished without a best parameter.
    MissingBestParam,

    /// Cache bookkeeping broke: hits + misses must equal wrapper calls.
    EvalCountMismatch {
        calls: usize,
        hits: usize,
        misses: usize,
    },

    /// The backend's best value disagrees with a fresh evaluation.
    OptimumMismatch {
        reported: f64,
        fresh: f64,
    },

    // ---- Collaborators ----
    /// Wrapped variable-layer failure.
    Variable(VarError),

    /// The caller's objective failed.
    Objective {
        text: String,
    },

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            OptError::UnknownMethod { name, reason } => {
                write!(f, "Unknown optimization method '{name}': {reason}")
            }
            OptError::MaximizingInner => {
                write!(
                    f,
                    "Wrapped strategy must minimize; set maximize on the outer optimizer"
                )
            }

            // ---- Registry ----
            OptError::DuplicateOptimizer { id } => {
                write!(f, "Optimizer '{id}' is already registered")
            }
            OptError::UnknownOptimizer { id } => {
                write!(f, "No optimizer registered under '{id}'")
            }

            // ---- Domains and start points ----
            OptError::IncompatibleDomain { name, reason } => {
                write!(f, "Incompatible domain for variable '{name}': {reason}")
            }
            OptError::NonContinuousVariable { name } => {
                write!(f, "Variable '{name}' is not continuous")
            }
            OptError::StartDimMismatch { expected, actual } => {
                write!(f, "Start point length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidStartPoint { index, value } => {
                write!(f, "Invalid start point at index {index}: {value}, must be finite")
            }

            // ---- Gradients ----
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- Run outcome ----
            OptError::MissingBestParam => {
                write!(f, "Backend finished without a best parameter")
            }
            OptError::EvalCountMismatch { calls, hits, misses } => {
                write!(
                    f,
                    "Evaluation bookkeeping broke: {calls} calls != {hits} hits + {misses} \
                     misses"
                )
            }
            OptError::OptimumMismatch { reported, fresh } => {
                write!(
                    f,
                    "Reported optimum {reported} disagrees with fresh evaluation {fresh}"
                )
            }

            // ---- Collaborators ----
            OptError::Variable(err) => write!(f, "{err}"),
            OptError::Objective { text } => write!(f, "Objective failed: {text}"),

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }
        }
    }
}

impl From<VarError> for OptError {
    fn from(err: VarError) -> Self {
        OptError::Variable(err)
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Objective failures ride through argmin as boxed OptErrors; recover
        // them before classifying backend errors.
        match original_err.downcast::<OptError>() {
            Ok(opt_err) => opt_err,
            Err(err) => match err.downcast::<ArgminError>() {
                Ok(argmin_err) => match argmin_err {
                    ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                    ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                    ArgminError::ConditionViolated { text } => {
                        OptError::ConditionViolated { text }
                    }
                    ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                    other => OptError::BackendError { text: other.to_string() },
                },
                Err(err) => OptError::BackendError { text: err.to_string() },
            },
        }
    }
}
