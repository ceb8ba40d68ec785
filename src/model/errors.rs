//! Error types for the structured-model layer.
//!
//! Notes
//! -----
//! - Structure vectors travel as `Vec<usize>` payloads so transition errors
//!   can show both sides of a rejected step.
//! - Variable-layer failures are wrapped, not flattened; the model adds no
//!   information to them.

use crate::variables::errors::VarError;

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Structures ----
    /// A structure must have at least one phase.
    EmptyStructure,

    /// Every phase must carry at least one interval.
    InvalidStructureEntry {
        index: usize,
        value: usize,
    },

    /// Initial and final structures must have the same number of phases.
    StructureLengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// The final structure must dominate the initial one elementwise.
    FinalBelowInitial {
        index: usize,
        initial_value: usize,
        final_value: usize,
    },

    /// A requested structure leaves the [initial, final] box.
    OutOfStructureRange {
        index: usize,
        value: usize,
        low: usize,
        high: usize,
    },

    // ---- Transitions ----
    /// Every phase already matches the final structure.
    AlreadyFinal,

    /// A structure increase must add exactly one interval to exactly one
    /// phase.
    InvalidTransition {
        current: Vec<usize>,
        target: Vec<usize>,
    },

    // ---- Parameter vectors ----
    /// Parameter vector length does not match the variable list.
    ParamLengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// Parameter value kind does not match its variable.
    ParamTypeMismatch {
        index: usize,
        name: String,
        expected: &'static str,
    },

    // ---- Collaborators ----
    /// Wrapped variable-layer failure.
    Variable(VarError),

    /// An engine failed to evaluate or simulate.
    EngineFailure {
        id: &'static str,
        text: String,
    },
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Structures ----
            ModelError::EmptyStructure => {
                write!(f, "Structure must have at least one phase")
            }
            ModelError::InvalidStructureEntry { index, value } => {
                write!(
                    f,
                    "Invalid structure entry at phase {index}: {value}, must be at least 1"
                )
            }
            ModelError::StructureLengthMismatch { expected, actual } => {
                write!(f, "Structure length mismatch: expected {expected}, actual {actual}")
            }
            ModelError::FinalBelowInitial { index, initial_value, final_value } => {
                write!(
                    f,
                    "Final structure entry at phase {index} is {final_value}, below initial \
                     {initial_value}"
                )
            }
            ModelError::OutOfStructureRange { index, value, low, high } => {
                write!(
                    f,
                    "Structure entry at phase {index} is {value}, outside [{low}, {high}]"
                )
            }

            // ---- Transitions ----
            ModelError::AlreadyFinal => {
                write!(f, "Structure already matches the final structure")
            }
            ModelError::InvalidTransition { current, target } => {
                write!(
                    f,
                    "Invalid structure transition from {current:?} to {target:?}: must add \
                     exactly one interval to exactly one phase"
                )
            }

            // ---- Parameter vectors ----
            ModelError::ParamLengthMismatch { expected, actual } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, actual {actual}")
            }
            ModelError::ParamTypeMismatch { index, name, expected } => {
                write!(
                    f,
                    "Parameter at index {index} for variable '{name}' must be {expected}"
                )
            }

            // ---- Collaborators ----
            ModelError::Variable(err) => write!(f, "{err}"),
            ModelError::EngineFailure { id, text } => {
                write!(f, "Engine '{id}' failed: {text}")
            }
        }
    }
}

impl From<VarError> for ModelError {
    fn from(err: VarError) -> Self {
        ModelError::Variable(err)
    }
}
