//! Structure vectors and their transition rules.
//!
//! A structure is one interval count per phase: entry `p` is the number of
//! time intervals the model spends with `p + 1` populations. Growth walks
//! the structure from an initial vector to a final vector one interval at a
//! time.

use crate::model::errors::{ModelError, ModelResult};

/// Check that `structure` is non-empty with every entry at least 1.
pub fn validate_structure(structure: &[usize]) -> ModelResult<()> {
    if structure.is_empty() {
        return Err(ModelError::EmptyStructure);
    }
    for (index, &value) in structure.iter().enumerate() {
        if value < 1 {
            return Err(ModelError::InvalidStructureEntry { index, value });
        }
    }
    Ok(())
}

/// Check that `final_structure` has the same length as `initial_structure`
/// and dominates it elementwise.
pub fn validate_structure_pair(
    initial_structure: &[usize], final_structure: &[usize],
) -> ModelResult<()> {
    validate_structure(initial_structure)?;
    validate_structure(final_structure)?;
    if initial_structure.len() != final_structure.len() {
        return Err(ModelError::StructureLengthMismatch {
            expected: initial_structure.len(),
            actual: final_structure.len(),
        });
    }
    for (index, (&initial_value, &final_value)) in
        initial_structure.iter().zip(final_structure).enumerate()
    {
        if final_value < initial_value {
            return Err(ModelError::FinalBelowInitial { index, initial_value, final_value });
        }
    }
    Ok(())
}

/// Check that `structure` sits inside the `[initial, final]` box.
pub fn validate_within_range(
    structure: &[usize], initial_structure: &[usize], final_structure: &[usize],
) -> ModelResult<()> {
    validate_structure(structure)?;
    if structure.len() != initial_structure.len() {
        return Err(ModelError::StructureLengthMismatch {
            expected: initial_structure.len(),
            actual: structure.len(),
        });
    }
    for (index, &value) in structure.iter().enumerate() {
        let (low, high) = (initial_structure[index], final_structure[index]);
        if value < low || value > high {
            return Err(ModelError::OutOfStructureRange { index, value, low, high });
        }
    }
    Ok(())
}

/// Default growth step: increment the first phase still below the final
/// structure.
pub fn next_structure(current: &[usize], final_structure: &[usize]) -> ModelResult<Vec<usize>> {
    for (index, (&cur, &fin)) in current.iter().zip(final_structure).enumerate() {
        if cur < fin {
            let mut next = current.to_vec();
            next[index] += 1;
            return Ok(next);
        }
    }
    Err(ModelError::AlreadyFinal)
}

/// Validate that `target` adds exactly one interval to exactly one phase of
/// `current` and return the index of that phase.
pub fn validate_increase_step(current: &[usize], target: &[usize]) -> ModelResult<usize> {
    validate_structure(target)?;
    if target.len() != current.len() {
        return Err(ModelError::StructureLengthMismatch {
            expected: current.len(),
            actual: target.len(),
        });
    }
    let mut grown = None;
    for (index, (&cur, &tgt)) in current.iter().zip(target).enumerate() {
        if tgt == cur {
            continue;
        }
        if tgt != cur + 1 || grown.is_some() {
            return Err(ModelError::InvalidTransition {
                current: current.to_vec(),
                target: target.to_vec(),
            });
        }
        grown = Some(index);
    }
    grown.ok_or_else(|| ModelError::InvalidTransition {
        current: current.to_vec(),
        target: target.to_vec(),
    })
}
