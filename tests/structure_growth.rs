//! Integration tests for structure growth and history assembly.
//!
//! Purpose
//! -------
//! - Validate the central model property end to end: growing a structure
//!   by one interval and remapping a parameter vector leaves the history
//!   the vector describes unchanged, as scored by two independent
//!   reference engines.
//! - Exercise every option combination (migrations, selection, dynamics,
//!   symmetric migration, fractional splits) over a set of one-, two- and
//!   three-population structures with randomly drawn parameter vectors.
//!
//! Coverage
//! --------
//! - `model::StructureDemographicModel`:
//!   - `increase_structure` over every growable phase and over the
//!     default (first-below-final) direction, chained to the final
//!     structure.
//!   - `to_history` through both engines' statistics.
//! - `engine::DemographicEngine`:
//!   - The trait path itself (`set_model`, `set_data`, `evaluate`,
//!     `simulate`) for both reference backends.
//!
//! Exclusions
//! ----------
//! - Variable generation, naming and counting — covered by unit tests in
//!   `model::structure_model`.
//! - Optimizer behavior — covered by `optimizer_pipeline`.

mod common;

use common::{
    CoalescentIntensityEngine, DiversityEngine, diversity_statistic, init_logging,
    intensity_statistic,
};
use demographic_inference::engine::DemographicEngine;
use demographic_inference::model::{StructureDemographicModel, StructureOptions};
use demographic_inference::variables::ParamValue;
use rand::SeedableRng;
use rand::rngs::StdRng;

const TEST_STRUCTURES: [&[usize]; 6] = [&[1], &[2], &[1, 1], &[2, 1], &[1, 2], &[1, 1, 1]];

const RK4_STEPS_PER_UNIT: usize = 16;

/// Purpose
/// -------
/// Enumerate all 32 option combinations so every grid test sweeps the
/// full flag space.
fn all_option_combos() -> Vec<StructureOptions> {
    let mut combos = Vec::with_capacity(32);
    for bits in 0u8..32 {
        combos.push(StructureOptions {
            have_migs: bits & 1 != 0,
            have_sels: bits & 2 != 0,
            have_dyns: bits & 4 != 0,
            sym_migs: bits & 8 != 0,
            frac_split: bits & 16 != 0,
        });
    }
    combos
}

/// Purpose
/// -------
/// Build a model whose final structure leaves one growth step open in
/// every phase, so any single-phase increase is a valid transition.
fn growable_model(structure: &[usize], options: StructureOptions) -> StructureDemographicModel {
    let final_structure: Vec<usize> = structure.iter().map(|&s| s + 1).collect();
    StructureDemographicModel::new(structure, &final_structure, options)
        .expect("valid structure pair")
}

/// Both engine statistics for one model and vector.
fn statistics(model: &StructureDemographicModel, x: &[ParamValue]) -> (f64, f64) {
    let history = model.to_history(x).expect("history assembly");
    (intensity_statistic(&history), diversity_statistic(&history, RK4_STEPS_PER_UNIT))
}

// Purpose: growing any single phase preserves both statistics exactly.
// The appended epoch has zero duration, so its contribution to either
// integral is exactly zero.
// Given: every test structure, every option combination, a seeded random
// vector, and every growable phase.
// Expect: bitwise-equal statistics before and after the remap.
#[test]
fn single_phase_growth_preserves_both_statistics() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for structure in TEST_STRUCTURES {
        for options in all_option_combos() {
            let model = growable_model(structure, options);
            let x = model.resample_vector(&mut rng).expect("resample");
            let (intensity_before, diversity_before) = statistics(&model, &x);

            for phase in 0..structure.len() {
                let mut target = structure.to_vec();
                target[phase] += 1;
                let (grown, remapped) = model
                    .increase_structure(Some(&target), std::slice::from_ref(&x))
                    .expect("valid increase");
                let (intensity_after, diversity_after) = statistics(&grown, &remapped[0]);

                assert_eq!(
                    intensity_before, intensity_after,
                    "intensity changed: {structure:?} -> {target:?}, {options:?}"
                );
                assert_eq!(
                    diversity_before, diversity_after,
                    "diversity changed: {structure:?} -> {target:?}, {options:?}"
                );
            }
        }
    }
}

// Purpose: the default growth direction chains all the way to the final
// structure while preserving the statistics at every step.
// Given: a model two steps below its final structure in every phase.
// Expect: each default increase targets the first phase still below
// final, and the statistics never change along the chain.
#[test]
fn default_growth_chains_to_the_final_structure() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0xfeed);
    let options = StructureOptions {
        have_migs: true,
        have_sels: true,
        have_dyns: true,
        ..Default::default()
    };
    let initial = [1usize, 1];
    let final_structure = [3usize, 3];
    let mut model =
        StructureDemographicModel::new(&initial, &final_structure, options).expect("model");
    let mut x = model.resample_vector(&mut rng).expect("resample");
    let (intensity, diversity) = statistics(&model, &x);

    let mut steps = 0;
    while model.current_structure() != &final_structure[..] {
        let (grown, mut remapped) =
            model.increase_structure(None, std::slice::from_ref(&x)).expect("default increase");
        x = remapped.pop().expect("one vector in, one out");
        model = grown;
        steps += 1;

        let (intensity_now, diversity_now) = statistics(&model, &x);
        assert_eq!(intensity, intensity_now, "intensity drifted at step {steps}");
        assert_eq!(diversity, diversity_now, "diversity drifted at step {steps}");
    }
    assert_eq!(steps, 4);
    assert!(model.increase_structure(None, &[]).is_err(), "growth past final must fail");
}

// Purpose: growth remaps every vector in a batch, not just one.
#[test]
fn growth_remaps_whole_batches() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(42);
    let options = StructureOptions { have_migs: true, ..Default::default() };
    let model = growable_model(&[2, 1], options);
    let xs: Vec<Vec<ParamValue>> =
        (0..5).map(|_| model.resample_vector(&mut rng).expect("resample")).collect();
    let before: Vec<f64> = xs.iter().map(|x| statistics(&model, x).0).collect();

    let (grown, remapped) = model.increase_structure(None, &xs).expect("increase");

    assert_eq!(remapped.len(), xs.len());
    for (x, &expected) in remapped.iter().zip(&before) {
        assert_eq!(statistics(&grown, x).0, expected);
    }
}

// Purpose: the engine trait path scores and simulates through an attached
// model, and the log-likelihood peaks at the data-generating vector.
// Given: both engines with a model and data simulated at a known vector.
// Expect: evaluate at the true vector returns 0 (a perfect fit), and a
// perturbed vector scores strictly worse.
#[test]
fn engines_score_through_the_trait() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(7);
    let options = StructureOptions { have_migs: true, have_dyns: true, ..Default::default() };
    let model = growable_model(&[2, 2], options);
    let truth = model.resample_vector(&mut rng).expect("resample");
    let other = model.resample_vector(&mut rng).expect("resample");
    let args = [RK4_STEPS_PER_UNIT];

    let mut intensity_engine = CoalescentIntensityEngine::default();
    intensity_engine.set_model(model.clone());
    let data = intensity_engine.simulate(&truth, &[], &args).expect("simulate");
    intensity_engine.set_data(data);

    let mut diversity_engine = DiversityEngine::default();
    diversity_engine.set_model(model.clone());
    let diversity_data = diversity_engine.simulate(&truth, &[], &args).expect("simulate");
    diversity_engine.set_data(diversity_data);

    for engine in [
        &intensity_engine as &dyn DemographicEngine<Data = f64>,
        &diversity_engine as &dyn DemographicEngine<Data = f64>,
    ] {
        let at_truth = engine.evaluate(&truth, &args).expect("evaluate");
        let elsewhere = engine.evaluate(&other, &args).expect("evaluate");
        assert_eq!(at_truth, 0.0, "{}: perfect fit must score zero", engine.id());
        assert!(elsewhere < at_truth, "{}: wrong vector must score worse", engine.id());
    }
}

// Purpose: evaluating without attached data is an engine failure, not a
// panic.
#[test]
fn evaluate_without_data_fails_cleanly() {
    init_logging();
    let model = growable_model(&[2], StructureOptions::default());
    let x = vec![ParamValue::Float(1.0), ParamValue::Float(2.0)];
    let mut engine = CoalescentIntensityEngine::default();
    engine.set_model(model);
    assert!(engine.evaluate(&x, &[]).is_err());
}

// Purpose: growth adds exactly the appended epoch's variables and keeps
// every surviving value in place.
// Given: a two-phase model with all families enabled.
// Expect: the remapped vector embeds the original values in schema order
// and the new epoch's values are the documented defaults.
#[test]
fn remapped_vectors_copy_surviving_values() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(11);
    let options = StructureOptions {
        have_migs: true,
        have_sels: true,
        have_dyns: true,
        ..Default::default()
    };
    let model = growable_model(&[1, 1], options);
    let x = model.resample_vector(&mut rng).expect("resample");

    // Grow phase 1: its only epoch's sizes, migrations and selections are
    // copied into the appended epoch.
    let (grown, remapped) =
        model.increase_structure(Some(&[1, 2]), std::slice::from_ref(&x)).expect("increase");
    let y = &remapped[0];

    assert_eq!(grown.n_variables(), y.len());
    // Original values survive as a prefix: phase 0 has no variable epochs
    // at structure 1, so the old vector is split variables plus one epoch.
    assert_eq!(&y[..x.len()], &x[..]);
    // The appended epoch: zero duration, then copies of the previous
    // epoch's sizes (2), migrations (2) and selections (2), then Sudden
    // dynamics (2).
    let appended = &y[x.len()..];
    assert_eq!(appended[0], ParamValue::Float(0.0));
    assert_eq!(appended.len(), 1 + 2 + 2 + 2 + 2);
    let previous_tail = &x[x.len() - 9..]; // t, nu x2, m x2, g x2, dyn x2
    assert_eq!(&appended[1..7], &previous_tail[1..7]);
    for value in &appended[7..] {
        assert!(matches!(value, ParamValue::Dynamic(_)));
    }
}
