//! Reference engines for the integration suites.
//!
//! Two deliberately different backends score resolved histories:
//!
//! - [`CoalescentIntensityEngine`] integrates `1/N(t)` and `N(t)` in
//!   closed form per epoch, so its statistic is exact.
//! - [`DiversityEngine`] integrates a within-population diversity ODE
//!   with fixed-step RK4, stepping each epoch separately.
//!
//! Both statistics are integrals over the history, so a zero-duration
//! epoch contributes exactly nothing; that is the property the structure
//! growth suite leans on.

// Each integration suite compiles this module separately and uses a
// subset of it.
#![allow(dead_code)]

use demographic_inference::engine::DemographicEngine;
use demographic_inference::model::{
    DemographicHistory, Epoch, Event, ModelError, ModelResult, StructureDemographicModel,
};
use demographic_inference::variables::{DynamicKind, ParamValue};
use ndarray::Array1;

// ---- Shared plumbing ------------------------------------------------------

/// Install the test logger once; later calls are no-ops. Run with
/// `RUST_LOG=trace` to see the per-evaluation mirror.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn params_from_array(x: &Array1<f64>) -> Vec<ParamValue> {
    x.iter().map(|&v| ParamValue::Float(v)).collect()
}

fn model_or_fail<'a>(
    model: &'a Option<StructureDemographicModel>, id: &'static str,
) -> ModelResult<&'a StructureDemographicModel> {
    model
        .as_ref()
        .ok_or(ModelError::EngineFailure { id, text: "no model attached".to_string() })
}

fn squared_error_loglik(stat: f64, data: f64) -> f64 {
    -(stat - data) * (stat - data)
}

// ---- Closed-form coalescent-intensity engine ------------------------------

/// Exact per-epoch integrals of `1/N_j(t)` and `N_j(t)`.
fn epoch_integrals(epoch: &Epoch, j: usize) -> (f64, f64) {
    let t = epoch.duration;
    if t == 0.0 {
        return (0.0, 0.0);
    }
    let a = epoch.start_sizes[j];
    let b = epoch.end_sizes[j];
    match epoch.dynamics[j] {
        DynamicKind::Sudden => (t / b, t * b),
        DynamicKind::Linear => {
            let inv = if a == b { t / a } else { t * (b.ln() - a.ln()) / (b - a) };
            (inv, t * (a + b) / 2.0)
        }
        DynamicKind::Exponential => {
            if a == b {
                (t / a, t * a)
            } else {
                let r = (b / a).ln();
                (t * (1.0 / a - 1.0 / b) / r, t * (b - a) / r)
            }
        }
    }
}

/// Exact integral statistic over a history: coalescent intensity plus
/// heterozygosity mass plus migration and selection exposure.
pub fn intensity_statistic(history: &DemographicHistory) -> f64 {
    let mut stat = history.n_populations as f64;
    for epoch in history.epochs() {
        for j in 0..epoch.n_populations() {
            let (intensity, mass) = epoch_integrals(epoch, j);
            stat += intensity + 1e-2 * mass;
            stat += 0.1 * epoch.selection[j] * epoch.duration;
        }
        for row in &epoch.migration {
            for &rate in row {
                stat += 0.05 * rate * epoch.duration;
            }
        }
    }
    stat
}

#[derive(Default)]
pub struct CoalescentIntensityEngine {
    model: Option<StructureDemographicModel>,
    data: Option<f64>,
}

impl DemographicEngine for CoalescentIntensityEngine {
    type Data = f64;

    fn id(&self) -> &'static str {
        "coalescent-intensity"
    }

    fn set_model(&mut self, model: StructureDemographicModel) {
        self.model = Some(model);
    }

    fn set_data(&mut self, data: f64) {
        self.data = Some(data);
    }

    fn evaluate(&self, x: &[ParamValue], args: &[usize]) -> ModelResult<f64> {
        let data = self.data.ok_or(ModelError::EngineFailure {
            id: self.id(),
            text: "no data attached".to_string(),
        })?;
        let stat = self.simulate(x, &[], args)?;
        Ok(squared_error_loglik(stat, data))
    }

    fn simulate(&self, x: &[ParamValue], _sizes: &[usize], _args: &[usize]) -> ModelResult<f64> {
        let model = model_or_fail(&self.model, self.id())?;
        Ok(intensity_statistic(&model.to_history(x)?))
    }
}

// ---- RK4 diversity engine -------------------------------------------------

/// Within-population diversity ODE:
/// `dX_j/dt = 1 - X_j / N_j(t) + sum_k m_kj (X_k - X_j)`.
fn diversity_derivative(epoch: &Epoch, t: f64, state: &[f64]) -> Vec<f64> {
    let n_pop = epoch.n_populations();
    let mut derivative = vec![0.0; n_pop];
    for j in 0..n_pop {
        let size = epoch.size_at(j, t);
        derivative[j] = 1.0 - state[j] / size;
        for k in 0..n_pop {
            if k != j && !epoch.migration.is_empty() {
                derivative[j] += epoch.migration[k][j] * (state[k] - state[j]);
            }
        }
        // Selection drains diversity proportionally.
        derivative[j] -= 0.1 * epoch.selection[j] * state[j];
    }
    derivative
}

fn rk4_epoch(epoch: &Epoch, state: &mut Vec<f64>, steps_per_unit: usize) {
    if epoch.duration == 0.0 {
        return;
    }
    let steps = ((epoch.duration * steps_per_unit as f64).ceil() as usize).max(1);
    let h = epoch.duration / steps as f64;
    for step in 0..steps {
        let t = step as f64 * h;
        let k1 = diversity_derivative(epoch, t, state);
        let mid1: Vec<f64> =
            state.iter().zip(&k1).map(|(&x, &k)| x + 0.5 * h * k).collect();
        let k2 = diversity_derivative(epoch, t + 0.5 * h, &mid1);
        let mid2: Vec<f64> =
            state.iter().zip(&k2).map(|(&x, &k)| x + 0.5 * h * k).collect();
        let k3 = diversity_derivative(epoch, t + 0.5 * h, &mid2);
        let end: Vec<f64> = state.iter().zip(&k3).map(|(&x, &k)| x + h * k).collect();
        let k4 = diversity_derivative(epoch, t + h, &end);
        for j in 0..state.len() {
            state[j] += h / 6.0 * (k1[j] + 2.0 * k2[j] + 2.0 * k3[j] + k4[j]);
        }
    }
}

/// RK4 diversity statistic: final per-population diversity values summed.
pub fn diversity_statistic(history: &DemographicHistory, steps_per_unit: usize) -> f64 {
    // Ancestral equilibrium of the ODE at size 1.
    let mut state = vec![1.0];
    for event in &history.events {
        match event {
            Event::Split(split) => {
                let parent_value = state[split.parent];
                state.push(parent_value);
            }
            Event::Epoch(epoch) => rk4_epoch(epoch, &mut state, steps_per_unit),
        }
    }
    state.iter().sum::<f64>() + history.n_populations as f64
}

#[derive(Default)]
pub struct DiversityEngine {
    model: Option<StructureDemographicModel>,
    data: Option<f64>,
}

impl DemographicEngine for DiversityEngine {
    type Data = f64;

    fn id(&self) -> &'static str {
        "rk4-diversity"
    }

    fn set_model(&mut self, model: StructureDemographicModel) {
        self.model = Some(model);
    }

    fn set_data(&mut self, data: f64) {
        self.data = Some(data);
    }

    fn evaluate(&self, x: &[ParamValue], args: &[usize]) -> ModelResult<f64> {
        let data = self.data.ok_or(ModelError::EngineFailure {
            id: self.id(),
            text: "no data attached".to_string(),
        })?;
        let stat = self.simulate(x, &[], args)?;
        Ok(squared_error_loglik(stat, data))
    }

    fn simulate(&self, x: &[ParamValue], _sizes: &[usize], args: &[usize]) -> ModelResult<f64> {
        let model = model_or_fail(&self.model, self.id())?;
        let steps_per_unit = args.first().copied().unwrap_or(20);
        Ok(diversity_statistic(&model.to_history(x)?, steps_per_unit))
    }
}
