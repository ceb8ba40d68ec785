//! Structured demographic models.
//!
//! Purpose
//! -------
//! Generate a typed variable list from a structure vector plus option
//! flags, assemble parameter vectors into resolved
//! [`DemographicHistory`](crate::model::history::DemographicHistory)
//! values, and grow the structure one interval at a time while preserving
//! the history every parameter vector describes.
//!
//! Key behaviors
//! -------------
//! - Variable generation is deterministic and recorded in a positional
//!   [`StructureSchema`], so remapping across a structure increase is a
//!   pure vector-to-vector function.
//! - [`StructureDemographicModel::increase_structure`] appends a
//!   zero-duration constant epoch at the end of the grown phase; the new
//!   parameter vector describes the same history as the old one.
//!
//! Invariants & assumptions
//! ------------------------
//! - Phase `p` (0-based) runs with `p + 1` populations; phase 0 spends its
//!   first interval as the ancestral population at genetic size 1 and only
//!   its remaining intervals carry variables.
//! - Split `p` divides the last extant population; with `frac_split` the
//!   daughters get `f * P` and `(1 - f) * P` of the parent size `P`,
//!   otherwise two free size variables.
//! - Within an epoch, variables appear as time, sizes, migrations,
//!   selections, dynamics; epochs are numbered globally starting at 1.

use rand::Rng;

use crate::model::{
    errors::{ModelError, ModelResult},
    history::{DemographicHistory, Epoch, Event, Split},
    structure,
};
use crate::variables::{ContinuousVariable, DynamicKind, DynamicVariable, ParamValue, Variable};

// ---- Options --------------------------------------------------------------

/// Which optional parameter families the generated model carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructureOptions {
    /// Per-epoch migration rates between extant populations.
    pub have_migs: bool,
    /// Per-epoch, per-population selection coefficients.
    pub have_sels: bool,
    /// Per-epoch, per-population size dynamics.
    pub have_dyns: bool,
    /// One migration variable per unordered pair instead of per ordered
    /// pair.
    pub sym_migs: bool,
    /// Splits parameterized by a fraction of the parent size instead of
    /// two free sizes.
    pub frac_split: bool,
}

// ---- Schema ---------------------------------------------------------------

/// Positions of a split's variables in the parameter vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitSchema {
    /// Index of the fraction variable.
    Fraction(usize),
    /// Indices of the two daughter-size variables.
    Sizes(usize, usize),
}

/// Positions of one epoch's variables in the parameter vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochSchema {
    pub time: usize,
    pub sizes: Vec<usize>,
    /// Migration variables in canonical pair order (see
    /// [`migration_pairs`]).
    pub migs: Vec<usize>,
    pub sels: Vec<usize>,
    pub dyns: Vec<usize>,
}

/// Positions of one phase's variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSchema {
    pub split: Option<SplitSchema>,
    pub epochs: Vec<EpochSchema>,
}

/// Positional layout of a generated variable list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureSchema {
    pub phases: Vec<PhaseSchema>,
    pub n_vars: usize,
}

/// Canonical iteration order of migration variables for `n_pop`
/// populations: `(j, k)` pairs, 1-based, row-major; `j < k` when
/// symmetric, `j != k` otherwise.
pub fn migration_pairs(n_pop: usize, symmetric: bool) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for j in 1..=n_pop {
        let start = if symmetric { j + 1 } else { 1 };
        for k in start..=n_pop {
            if k != j {
                pairs.push((j, k));
            }
        }
    }
    pairs
}

// ---- Variable generation --------------------------------------------------

fn push_epoch_variables(
    variables: &mut Vec<Variable>, epoch_no: usize, n_pop: usize, options: StructureOptions,
) -> EpochSchema {
    let time = variables.len();
    variables.push(Variable::Continuous(ContinuousVariable::time(&format!("t{epoch_no}"))));

    let mut sizes = Vec::with_capacity(n_pop);
    for j in 1..=n_pop {
        sizes.push(variables.len());
        variables.push(Variable::Continuous(ContinuousVariable::population_size(&format!(
            "nu{epoch_no}{j}"
        ))));
    }

    let mut migs = Vec::new();
    if options.have_migs && n_pop > 1 {
        for (j, k) in migration_pairs(n_pop, options.sym_migs) {
            migs.push(variables.len());
            variables.push(Variable::Continuous(ContinuousVariable::migration(&format!(
                "m{epoch_no}_{j}{k}"
            ))));
        }
    }

    let mut sels = Vec::new();
    if options.have_sels {
        for j in 1..=n_pop {
            sels.push(variables.len());
            variables.push(Variable::Continuous(ContinuousVariable::selection(&format!(
                "g{epoch_no}{j}"
            ))));
        }
    }

    let mut dyns = Vec::new();
    if options.have_dyns {
        for j in 1..=n_pop {
            dyns.push(variables.len());
            variables.push(Variable::Dynamic(DynamicVariable::new(&format!("dyn{epoch_no}{j}"))));
        }
    }

    EpochSchema { time, sizes, migs, sels, dyns }
}

fn generate_variables(
    structure: &[usize], options: StructureOptions,
) -> (Vec<Variable>, StructureSchema) {
    let mut variables = Vec::new();
    let mut phases = Vec::with_capacity(structure.len());
    let mut epoch_no = 0usize;

    for (phase, &intervals) in structure.iter().enumerate() {
        let n_pop = phase + 1;

        let split = if phase == 0 {
            None
        } else if options.frac_split {
            let index = variables.len();
            variables
                .push(Variable::Continuous(ContinuousVariable::fraction(&format!("s{phase}"))));
            Some(SplitSchema::Fraction(index))
        } else {
            let first = variables.len();
            variables.push(Variable::Continuous(ContinuousVariable::population_size(&format!(
                "s{phase}_1"
            ))));
            variables.push(Variable::Continuous(ContinuousVariable::population_size(&format!(
                "s{phase}_2"
            ))));
            Some(SplitSchema::Sizes(first, first + 1))
        };

        // The ancestral steady interval of phase 0 carries no variables.
        let var_epochs = if phase == 0 { intervals - 1 } else { intervals };
        let mut epochs = Vec::with_capacity(var_epochs);
        for _ in 0..var_epochs {
            epoch_no += 1;
            epochs.push(push_epoch_variables(&mut variables, epoch_no, n_pop, options));
        }

        phases.push(PhaseSchema { split, epochs });
    }

    let n_vars = variables.len();
    (variables, StructureSchema { phases, n_vars })
}

// ---- The model ------------------------------------------------------------

/// A demographic model whose parameter list grows with its structure.
#[derive(Debug, Clone)]
pub struct StructureDemographicModel {
    initial_structure: Vec<usize>,
    final_structure: Vec<usize>,
    current_structure: Vec<usize>,
    options: StructureOptions,
    variables: Vec<Variable>,
    schema: StructureSchema,
}

impl StructureDemographicModel {
    /// Build a model at its initial structure.
    pub fn new(
        initial_structure: &[usize], final_structure: &[usize], options: StructureOptions,
    ) -> ModelResult<Self> {
        structure::validate_structure_pair(initial_structure, final_structure)?;
        let (variables, schema) = generate_variables(initial_structure, options);
        Ok(StructureDemographicModel {
            initial_structure: initial_structure.to_vec(),
            final_structure: final_structure.to_vec(),
            current_structure: initial_structure.to_vec(),
            options,
            variables,
            schema,
        })
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn schema(&self) -> &StructureSchema {
        &self.schema
    }

    pub fn options(&self) -> StructureOptions {
        self.options
    }

    pub fn initial_structure(&self) -> &[usize] {
        &self.initial_structure
    }

    pub fn final_structure(&self) -> &[usize] {
        &self.final_structure
    }

    pub fn current_structure(&self) -> &[usize] {
        &self.current_structure
    }

    pub fn n_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of present-day populations.
    pub fn n_populations(&self) -> usize {
        self.current_structure.len()
    }

    /// Draw one parameter vector uniformly from the variable domains.
    pub fn resample_vector<R: Rng + ?Sized>(&self, rng: &mut R) -> ModelResult<Vec<ParamValue>> {
        self.variables
            .iter()
            .map(|variable| variable.resample(rng).map_err(ModelError::from))
            .collect()
    }

    /// Same bounds, same options, different structure inside the
    /// `[initial, final]` box.
    pub fn from_structure(&self, new_structure: &[usize]) -> ModelResult<Self> {
        structure::validate_within_range(
            new_structure,
            &self.initial_structure,
            &self.final_structure,
        )?;
        let (variables, schema) = generate_variables(new_structure, self.options);
        Ok(StructureDemographicModel {
            initial_structure: self.initial_structure.clone(),
            final_structure: self.final_structure.clone(),
            current_structure: new_structure.to_vec(),
            options: self.options,
            variables,
            schema,
        })
    }

    /// Grow the structure by one interval and remap parameter vectors.
    ///
    /// With `new_structure: None` the first phase still below the final
    /// structure grows. Each vector in `xs` is rewritten for the new
    /// layout; the remapped vector describes exactly the history the old
    /// one did, because the added epoch has zero duration and copies the
    /// surrounding state.
    pub fn increase_structure(
        &self, new_structure: Option<&[usize]>, xs: &[Vec<ParamValue>],
    ) -> ModelResult<(Self, Vec<Vec<ParamValue>>)> {
        let target = match new_structure {
            Some(target) => target.to_vec(),
            None => structure::next_structure(&self.current_structure, &self.final_structure)?,
        };
        let grown = structure::validate_increase_step(&self.current_structure, &target)?;
        structure::validate_within_range(
            &target,
            &self.initial_structure,
            &self.final_structure,
        )?;

        let new_model = self.from_structure(&target)?;
        let mut new_xs = Vec::with_capacity(xs.len());
        for x in xs {
            new_xs.push(self.remap_vector(x, &new_model, grown)?);
        }
        Ok((new_model, new_xs))
    }

    /// Resolve a parameter vector into an ordered event history.
    pub fn to_history(&self, x: &[ParamValue]) -> ModelResult<DemographicHistory> {
        self.check_params(x)?;
        let mut sizes = vec![1.0f64];
        let mut events = Vec::new();

        for (phase, phase_schema) in self.schema.phases.iter().enumerate() {
            let n_pop = phase + 1;

            if let Some(split) = &phase_schema.split {
                let parent = phase - 1;
                let parent_size = sizes[parent];
                let (first, second) = match split {
                    SplitSchema::Fraction(index) => {
                        let fraction = self.float_at(x, *index)?;
                        (fraction * parent_size, (1.0 - fraction) * parent_size)
                    }
                    SplitSchema::Sizes(i1, i2) => (self.float_at(x, *i1)?, self.float_at(x, *i2)?),
                };
                sizes[parent] = first;
                sizes.push(second);
                events.push(Event::Split(Split { parent, daughter_sizes: (first, second) }));
            }

            for epoch in &phase_schema.epochs {
                let duration = self.float_at(x, epoch.time)?;
                let end_sizes = epoch
                    .sizes
                    .iter()
                    .map(|&index| self.float_at(x, index))
                    .collect::<ModelResult<Vec<f64>>>()?;
                let dynamics = if epoch.dyns.is_empty() {
                    vec![DynamicKind::Sudden; n_pop]
                } else {
                    epoch
                        .dyns
                        .iter()
                        .map(|&index| self.dynamic_at(x, index))
                        .collect::<ModelResult<Vec<DynamicKind>>>()?
                };
                let selection = if epoch.sels.is_empty() {
                    vec![0.0; n_pop]
                } else {
                    epoch
                        .sels
                        .iter()
                        .map(|&index| self.float_at(x, index))
                        .collect::<ModelResult<Vec<f64>>>()?
                };
                let migration = self.migration_matrix(x, epoch, n_pop)?;

                events.push(Event::Epoch(Epoch {
                    duration,
                    start_sizes: sizes.clone(),
                    end_sizes: end_sizes.clone(),
                    dynamics,
                    selection,
                    migration,
                }));
                sizes = end_sizes;
            }
        }

        Ok(DemographicHistory { events, n_populations: self.current_structure.len() })
    }

    /// Validate a parameter vector's length and per-variable value kinds.
    pub fn check_params(&self, x: &[ParamValue]) -> ModelResult<()> {
        if x.len() != self.variables.len() {
            return Err(ModelError::ParamLengthMismatch {
                expected: self.variables.len(),
                actual: x.len(),
            });
        }
        for (index, (variable, value)) in self.variables.iter().zip(x).enumerate() {
            let matches = match (variable, value) {
                (Variable::Dynamic(_), ParamValue::Dynamic(_)) => true,
                (Variable::Dynamic(_), ParamValue::Float(_)) => false,
                (_, ParamValue::Float(_)) => true,
                (_, ParamValue::Dynamic(_)) => false,
            };
            if !matches {
                return Err(ModelError::ParamTypeMismatch {
                    index,
                    name: variable.name().to_string(),
                    expected: if matches!(variable, Variable::Dynamic(_)) {
                        "a dynamics value"
                    } else {
                        "a float"
                    },
                });
            }
        }
        Ok(())
    }

    // ---- Internal helpers -------------------------------------------------

    fn float_at(&self, x: &[ParamValue], index: usize) -> ModelResult<f64> {
        x[index].as_float().ok_or_else(|| ModelError::ParamTypeMismatch {
            index,
            name: self.variables[index].name().to_string(),
            expected: "a float",
        })
    }

    fn dynamic_at(&self, x: &[ParamValue], index: usize) -> ModelResult<DynamicKind> {
        x[index].as_dynamic().ok_or_else(|| ModelError::ParamTypeMismatch {
            index,
            name: self.variables[index].name().to_string(),
            expected: "a dynamics value",
        })
    }

    fn migration_matrix(
        &self, x: &[ParamValue], epoch: &EpochSchema, n_pop: usize,
    ) -> ModelResult<Vec<Vec<f64>>> {
        if n_pop < 2 {
            return Ok(Vec::new());
        }
        let mut matrix = vec![vec![0.0; n_pop]; n_pop];
        if !epoch.migs.is_empty() {
            let pairs = migration_pairs(n_pop, self.options.sym_migs);
            for ((j, k), &index) in pairs.into_iter().zip(&epoch.migs) {
                let rate = self.float_at(x, index)?;
                matrix[j - 1][k - 1] = rate;
                if self.options.sym_migs {
                    matrix[k - 1][j - 1] = rate;
                }
            }
        }
        Ok(matrix)
    }

    /// Rewrite `x` for `new_model`, which adds one interval to phase
    /// `grown`.
    ///
    /// The appended epoch is constant and instantaneous: duration at the
    /// time domain's lower bound, end sizes copied from the phase's last
    /// epoch (ancestral size 1 when phase 0 had none), `Sudden` dynamics,
    /// migration and selection copied (zero selection without a source
    /// epoch). Every assigned value already lies in its variable's domain.
    fn remap_vector(
        &self, x: &[ParamValue], new_model: &Self, grown: usize,
    ) -> ModelResult<Vec<ParamValue>> {
        self.check_params(x)?;
        let mut out = Vec::with_capacity(new_model.schema.n_vars);

        for (phase, (old_phase, new_phase)) in
            self.schema.phases.iter().zip(&new_model.schema.phases).enumerate()
        {
            match &old_phase.split {
                Some(SplitSchema::Fraction(index)) => out.push(x[*index]),
                Some(SplitSchema::Sizes(i1, i2)) => {
                    out.push(x[*i1]);
                    out.push(x[*i2]);
                }
                None => {}
            }

            for epoch in &old_phase.epochs {
                out.push(x[epoch.time]);
                for &index in &epoch.sizes {
                    out.push(x[index]);
                }
                for &index in &epoch.migs {
                    out.push(x[index]);
                }
                for &index in &epoch.sels {
                    out.push(x[index]);
                }
                for &index in &epoch.dyns {
                    out.push(x[index]);
                }
            }

            if phase == grown {
                let appended = new_phase
                    .epochs
                    .last()
                    .ok_or(ModelError::InvalidTransition {
                        current: self.current_structure.clone(),
                        target: new_model.current_structure.clone(),
                    })?;
                let time_low = new_model.variables[appended.time].get_bounds()?[0];
                out.push(ParamValue::Float(time_low));

                match old_phase.epochs.last() {
                    Some(previous) => {
                        for &index in &previous.sizes {
                            out.push(x[index]);
                        }
                        for &index in &previous.migs {
                            out.push(x[index]);
                        }
                        for &index in &previous.sels {
                            out.push(x[index]);
                        }
                    }
                    None => {
                        // Phase 0 grew out of its ancestral steady
                        // interval.
                        for _ in 0..appended.sizes.len() {
                            out.push(ParamValue::Float(1.0));
                        }
                        for _ in 0..appended.sels.len() {
                            out.push(ParamValue::Float(0.0));
                        }
                    }
                }
                for _ in 0..appended.dyns.len() {
                    out.push(ParamValue::Dynamic(DynamicKind::Sudden));
                }
            }
        }

        Ok(out)
    }
}
