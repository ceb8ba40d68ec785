//! Typed, unit-aware model variables.
//!
//! Purpose
//! -------
//! Define the variable vocabulary the model layer is generated from:
//! continuous variables with a demographic class and units, discrete numeric
//! variables, and discrete variables over epoch dynamics.
//!
//! Key behaviors
//! -------------
//! - Every continuous class carries a default domain in genetic units, taken
//!   as public constants so configuration layers can reference them.
//! - Population sizes, times and migration rates are units-aware and
//!   translate between genetic and physical units through the ancestral
//!   population size `N_A`; selection coefficients and fractions are
//!   universal and never rescale.
//! - `resample` draws uniformly from the domain; `correct_value` clamps a
//!   continuous value into its domain and validates a discrete one.
//!
//! Invariants & assumptions
//! ------------------------
//! - Domains are ordered (`low <= high`) and NaN-free; constructors reject
//!   anything else.
//! - Variable identity is name plus kind: two variables compare equal when
//!   their names, kinds and (for continuous variables) classes agree,
//!   regardless of domain or units.
//! - Translation factors: size `physical = genetic * N_A`, time
//!   `physical = genetic * 2 N_A`, migration `physical = genetic / (2 N_A)`.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::variables::{
    dynamics::DynamicKind,
    errors::{VarError, VarResult},
};

// ---- Default genetic-unit domains -----------------------------------------

/// Default domain of population-size variables, in genetic units.
pub const POPULATION_SIZE_DOMAIN: [f64; 2] = [1e-2, 100.0];
/// Default domain of epoch-time variables, in genetic units.
pub const TIME_DOMAIN: [f64; 2] = [0.0, 5.0];
/// Default domain of migration-rate variables, in genetic units.
pub const MIGRATION_DOMAIN: [f64; 2] = [0.0, 10.0];
/// Default domain of selection coefficients (universal units).
pub const SELECTION_DOMAIN: [f64; 2] = [0.0, 10.0];
/// Default domain of split fractions (universal units).
pub const FRACTION_DOMAIN: [f64; 2] = [0.0, 1.0];

/// Default ancestral-size domain used when translating whole domains
/// between unit systems. Matches the population-size genetic default.
pub const DEFAULT_N_A_DOMAIN: [f64; 2] = POPULATION_SIZE_DOMAIN;

// ---- Units and classes ----------------------------------------------------

/// Unit system a variable's values are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    /// Dimensionless; translation is a no-op.
    Universal,
    /// Scaled by the ancestral population size (coalescent units).
    Genetic,
    /// Individuals and generations.
    Physical,
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Units::Universal => write!(f, "universal"),
            Units::Genetic => write!(f, "genetic"),
            Units::Physical => write!(f, "physical"),
        }
    }
}

/// Demographic meaning of a continuous variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableClass {
    PopulationSize,
    Time,
    Migration,
    Selection,
    Fraction,
}

impl VariableClass {
    /// Default domain in the class's natural units (genetic for the
    /// units-aware classes, universal otherwise).
    pub fn default_domain(&self) -> [f64; 2] {
        match self {
            VariableClass::PopulationSize => POPULATION_SIZE_DOMAIN,
            VariableClass::Time => TIME_DOMAIN,
            VariableClass::Migration => MIGRATION_DOMAIN,
            VariableClass::Selection => SELECTION_DOMAIN,
            VariableClass::Fraction => FRACTION_DOMAIN,
        }
    }

    /// Whether values of this class rescale between genetic and physical
    /// units.
    pub fn is_units_aware(&self) -> bool {
        matches!(
            self,
            VariableClass::PopulationSize | VariableClass::Time | VariableClass::Migration
        )
    }

    fn genetic_to_physical(&self, value: f64, n_a: f64) -> f64 {
        match self {
            VariableClass::PopulationSize => value * n_a,
            VariableClass::Time => value * 2.0 * n_a,
            VariableClass::Migration => value / (2.0 * n_a),
            VariableClass::Selection | VariableClass::Fraction => value,
        }
    }

    fn physical_to_genetic(&self, value: f64, n_a: f64) -> f64 {
        match self {
            VariableClass::PopulationSize => value / n_a,
            VariableClass::Time => value / (2.0 * n_a),
            VariableClass::Migration => value * 2.0 * n_a,
            VariableClass::Selection | VariableClass::Fraction => value,
        }
    }
}

// ---- Parameter values -----------------------------------------------------

/// A single model parameter value: a float for continuous/discrete
/// variables, a dynamics tag for dynamics variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f64),
    Dynamic(DynamicKind),
}

impl ParamValue {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Dynamic(_) => None,
        }
    }

    pub fn as_dynamic(&self) -> Option<DynamicKind> {
        match self {
            ParamValue::Float(_) => None,
            ParamValue::Dynamic(d) => Some(*d),
        }
    }
}

/// Broad kind of a variable's value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Continuous,
    Discrete,
}

// ---- Continuous variables -------------------------------------------------

/// A continuous variable with a demographic class, units and a domain.
#[derive(Debug, Clone)]
pub struct ContinuousVariable {
    name: String,
    class: VariableClass,
    units: Units,
    domain: [f64; 2],
}

impl ContinuousVariable {
    /// Build a continuous variable, validating units against the class and
    /// the domain against ordering.
    ///
    /// `domain: None` selects the class default, translated to physical
    /// units against [`DEFAULT_N_A_DOMAIN`] when `units` is physical.
    pub fn new(
        name: &str, class: VariableClass, units: Units, domain: Option<[f64; 2]>,
    ) -> VarResult<Self> {
        if !class.is_units_aware() && units != Units::Universal {
            return Err(VarError::UnsupportedUnits {
                name: name.to_string(),
                reason: "selection and fraction variables carry universal units only",
            });
        }
        if class.is_units_aware() && units == Units::Universal {
            return Err(VarError::UnsupportedUnits {
                name: name.to_string(),
                reason: "units-aware variables must be genetic or physical",
            });
        }
        let domain = match domain {
            Some(d) => d,
            None => {
                let d = class.default_domain();
                match units {
                    Units::Physical => [
                        class.genetic_to_physical(d[0], DEFAULT_N_A_DOMAIN[0]),
                        class.genetic_to_physical(d[1], DEFAULT_N_A_DOMAIN[1]),
                    ],
                    Units::Genetic | Units::Universal => d,
                }
            }
        };
        Self::check_domain(name, domain)?;
        Ok(ContinuousVariable { name: name.to_string(), class, units, domain })
    }

    /// Population size in genetic units with the default domain.
    pub fn population_size(name: &str) -> Self {
        ContinuousVariable {
            name: name.to_string(),
            class: VariableClass::PopulationSize,
            units: Units::Genetic,
            domain: POPULATION_SIZE_DOMAIN,
        }
    }

    /// Epoch time in genetic units with the default domain.
    pub fn time(name: &str) -> Self {
        ContinuousVariable {
            name: name.to_string(),
            class: VariableClass::Time,
            units: Units::Genetic,
            domain: TIME_DOMAIN,
        }
    }

    /// Migration rate in genetic units with the default domain.
    pub fn migration(name: &str) -> Self {
        ContinuousVariable {
            name: name.to_string(),
            class: VariableClass::Migration,
            units: Units::Genetic,
            domain: MIGRATION_DOMAIN,
        }
    }

    /// Selection coefficient (universal units) with the default domain.
    pub fn selection(name: &str) -> Self {
        ContinuousVariable {
            name: name.to_string(),
            class: VariableClass::Selection,
            units: Units::Universal,
            domain: SELECTION_DOMAIN,
        }
    }

    /// Split fraction (universal units) with the default domain.
    pub fn fraction(name: &str) -> Self {
        ContinuousVariable {
            name: name.to_string(),
            class: VariableClass::Fraction,
            units: Units::Universal,
            domain: FRACTION_DOMAIN,
        }
    }

    /// Same name and class, domain replaced. Used by optimizer wrappers
    /// that relax bounds.
    pub fn with_domain(&self, domain: [f64; 2]) -> VarResult<Self> {
        Self::check_domain(&self.name, domain)?;
        Ok(ContinuousVariable { domain, ..self.clone() })
    }

    fn check_domain(name: &str, domain: [f64; 2]) -> VarResult<()> {
        if domain[0].is_nan() || domain[1].is_nan() {
            return Err(VarError::NanDomain { name: name.to_string() });
        }
        if domain[0] > domain[1] {
            return Err(VarError::ReversedDomain {
                name: name.to_string(),
                low: domain[0],
                high: domain[1],
            });
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> VariableClass {
        self.class
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    /// Uniform draw from the domain.
    pub fn resample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.domain[0] == self.domain[1] {
            return self.domain[0];
        }
        rng.gen_range(self.domain[0]..=self.domain[1])
    }

    /// Clamp a value into the domain.
    pub fn correct_value(&self, value: f64) -> f64 {
        value.clamp(self.domain[0], self.domain[1])
    }

    /// Express `value` (currently in this variable's units) in `target`
    /// units. Universal classes never rescale; a real units change needs
    /// `n_a`.
    pub fn translate_value_into(
        &self, target: Units, value: f64, n_a: Option<f64>,
    ) -> VarResult<f64> {
        if !self.class.is_units_aware() || target == self.units {
            return Ok(value);
        }
        if target == Units::Universal {
            return Err(VarError::UnsupportedUnits {
                name: self.name.clone(),
                reason: "units-aware variables cannot become universal",
            });
        }
        let n_a = n_a.ok_or_else(|| VarError::MissingAncestralSize { name: self.name.clone() })?;
        let translated = match target {
            Units::Physical => self.class.genetic_to_physical(value, n_a),
            Units::Genetic => self.class.physical_to_genetic(value, n_a),
            Units::Universal => unreachable!(),
        };
        Ok(translated)
    }

    /// Translate the whole domain into `target` units, pairing bounds
    /// elementwise with `n_a_domain` (default [`DEFAULT_N_A_DOMAIN`]) so
    /// that a round trip with the same domain is exact.
    pub fn translate_units_to(
        &mut self, target: Units, n_a_domain: Option<[f64; 2]>,
    ) -> VarResult<()> {
        if !self.class.is_units_aware() || target == self.units {
            return Ok(());
        }
        if target == Units::Universal {
            return Err(VarError::UnsupportedUnits {
                name: self.name.clone(),
                reason: "units-aware variables cannot become universal",
            });
        }
        let n_a = n_a_domain.unwrap_or(DEFAULT_N_A_DOMAIN);
        let low = self.translate_value_into(target, self.domain[0], Some(n_a[0]))?;
        let high = self.translate_value_into(target, self.domain[1], Some(n_a[1]))?;
        if low.is_nan() || high.is_nan() {
            return Err(VarError::NanDomain { name: self.name.clone() });
        }
        if low > high {
            return Err(VarError::UnorderedTranslation { name: self.name.clone(), low, high });
        }
        self.domain = [low, high];
        self.units = target;
        Ok(())
    }
}

// ---- Discrete variables ---------------------------------------------------

/// A discrete variable over an explicit numeric value set.
#[derive(Debug, Clone)]
pub struct DiscreteVariable {
    name: String,
    values: Vec<f64>,
}

impl DiscreteVariable {
    pub fn new(name: &str, values: Vec<f64>) -> Self {
        DiscreteVariable { name: name.to_string(), values }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `[min, max]` of the value set; empty sets have no bounds.
    pub fn get_bounds(&self) -> VarResult<[f64; 2]> {
        if self.values.is_empty() {
            return Err(VarError::EmptyDomain { name: self.name.clone() });
        }
        let low = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let high = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok([low, high])
    }

    pub fn resample<R: Rng + ?Sized>(&self, rng: &mut R) -> VarResult<f64> {
        self.values
            .choose(rng)
            .copied()
            .ok_or_else(|| VarError::EmptyDomain { name: self.name.clone() })
    }

    /// Validate membership in the value set.
    pub fn correct_value(&self, value: f64) -> VarResult<f64> {
        if self.values.contains(&value) {
            Ok(value)
        } else {
            Err(VarError::ValueNotInDomain { name: self.name.clone(), value })
        }
    }
}

// ---- Dynamics variables ---------------------------------------------------

/// A discrete variable over epoch dynamics.
#[derive(Debug, Clone)]
pub struct DynamicVariable {
    name: String,
    values: Vec<DynamicKind>,
}

impl DynamicVariable {
    /// All three dynamics.
    pub fn new(name: &str) -> Self {
        DynamicVariable { name: name.to_string(), values: DynamicKind::ALL.to_vec() }
    }

    /// Restricted dynamics set; must be non-empty.
    pub fn with_values(name: &str, values: Vec<DynamicKind>) -> VarResult<Self> {
        if values.is_empty() {
            return Err(VarError::EmptyDomain { name: name.to_string() });
        }
        Ok(DynamicVariable { name: name.to_string(), values })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[DynamicKind] {
        &self.values
    }

    pub fn resample<R: Rng + ?Sized>(&self, rng: &mut R) -> VarResult<DynamicKind> {
        self.values
            .choose(rng)
            .copied()
            .ok_or_else(|| VarError::EmptyDomain { name: self.name.clone() })
    }

    pub fn correct_value(&self, value: DynamicKind) -> VarResult<DynamicKind> {
        if self.values.contains(&value) {
            Ok(value)
        } else {
            Err(VarError::UnsupportedOperation {
                name: self.name.clone(),
                what: "this dynamics value",
            })
        }
    }
}

// ---- The variable enum ----------------------------------------------------

/// Any model variable.
#[derive(Debug, Clone)]
pub enum Variable {
    Continuous(ContinuousVariable),
    Discrete(DiscreteVariable),
    Dynamic(DynamicVariable),
}

impl Variable {
    pub fn name(&self) -> &str {
        match self {
            Variable::Continuous(v) => v.name(),
            Variable::Discrete(v) => v.name(),
            Variable::Dynamic(v) => v.name(),
        }
    }

    pub fn var_type(&self) -> VarType {
        match self {
            Variable::Continuous(_) => VarType::Continuous,
            Variable::Discrete(_) | Variable::Dynamic(_) => VarType::Discrete,
        }
    }

    /// Numeric bounds of the value set. Dynamics variables have none.
    pub fn get_bounds(&self) -> VarResult<[f64; 2]> {
        match self {
            Variable::Continuous(v) => Ok(v.domain()),
            Variable::Discrete(v) => v.get_bounds(),
            Variable::Dynamic(v) => Err(VarError::UnsupportedOperation {
                name: v.name().to_string(),
                what: "numeric bounds",
            }),
        }
    }

    /// Enumerate the value set. Continuous variables cannot.
    pub fn possible_values(&self) -> VarResult<Vec<ParamValue>> {
        match self {
            Variable::Continuous(v) => Err(VarError::UnsupportedOperation {
                name: v.name().to_string(),
                what: "enumeration of possible values",
            }),
            Variable::Discrete(v) => {
                Ok(v.values().iter().map(|&x| ParamValue::Float(x)).collect())
            }
            Variable::Dynamic(v) => {
                Ok(v.values().iter().map(|&d| ParamValue::Dynamic(d)).collect())
            }
        }
    }

    /// Uniform draw from the variable's domain or value set.
    pub fn resample<R: Rng + ?Sized>(&self, rng: &mut R) -> VarResult<ParamValue> {
        match self {
            Variable::Continuous(v) => Ok(ParamValue::Float(v.resample(rng))),
            Variable::Discrete(v) => Ok(ParamValue::Float(v.resample(rng)?)),
            Variable::Dynamic(v) => Ok(ParamValue::Dynamic(v.resample(rng)?)),
        }
    }

    /// Clamp (continuous) or validate (discrete, dynamics) a value.
    pub fn correct_value(&self, value: ParamValue) -> VarResult<ParamValue> {
        match (self, value) {
            (Variable::Continuous(v), ParamValue::Float(x)) => {
                Ok(ParamValue::Float(v.correct_value(x)))
            }
            (Variable::Discrete(v), ParamValue::Float(x)) => {
                Ok(ParamValue::Float(v.correct_value(x)?))
            }
            (Variable::Dynamic(v), ParamValue::Dynamic(d)) => {
                Ok(ParamValue::Dynamic(v.correct_value(d)?))
            }
            (Variable::Dynamic(v), ParamValue::Float(_)) => Err(VarError::UnsupportedOperation {
                name: v.name().to_string(),
                what: "numeric values",
            }),
            (v, ParamValue::Dynamic(_)) => Err(VarError::UnsupportedOperation {
                name: v.name().to_string(),
                what: "dynamics values",
            }),
        }
    }
}

// Identity is name plus kind (plus class for continuous variables); domains
// and units are deliberately ignored.
impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variable::Continuous(a), Variable::Continuous(b)) => {
                a.name() == b.name() && a.class() == b.class()
            }
            (Variable::Discrete(a), Variable::Discrete(b)) => a.name() == b.name(),
            (Variable::Dynamic(a), Variable::Dynamic(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}
