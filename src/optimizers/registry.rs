//! String-id registry of local optimizers.
//!
//! Purpose
//! -------
//! Map stable string identifiers to shared optimizer instances so
//! configuration layers can select a method by name. The stock set mirrors
//! the constrained wrappers around the allow-listed unconstrained methods
//! plus the bounded L-BFGS, each with a `_log` variant.
//!
//! Conventions
//! -----------
//! - Registered instances minimize; callers that maximize construct their
//!   own instance with the flag set.
//! - Duplicate registration and unknown lookups are validation errors,
//!   never silent replacement.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::optimizers::{
    base::LocalOptimizer,
    bounded::BoundedLbfgsOptimizer,
    errors::{OptError, OptResult},
    local::{ArgminUnconstrOptimizer, UnconstrMethod},
    manual::ManuallyConstrOptimizer,
};

/// Optimizer id used when a configuration names none.
pub const DEFAULT_LOCAL_OPTIMIZER: &str = "BFGS_log";

/// Shared, thread-safe optimizer handle.
pub type SharedOptimizer = Arc<dyn LocalOptimizer + Send + Sync>;

/// Id-to-instance map with duplicate protection.
pub struct OptimizerRegistry {
    map: BTreeMap<String, SharedOptimizer>,
}

impl OptimizerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        OptimizerRegistry { map: BTreeMap::new() }
    }

    /// Registry with the stock optimizer set: `Nelder-Mead`, `BFGS`,
    /// `L-BFGS` (manually constrained), `L-BFGS-B`, and their `_log`
    /// variants.
    pub fn with_defaults() -> OptResult<Self> {
        let mut registry = OptimizerRegistry::new();
        for method in [UnconstrMethod::NelderMead, UnconstrMethod::Bfgs, UnconstrMethod::Lbfgs] {
            let inner = ArgminUnconstrOptimizer::new(method, false, false);
            registry.register(
                method.name(),
                Arc::new(ManuallyConstrOptimizer::new(inner, false, false)?),
            )?;
            registry.register(
                &format!("{}_log", method.name()),
                Arc::new(ManuallyConstrOptimizer::new(inner, true, false)?),
            )?;
        }
        registry.register("L-BFGS-B", Arc::new(BoundedLbfgsOptimizer::new(false, false)))?;
        registry.register("L-BFGS-B_log", Arc::new(BoundedLbfgsOptimizer::new(true, false)))?;
        Ok(registry)
    }

    pub fn register(&mut self, id: &str, optimizer: SharedOptimizer) -> OptResult<()> {
        if self.map.contains_key(id) {
            return Err(OptError::DuplicateOptimizer { id: id.to_string() });
        }
        self.map.insert(id.to_string(), optimizer);
        Ok(())
    }

    pub fn get(&self, id: &str) -> OptResult<SharedOptimizer> {
        self.map
            .get(id)
            .cloned()
            .ok_or_else(|| OptError::UnknownOptimizer { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }
}

impl Default for OptimizerRegistry {
    fn default() -> Self {
        // The stock set cannot fail to build: ids are unique and every
        // inner strategy is plain.
        Self::with_defaults().unwrap_or_else(|_| OptimizerRegistry::new())
    }
}

// ---- Global registry ------------------------------------------------------

static GLOBAL: OnceLock<RwLock<OptimizerRegistry>> = OnceLock::new();

fn global() -> &'static RwLock<OptimizerRegistry> {
    GLOBAL.get_or_init(|| RwLock::new(OptimizerRegistry::default()))
}

/// Look up an optimizer in the process-wide registry.
pub fn get_local_optimizer(id: &str) -> OptResult<SharedOptimizer> {
    let registry = global().read().unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.get(id)
}

/// Register an optimizer in the process-wide registry.
pub fn register_local_optimizer(id: &str, optimizer: SharedOptimizer) -> OptResult<()> {
    let mut registry = global().write().unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.register(id, optimizer)
}

/// Ids available in the process-wide registry, sorted.
pub fn local_optimizer_ids() -> Vec<String> {
    let registry = global().read().unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.ids()
}

#[cfg(test)]
mod tests {
    //! Scope
    //! -----
    //! - Stock-id availability and the default optimizer id.
    //! - Duplicate and unknown-id failures.
    //! - Dispatch through the trait object.

    use ndarray::{Array1, array};

    use super::*;
    use crate::optimizers::base::OptimizeOptions;
    use crate::optimizers::errors::OptResult as ORes;
    use crate::variables::{ContinuousVariable, Variable};

    #[test]
    fn stock_ids_are_registered() {
        let registry = OptimizerRegistry::default();
        for id in [
            "Nelder-Mead",
            "Nelder-Mead_log",
            "BFGS",
            "BFGS_log",
            "L-BFGS",
            "L-BFGS_log",
            "L-BFGS-B",
            "L-BFGS-B_log",
        ] {
            assert!(registry.contains(id), "missing stock optimizer '{id}'");
        }
        assert!(registry.contains(DEFAULT_LOCAL_OPTIMIZER));
    }

    #[test]
    fn duplicates_and_unknown_ids_fail() {
        let mut registry = OptimizerRegistry::default();
        let err = registry
            .register("BFGS", Arc::new(BoundedLbfgsOptimizer::new(false, false)))
            .unwrap_err();
        assert_eq!(err, OptError::DuplicateOptimizer { id: "BFGS".to_string() });

        assert_eq!(
            registry.get("Powell").err().unwrap(),
            OptError::UnknownOptimizer { id: "Powell".to_string() }
        );
    }

    // Purpose: a registry lookup yields a working optimizer behind the
    // trait object.
    #[test]
    fn lookups_dispatch_through_the_trait_object() {
        let registry = OptimizerRegistry::default();
        let optimizer = registry.get("Nelder-Mead").unwrap();
        let variables = vec![Variable::Continuous(
            ContinuousVariable::population_size("a").with_domain([0.1, 10.0]).unwrap(),
        )];
        let f = |x: &Array1<f64>| -> ORes<f64> { Ok((x[0] - 2.0) * (x[0] - 2.0)) };

        let result =
            optimizer.optimize(&f, &variables, &array![1.0], &OptimizeOptions::default()).unwrap();

        assert!((result.x[0] - 2.0).abs() < 1e-3);
    }
}
