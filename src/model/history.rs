//! Resolved demographic histories.
//!
//! Purpose
//! -------
//! The typed surface engines consume: an ordered list of events with every
//! parameter resolved to a concrete number or dynamics tag. The structured
//! model assembles these from a parameter vector; engines only ever read
//! them.
//!
//! Conventions
//! -----------
//! - Events run oldest first. The history starts from a single ancestral
//!   population at genetic size 1.
//! - Sizes, times and rates are in the model's units (genetic unless the
//!   caller translated the variables).
//! - `migration[k][j]` is the rate from population `k` into population `j`;
//!   the diagonal is zero.

use crate::variables::DynamicKind;

/// One time interval with fixed dynamics, selection and migration.
#[derive(Debug, Clone, PartialEq)]
pub struct Epoch {
    /// Interval length.
    pub duration: f64,
    /// Sizes at the start of the interval, one per population.
    pub start_sizes: Vec<f64>,
    /// Sizes at the end of the interval.
    pub end_sizes: Vec<f64>,
    /// Size trajectory per population.
    pub dynamics: Vec<DynamicKind>,
    /// Selection coefficient per population.
    pub selection: Vec<f64>,
    /// Dense migration matrix; empty for one population.
    pub migration: Vec<Vec<f64>>,
}

impl Epoch {
    /// Number of populations alive during this epoch.
    pub fn n_populations(&self) -> usize {
        self.start_sizes.len()
    }

    /// Size of population `j` at time `t` into the epoch.
    pub fn size_at(&self, j: usize, t: f64) -> f64 {
        let f = self.dynamics[j].inner_func(self.start_sizes[j], self.end_sizes[j], self.duration);
        f(t)
    }
}

/// A population split: the parent divides into itself and a new last
/// population.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    /// Index of the population that divides (always the last one alive).
    pub parent: usize,
    /// Starting sizes of the two daughters, parent slot first.
    pub daughter_sizes: (f64, f64),
}

/// One event in a demographic history.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Epoch(Epoch),
    Split(Split),
}

/// A fully resolved demographic history.
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicHistory {
    pub events: Vec<Event>,
    /// Population count after the last event.
    pub n_populations: usize,
}

impl DemographicHistory {
    /// Iterate over epochs only, in order.
    pub fn epochs(&self) -> impl Iterator<Item = &Epoch> {
        self.events.iter().filter_map(|event| match event {
            Event::Epoch(epoch) => Some(epoch),
            Event::Split(_) => None,
        })
    }

    /// Total duration across all epochs.
    pub fn total_time(&self) -> f64 {
        self.epochs().map(|epoch| epoch.duration).sum()
    }
}
