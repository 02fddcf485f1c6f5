//! Chaos: per-transform transition weights
//!
//! A chaos row holds the outgoing weights from one xform to every xform of the
//! same flame. Weights are keyed by [`XformId`] rather than by position, so
//! reordering, inserting or deleting xforms never shifts an existing weight onto
//! the wrong target. Any target without an explicit weight reads as `1.0`.

use crate::geometry::fmt_num;
use crate::xform::XformId;
use std::collections::HashMap;
use thiserror::Error;

/// Weight of every transition that was never assigned.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Chaos misuse
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChaosError {
    #[error("chaos weight must be non-negative, got {0}")]
    NegativeWeight(f64),
    #[error("{values} chaos values given but the flame only has {xforms} xforms")]
    TooManyValues { values: usize, xforms: usize },
}

/// Outgoing transition weights of a single xform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chaos {
    weights: HashMap<XformId, f64>,
}

impl Chaos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from positional values, aligned with `targets` (the flame's
    /// xform ids in sequence order). Missing trailing values keep the default.
    pub fn from_values(targets: &[XformId], values: &[f64]) -> Result<Self, ChaosError> {
        if values.len() > targets.len() {
            return Err(ChaosError::TooManyValues { values: values.len(), xforms: targets.len() });
        }
        let mut chaos = Chaos::new();
        for (target, value) in targets.iter().zip(values) {
            chaos.set(*target, *value)?;
        }
        Ok(chaos)
    }

    /// Weight towards `target`.
    pub fn get(&self, target: XformId) -> f64 {
        self.weights.get(&target).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn set(&mut self, target: XformId, weight: f64) -> Result<(), ChaosError> {
        if weight < 0.0 || weight.is_nan() {
            return Err(ChaosError::NegativeWeight(weight));
        }
        self.weights.insert(target, weight);
        Ok(())
    }

    /// Drop the weight towards a deleted xform.
    pub fn forget(&mut self, target: XformId) {
        self.weights.remove(&target);
    }

    /// Whether any weight was assigned explicitly.
    pub fn is_default(&self) -> bool {
        self.weights.values().all(|w| *w == DEFAULT_WEIGHT)
    }

    /// Weights in the order given by `targets`.
    pub fn row(&self, targets: &[XformId]) -> Vec<f64> {
        targets.iter().map(|t| self.get(*t)).collect()
    }

    /// Rewrite every explicit weight through `f`.
    pub(crate) fn remap(&mut self, f: impl Fn(f64) -> f64) {
        for weight in self.weights.values_mut() {
            *weight = f(*weight);
        }
    }

    /// Serialized form: weights in sequence order with the trailing run of
    /// defaults dropped. `None` when nothing is left to write.
    pub fn to_attribute(&self, targets: &[XformId]) -> Option<String> {
        let mut row = self.row(targets);
        while row.last() == Some(&DEFAULT_WEIGHT) {
            row.pop();
        }
        if row.is_empty() {
            return None;
        }
        Some(row.iter().map(|w| fmt_num(*w)).collect::<Vec<_>>().join(" "))
    }
}
