//! Aggregate health report

use crate::status::DependencyStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-request snapshot of every dependency's status, keyed by dependency name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateHealthReport {
    dependencies: BTreeMap<String, DependencyStatus>,
}

impl AggregateHealthReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, status: DependencyStatus) {
        self.dependencies.insert(name.into(), status);
    }

    pub fn get(&self, name: &str) -> Option<&DependencyStatus> {
        self.dependencies.get(name)
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// True only when every dependency reports OK.
    pub fn is_ok(&self) -> bool {
        self.dependencies.values().all(|status| status.ok)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DependencyStatus)> {
        self.dependencies.iter()
    }
}
