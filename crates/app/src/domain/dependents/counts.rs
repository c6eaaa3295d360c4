//! Dependent Counts

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::dependents::kinds::DependentKind;

/// Per-kind record counts. Every kind is always present, zero included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependentCounts(BTreeMap<DependentKind, u64>);

impl DependentCounts {
    #[must_use]
    pub fn new() -> Self {
        Self(DependentKind::ALL.into_iter().map(|kind| (kind, 0)).collect())
    }

    pub fn set(&mut self, kind: DependentKind, count: u64) {
        self.0.insert(kind, count);
    }

    #[must_use]
    pub fn get(&self, kind: DependentKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DependentKind, u64)> + '_ {
        self.0.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl Default for DependentCounts {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(DependentKind, u64)> for DependentCounts {
    fn from_iter<I: IntoIterator<Item = (DependentKind, u64)>>(iter: I) -> Self {
        let mut counts = Self::new();

        for (kind, count) in iter {
            counts.set(kind, count);
        }

        counts
    }
}

impl<'de> Deserialize<'de> for DependentCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = BTreeMap::<DependentKind, u64>::deserialize(deserializer)?;

        Ok(stored.into_iter().collect())
    }
}
