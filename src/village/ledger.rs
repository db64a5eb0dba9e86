//! Ledger - settlement-level resource stock and building counts

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::village::jobs::{BuildingKind, Resource};

/// A resource requirement or cost: (resource, amount)
pub type Cost = [(Resource, u32)];

/// Named non-negative resource counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLedger {
    counts: AHashMap<Resource, u32>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from initial (resource, amount) pairs
    pub fn with_stock(stock: &Cost) -> Self {
        let mut ledger = Self::new();
        for (resource, amount) in stock {
            ledger.add(*resource, *amount);
        }
        ledger
    }

    /// Get current amount of a resource
    pub fn get(&self, resource: Resource) -> u32 {
        self.counts.get(&resource).copied().unwrap_or(0)
    }

    pub fn set(&mut self, resource: Resource, amount: u32) {
        self.counts.insert(resource, amount);
    }

    /// Add to a resource counter, returns the new total
    pub fn add(&mut self, resource: Resource, amount: u32) -> u32 {
        let entry = self.counts.entry(resource).or_insert(0);
        *entry = entry.saturating_add(amount);
        *entry
    }

    /// Try to remove resources, returns amount actually removed
    pub fn remove(&mut self, resource: Resource, amount: u32) -> u32 {
        if let Some(entry) = self.counts.get_mut(&resource) {
            let removed = amount.min(*entry);
            *entry -= removed;
            removed
        } else {
            0
        }
    }

    /// Check if the ledger holds enough of every required resource
    pub fn has_materials(&self, requirements: &Cost) -> bool {
        requirements.iter().all(|(res, amount)| self.get(*res) >= *amount)
    }

    /// Deduct a cost all-or-nothing, returns true if it was deducted
    pub fn consume_materials(&mut self, requirements: &Cost) -> bool {
        if !self.has_materials(requirements) {
            return false;
        }
        for (res, amount) in requirements {
            self.remove(*res, *amount);
        }
        true
    }

    /// Counters in fixed resource order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL.into_iter().map(move |res| (res, self.get(res)))
    }
}

// Absent and zero counters compare equal
impl PartialEq for ResourceLedger {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for ResourceLedger {}

/// Completed structures by kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingCounts {
    counts: AHashMap<BuildingKind, u32>,
}

impl BuildingCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: BuildingKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Record one more completed structure, returns the new count
    pub fn increment(&mut self, kind: BuildingKind) -> u32 {
        let entry = self.counts.entry(kind).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn set(&mut self, kind: BuildingKind, count: u32) {
        self.counts.insert(kind, count);
    }

    pub fn iter(&self) -> impl Iterator<Item = (BuildingKind, u32)> + '_ {
        BuildingKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

impl PartialEq for BuildingCounts {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for BuildingCounts {}
