//! Village population - villagers, resource stock, buildings and the clock

pub mod jobs;
pub mod ledger;
pub mod villager;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, VillageError};
use crate::core::types::Day;

pub use jobs::{BuildingKind, JobPath, Resource, Task, Tier};
pub use ledger::{BuildingCounts, Cost, ResourceLedger};
pub use villager::Villager;

/// Everything the tick executor mutates
///
/// Villagers are kept in registration order; that order is the
/// processing order for plans and ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationLedger {
    villagers: Vec<Villager>,
    pub ledger: ResourceLedger,
    pub buildings: BuildingCounts,
    /// Current day, starting at 1
    pub day: Day,
}

impl Default for PopulationLedger {
    fn default() -> Self {
        Self {
            villagers: Vec::new(),
            ledger: ResourceLedger::new(),
            buildings: BuildingCounts::new(),
            day: 1,
        }
    }
}

impl PopulationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Founding state from the config: starting stock, buildings and villagers
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let mut population = Self {
            ledger: ResourceLedger::with_stock(&config.starting_stock),
            ..Self::default()
        };
        for (kind, count) in &config.starting_buildings {
            population.buildings.set(*kind, *count);
        }
        for seed in &config.starting_villagers {
            population.add_villager(Villager::new(seed.name.clone(), seed.path).with_tier(seed.tier))?;
        }
        Ok(population)
    }

    /// Register a villager. Names are unique.
    pub fn add_villager(&mut self, villager: Villager) -> Result<()> {
        if self.index_of(&villager.name).is_some() {
            return Err(VillageError::DuplicateVillager(villager.name));
        }
        tracing::debug!("Registered {} ({})", villager.name, villager.job_title());
        self.villagers.push(villager);
        Ok(())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.villagers.iter().position(|v| v.name == name)
    }

    pub fn villager(&self, name: &str) -> Option<&Villager> {
        self.villagers.iter().find(|v| v.name == name)
    }

    pub fn villager_mut(&mut self, name: &str) -> Option<&mut Villager> {
        self.villagers.iter_mut().find(|v| v.name == name)
    }

    pub fn villagers(&self) -> &[Villager] {
        &self.villagers
    }

    pub(crate) fn villagers_mut(&mut self) -> &mut [Villager] {
        &mut self.villagers
    }

    pub fn len(&self) -> usize {
        self.villagers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.villagers.is_empty()
    }

    /// Move the clock forward one day, returns the new day
    pub fn advance_day(&mut self) -> Day {
        self.day += 1;
        self.day
    }
}
