//! Villagers: identity, job progression, stamina and experience

use serde::{Deserialize, Serialize};

use crate::village::jobs::{JobPath, Task, Tier};

/// A single settlement worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Villager {
    pub name: String,
    pub path: JobPath,
    pub tier: Tier,
    /// Fatigue counter in [0, 1]; 1.0 is fully rested
    pub stamina: f32,
    pub experience: u32,
    pub task: Option<Task>,
}

impl Villager {
    /// A fresh tier-1 villager on the given path
    pub fn new(name: impl Into<String>, path: JobPath) -> Self {
        Self {
            name: name.into(),
            path,
            tier: Tier::APPRENTICE,
            stamina: 1.0,
            experience: 0,
            task: None,
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_stamina(mut self, stamina: f32) -> Self {
        self.stamina = stamina.clamp(0.0, 1.0);
        self
    }

    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }

    /// Title for the current path and tier, e.g. "lumberjack"
    pub fn job_title(&self) -> &'static str {
        self.path.title(self.tier)
    }

    /// Move up exactly one tier. Returns the new tier, or None at the top.
    /// Experience is kept.
    pub fn promote(&mut self) -> Option<Tier> {
        let next = self.tier.next()?;
        self.tier = next;
        Some(next)
    }

    /// Spend stamina on work, never dropping below zero
    pub fn exert(&mut self, cost: f32) {
        self.stamina = (self.stamina - cost).clamp(0.0, 1.0);
    }

    /// Recover stamina, never exceeding 1.0
    pub fn recover(&mut self, amount: f32) {
        self.stamina = (self.stamina + amount).clamp(0.0, 1.0);
    }

    /// Accumulate experience up to a cap. Never decreases.
    pub fn gain_experience(&mut self, amount: u32, cap: u32) {
        let gained = self.experience.saturating_add(amount).min(cap);
        self.experience = self.experience.max(gained);
    }
}
