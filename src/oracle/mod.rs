//! Decision engine - the oracle that plans each day
//!
//! Architecture: strategy trait + rule data
//! - `Oracle` is the interface the settlement calls once per tick
//! - `RuleBased` evaluates an ordered `RuleBook` built from the config
//! - `AdvisoryBacked` asks an external advisory function first and falls
//!   back to its own `RuleBased` on timeout or a bad reply

pub mod advisory;
pub mod plan;
pub mod promotion;
pub mod rules;

use serde::Serialize;

use crate::analysis::Analysis;
use crate::core::types::Day;
use crate::village::ledger::{BuildingCounts, ResourceLedger};
use crate::village::villager::Villager;
use crate::village::PopulationLedger;

pub use advisory::{AdvisoryBacked, AdvisoryFunction};
pub use plan::{Assignment, Plan, PlanSource, Promotion, Rejection};
pub use promotion::promotion_target;
pub use rules::{Rule, RuleBased, RuleBook};

/// Read-only view of the settlement handed to an oracle
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OracleSnapshot<'a> {
    pub day: Day,
    pub ledger: &'a ResourceLedger,
    pub buildings: &'a BuildingCounts,
    pub villagers: &'a [Villager],
    pub analysis: &'a Analysis,
}

impl<'a> OracleSnapshot<'a> {
    pub fn new(population: &'a PopulationLedger, analysis: &'a Analysis) -> Self {
        Self {
            day: population.day,
            ledger: &population.ledger,
            buildings: &population.buildings,
            villagers: population.villagers(),
            analysis,
        }
    }

    pub fn villager(&self, name: &str) -> Option<&'a Villager> {
        self.villagers.iter().find(|v| v.name == name)
    }
}

/// Trait for planning strategies
pub trait Oracle: Send {
    /// Produce the plan for the snapshot's day. Never fails; strategies
    /// with fallible inputs recover internally.
    fn plan(&self, snapshot: &OracleSnapshot<'_>) -> Plan;

    fn name(&self) -> &'static str;
}
