//! Tick executor - applies one plan as one day
//!
//! Order within a tick:
//! promotions (re-checked against the gates) -> villager actions in
//! registration order -> clock advance.
//!
//! Work happens on a staged copy of the population that replaces the live
//! one only once every villager has been processed. Nothing in a tick is
//! fatal: bad entries are skipped and reported.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::Day;
use crate::oracle::plan::Plan;
use crate::oracle::promotion::promotion_target;
use crate::village::jobs::{BuildingKind, Resource, Task, Tier};
use crate::village::ledger::{BuildingCounts, ResourceLedger};
use crate::village::villager::Villager;
use crate::village::PopulationLedger;

/// What happened to one villager during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    Gathered { resource: Resource, amount: u32 },
    Rested { stamina: f32 },
    Built { building: BuildingKind },
    /// The assigned action could not run; see the skipped list
    Skipped,
    /// No assignment for this villager
    Idle,
}

/// Per-villager line of the day log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub villager: String,
    pub task: Option<Task>,
    pub outcome: ActionOutcome,
    pub stamina: f32,
    pub experience: u32,
}

/// Why a plan entry was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    UnknownVillager,
    /// The ledger cannot cover a build cost or a cooking input
    InsufficientResources { task: Task },
    /// The villager's job and tier do not allow the task
    WrongJob { task: Task },
    /// Stamina below the task's stamina cost
    TooTired { task: Task },
    IneligiblePromotion { to: Tier },
    /// Dropped while the plan was assembled
    Rejected { reason: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownVillager => f.write_str("unknown villager"),
            SkipReason::InsufficientResources { task } => write!(f, "insufficient resources for {}", task),
            SkipReason::WrongJob { task } => write!(f, "wrong job for {}", task),
            SkipReason::TooTired { task } => write!(f, "too tired for {}", task),
            SkipReason::IneligiblePromotion { to } => write!(f, "not eligible for tier {}", to.get()),
            SkipReason::Rejected { reason } => write!(f, "rejected: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAction {
    pub villager: String,
    pub reason: SkipReason,
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The day that was just completed
    pub day: Day,
    pub promotions: Vec<(String, Tier)>,
    pub reports: Vec<ActionReport>,
    pub skipped: Vec<SkippedAction>,
    pub stock: ResourceLedger,
    pub buildings: BuildingCounts,
}

impl ExecutionResult {
    pub fn report_for(&self, villager: &str) -> Option<&ActionReport> {
        self.reports.iter().find(|r| r.villager == villager)
    }

    pub fn built(&self) -> impl Iterator<Item = BuildingKind> + '_ {
        self.reports.iter().filter_map(|r| match r.outcome {
            ActionOutcome::Built { building } => Some(building),
            _ => None,
        })
    }
}

/// Applies plans against a population using the config's effect tables
pub struct TickExecutor<'a> {
    config: &'a SimulationConfig,
}

impl<'a> TickExecutor<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self { config }
    }

    /// Apply `plan` as one day. The population's day advances by exactly one.
    pub fn apply(&self, population: &mut PopulationLedger, plan: &Plan) -> ExecutionResult {
        let mut staged = population.clone();
        let day = staged.day;
        let mut skipped: Vec<SkippedAction> = plan
            .rejected
            .iter()
            .map(|r| SkippedAction {
                villager: r.villager.clone(),
                reason: SkipReason::Rejected {
                    reason: r.reason.clone(),
                },
            })
            .collect();

        let promotions = self.apply_promotions(population, &mut staged, plan, &mut skipped);

        // Assignments that name nobody
        for assignment in &plan.assignments {
            if staged.index_of(&assignment.villager).is_none() {
                skipped.push(SkippedAction {
                    villager: assignment.villager.clone(),
                    reason: SkipReason::UnknownVillager,
                });
            }
        }

        let mut reports = Vec::with_capacity(staged.len());
        let mut ledger = std::mem::take(&mut staged.ledger);
        let mut buildings = std::mem::take(&mut staged.buildings);

        for villager in staged.villagers_mut() {
            let task = plan.task_for(&villager.name);
            villager.task = task;
            let outcome = match task {
                None => ActionOutcome::Idle,
                Some(task) => self.perform(villager, task, &mut ledger, &mut buildings, &mut skipped),
            };
            reports.push(ActionReport {
                villager: villager.name.clone(),
                task,
                outcome,
                stamina: villager.stamina,
                experience: villager.experience,
            });
        }

        staged.ledger = ledger;
        staged.buildings = buildings;
        staged.advance_day();
        *population = staged;

        tracing::info!(
            "Day {} complete: {} actions, {} skipped",
            day,
            reports.len(),
            skipped.len()
        );

        ExecutionResult {
            day,
            promotions,
            reports,
            skipped,
            stock: population.ledger.clone(),
            buildings: population.buildings.clone(),
        }
    }

    /// Apply at most one promotion per villager, each checked against the
    /// tier and stock the villager had at the start of the day
    fn apply_promotions(
        &self,
        start: &PopulationLedger,
        staged: &mut PopulationLedger,
        plan: &Plan,
        skipped: &mut Vec<SkippedAction>,
    ) -> Vec<(String, Tier)> {
        let mut applied: Vec<(String, Tier)> = Vec::new();
        for promotion in &plan.promotions {
            let name = &promotion.villager;
            let (Some(before), Some(villager)) = (start.villager(name), staged.villager_mut(name)) else {
                skipped.push(SkippedAction {
                    villager: promotion.villager.clone(),
                    reason: SkipReason::UnknownVillager,
                });
                continue;
            };

            let already_promoted = applied.iter().any(|(name, _)| *name == villager.name);
            let eligible = !already_promoted
                && promotion.from == before.tier
                && promotion_target(&self.config.promotion, before, &start.ledger) == Some(promotion.to);
            if !eligible {
                tracing::warn!(
                    "Skipping promotion of {} to tier {}: gates not met",
                    villager.name,
                    promotion.to.get()
                );
                skipped.push(SkippedAction {
                    villager: villager.name.clone(),
                    reason: SkipReason::IneligiblePromotion { to: promotion.to },
                });
                continue;
            }

            if let Some(tier) = villager.promote() {
                tracing::info!("{} promoted to {}", villager.name, villager.job_title());
                applied.push((villager.name.clone(), tier));
            }
        }
        applied
    }

    fn perform(
        &self,
        villager: &mut Villager,
        task: Task,
        ledger: &mut ResourceLedger,
        buildings: &mut BuildingCounts,
        skipped: &mut Vec<SkippedAction>,
    ) -> ActionOutcome {
        let name = villager.name.clone();
        let mut skip = |reason: SkipReason| {
            tracing::warn!("{} skipped {}: {}", name, task, reason);
            skipped.push(SkippedAction {
                villager: name.clone(),
                reason,
            });
            ActionOutcome::Skipped
        };

        if !task.allowed_for(villager.path, villager.tier) {
            return skip(SkipReason::WrongJob { task });
        }

        let cap = self.config.experience_cap;
        match task {
            Task::Rest => {
                villager.recover(self.config.rest_recovery);
                ActionOutcome::Rested {
                    stamina: villager.stamina,
                }
            }

            Task::Build(building) => {
                let profile = self.config.buildings.get(building);
                if villager.stamina < profile.stamina_cost {
                    return skip(SkipReason::TooTired { task });
                }
                if !ledger.consume_materials(&profile.cost) {
                    return skip(SkipReason::InsufficientResources { task });
                }
                let total = buildings.increment(building);
                villager.exert(profile.stamina_cost);
                villager.gain_experience(profile.experience, cap);
                tracing::info!("{} built a {} ({} total)", villager.name, building, total);
                ActionOutcome::Built { building }
            }

            Task::Gather(_) | Task::FarmCrops | Task::CookFood => {
                let (Some(profile), Some(resource)) = (self.config.gather.for_task(task), task.produces()) else {
                    return ActionOutcome::Idle;
                };
                if villager.stamina < profile.stamina_cost {
                    return skip(SkipReason::TooTired { task });
                }
                if !ledger.consume_materials(&profile.consumes) {
                    return skip(SkipReason::InsufficientResources { task });
                }
                let amount = (profile.base_rate as f32 * self.config.tier_multiplier(villager.tier)).round() as u32;
                ledger.add(resource, amount);
                villager.exert(profile.stamina_cost);
                villager.gain_experience(profile.experience, cap);
                tracing::debug!("{} gathered {} {} ({})", villager.name, amount, resource, task);
                ActionOutcome::Gathered { resource, amount }
            }
        }
    }
}
