//! Parse advisory replies into plans
//!
//! Advisors answer with JSON, usually wrapped in prose or a code fence. The
//! first `{` to the last `}` is taken as the reply object.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VillageError};
use crate::oracle::plan::{Plan, PlanSource, Promotion};
use crate::oracle::OracleSnapshot;
use crate::village::jobs::{BuildingKind, Task, Tier};

/// The expected JSON reply from an advisor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisoryReply {
    #[serde(default)]
    pub assignments: Vec<AdvisedAssignment>,
    #[serde(default)]
    pub build_actions: Vec<AdvisedBuild>,
}

/// A task, and optionally a new tier, for one villager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisedAssignment {
    pub name: String,
    /// Task name, e.g. "chop_wood" or "build_house"
    pub task: String,
    /// Tier after this day's promotion; the current tier means no change
    #[serde(default)]
    pub job_tier: Option<u8>,
}

/// A build order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisedBuild {
    /// "house", "workshop" or "farm"
    pub building: String,
    pub assigned_to: String,
}

impl AdvisoryReply {
    /// Extract and decode the reply object from raw advisor text
    pub fn parse(text: &str) -> Result<Self> {
        let json = extract_json(text)?;
        serde_json::from_str(json)
            .map_err(|e| VillageError::AdvisoryMalformed(format!("{} - reply: {}", e, json)))
    }

    /// Convert to a plan against the snapshot's villagers.
    ///
    /// Entries naming unknown villagers are rejected and the rest proceeds.
    /// An unknown task, building or tier makes the whole reply malformed.
    /// Build actions override the same villager's assignment.
    pub fn into_plan(self, snapshot: &OracleSnapshot<'_>) -> Result<Plan> {
        let mut plan = Plan::new(PlanSource::Advisory);

        for entry in self.assignments {
            let task: Task = entry.task.parse().map_err(VillageError::AdvisoryMalformed)?;
            let tier = entry
                .job_tier
                .map(|t| Tier::new(t).ok_or_else(|| VillageError::AdvisoryMalformed(format!("job_tier {}", t))))
                .transpose()?;

            let Some(villager) = snapshot.villager(&entry.name) else {
                tracing::warn!("Advisory names unknown villager {}", entry.name);
                plan.reject(&entry.name, VillageError::UnknownVillager(entry.name.clone()).to_string());
                continue;
            };

            match tier {
                Some(tier) if Some(tier) == villager.tier.next() => plan.promotions.push(Promotion {
                    villager: villager.name.clone(),
                    from: villager.tier,
                    to: tier,
                }),
                Some(tier) if tier != villager.tier => {
                    plan.reject(
                        &villager.name,
                        format!("tier change {} -> {} is not a single step", villager.tier.get(), tier.get()),
                    );
                }
                _ => {}
            }
            plan.assign(&villager.name, task);
        }

        for build in self.build_actions {
            let kind: BuildingKind = build.building.parse().map_err(VillageError::AdvisoryMalformed)?;
            if snapshot.villager(&build.assigned_to).is_none() {
                plan.reject(&build.assigned_to, VillageError::UnknownVillager(build.assigned_to.clone()).to_string());
                continue;
            }
            plan.assign(&build.assigned_to, Task::Build(kind));
        }

        Ok(plan)
    }
}

/// Extract JSON from a response that might have surrounding text
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| VillageError::AdvisoryMalformed("No JSON found in reply".into()))?;
    let end = response
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| VillageError::AdvisoryMalformed("No closing brace found in reply".into()))?;
    Ok(&response[start..=end])
}
