//! Plans: the oracle's output for one day

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::village::jobs::{BuildingKind, Task, Tier};
use crate::village::ledger::ResourceLedger;

/// Where a plan came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum PlanSource {
    Rules,
    Advisory,
    /// The advisory was configured but failed; the rules produced the plan
    Fallback(String),
}

impl fmt::Display for PlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanSource::Rules => f.write_str("rules"),
            PlanSource::Advisory => f.write_str("advisory"),
            PlanSource::Fallback(reason) => write!(f, "fallback ({})", reason),
        }
    }
}

/// One villager's task for the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub villager: String,
    pub task: Task,
}

/// A one-step tier change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub villager: String,
    pub from: Tier,
    pub to: Tier,
}

/// A plan entry that was dropped while the plan was assembled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub villager: String,
    pub reason: String,
}

/// Task, promotion and build decisions for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub assignments: Vec<Assignment>,
    pub promotions: Vec<Promotion>,
    pub rejected: Vec<Rejection>,
    /// Stock earmarked by build orders in this plan
    pub reserved: ResourceLedger,
    pub source: PlanSource,
}

impl Plan {
    pub fn new(source: PlanSource) -> Self {
        Self {
            assignments: Vec::new(),
            promotions: Vec::new(),
            rejected: Vec::new(),
            reserved: ResourceLedger::new(),
            source,
        }
    }

    /// Assign a task, replacing any earlier assignment for the same villager
    pub fn assign(&mut self, villager: &str, task: Task) {
        match self.assignments.iter_mut().find(|a| a.villager == villager) {
            Some(existing) => existing.task = task,
            None => self.assignments.push(Assignment {
                villager: villager.to_string(),
                task,
            }),
        }
    }

    pub fn task_for(&self, villager: &str) -> Option<Task> {
        self.assignments
            .iter()
            .find(|a| a.villager == villager)
            .map(|a| a.task)
    }

    pub fn promotion_for(&self, villager: &str) -> Option<&Promotion> {
        self.promotions.iter().find(|p| p.villager == villager)
    }

    /// Build orders in assignment order
    pub fn build_orders(&self) -> impl Iterator<Item = (&str, BuildingKind)> + '_ {
        self.assignments.iter().filter_map(|a| match a.task {
            Task::Build(kind) => Some((a.villager.as_str(), kind)),
            _ => None,
        })
    }

    pub fn reject(&mut self, villager: impl Into<String>, reason: impl Into<String>) {
        self.rejected.push(Rejection {
            villager: villager.into(),
            reason: reason.into(),
        });
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, PlanSource::Fallback(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::village::jobs::Resource;

    #[test]
    fn test_assign_replaces_previous_task() {
        let mut plan = Plan::new(PlanSource::Rules);
        plan.assign("Alice", Task::Gather(Resource::Wood));
        plan.assign("Bob", Task::Rest);
        plan.assign("Alice", Task::Build(BuildingKind::House));

        assert_eq!(plan.assignments.len(), 2);
        assert_eq!(plan.task_for("Alice"), Some(Task::Build(BuildingKind::House)));
        assert_eq!(plan.task_for("Carol"), None);

        let builds: Vec<_> = plan.build_orders().collect();
        assert_eq!(builds, vec![("Alice", BuildingKind::House)]);
    }

    #[test]
    fn test_plan_source_json() {
        let json = serde_json::to_string(&PlanSource::Fallback("timed out".into())).unwrap();
        assert_eq!(json, r#"{"kind":"fallback","reason":"timed out"}"#);
        let rules = serde_json::to_string(&PlanSource::Rules).unwrap();
        assert_eq!(rules, r#"{"kind":"rules"}"#);
    }
}
