//! Advisory-backed planning with a bounded wait
//!
//! The advisory call is the only suspension point in the crate. It runs on
//! a private current-thread tokio runtime and is wrapped in
//! `tokio::time::timeout`; when the deadline passes the in-flight future is
//! dropped and the rule book plans the day instead.
//!
//! `AdvisoryBacked::plan` blocks the calling thread, so it must not be
//! called from inside another tokio runtime.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::runtime::{Builder, Runtime};

use crate::core::error::{Result, VillageError};
use crate::llm::parser::AdvisoryReply;
use crate::oracle::plan::{Plan, PlanSource};
use crate::oracle::rules::RuleBased;
use crate::oracle::{Oracle, OracleSnapshot};

/// An external planner consulted before the rule book.
///
/// Returns the raw reply text. The reply must contain one JSON object with
/// `assignments` and `build_actions`; surrounding prose is ignored.
#[async_trait]
pub trait AdvisoryFunction: Send + Sync {
    async fn advise(&self, snapshot: &OracleSnapshot<'_>) -> Result<String>;
}

/// Strategy that prefers the advisory and falls back to rules
pub struct AdvisoryBacked {
    advisor: Box<dyn AdvisoryFunction>,
    fallback: RuleBased,
    timeout: Duration,
    runtime: Runtime,
}

impl AdvisoryBacked {
    pub fn new(advisor: Box<dyn AdvisoryFunction>, fallback: RuleBased, timeout: Duration) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            advisor,
            fallback,
            timeout,
            runtime,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the advisory for a plan without falling back
    pub fn consult(&self, snapshot: &OracleSnapshot<'_>) -> Result<Plan> {
        let reply = self
            .runtime
            .block_on(tokio::time::timeout(self.timeout, self.advisor.advise(snapshot)));
        let text = reply.map_err(|_| VillageError::AdvisoryTimeout(self.timeout.as_millis()))??;
        AdvisoryReply::parse(&text)?.into_plan(snapshot)
    }
}

impl Oracle for AdvisoryBacked {
    fn plan(&self, snapshot: &OracleSnapshot<'_>) -> Plan {
        let started = Instant::now();
        match self.consult(snapshot) {
            Ok(plan) => {
                tracing::info!(
                    "Day {}: advisory plan with {} assignments ({} ms)",
                    snapshot.day,
                    plan.assignments.len(),
                    started.elapsed().as_millis()
                );
                plan
            }
            Err(e) => {
                tracing::warn!("Day {}: advisory failed, planning with rules: {}", snapshot.day, e);
                let mut plan = self.fallback.plan(snapshot);
                plan.source = PlanSource::Fallback(e.to_string());
                plan
            }
        }
    }

    fn name(&self) -> &'static str {
        "advisory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EnvironmentAnalyzer;
    use crate::core::config::SimulationConfig;
    use crate::village::jobs::{BuildingKind, Resource, Task};
    use crate::village::PopulationLedger;
    use crate::world::GridWorld;

    struct Canned(&'static str);

    #[async_trait]
    impl AdvisoryFunction for Canned {
        async fn advise(&self, _snapshot: &OracleSnapshot<'_>) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl AdvisoryFunction for Failing {
        async fn advise(&self, _snapshot: &OracleSnapshot<'_>) -> Result<String> {
            Err(VillageError::Advisory("connection refused".into()))
        }
    }

    struct Slow;

    #[async_trait]
    impl AdvisoryFunction for Slow {
        async fn advise(&self, _snapshot: &OracleSnapshot<'_>) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("{}".to_string())
        }
    }

    fn backed(advisor: Box<dyn AdvisoryFunction>) -> AdvisoryBacked {
        let config = SimulationConfig::default();
        AdvisoryBacked::new(advisor, RuleBased::from_config(&config), Duration::from_millis(50)).unwrap()
    }

    fn with_snapshot<T>(f: impl FnOnce(&OracleSnapshot<'_>) -> T) -> T {
        let population = PopulationLedger::from_config(&SimulationConfig::default()).unwrap();
        let world = GridWorld::empty(6, 6, 0).unwrap();
        let analysis = EnvironmentAnalyzer::default().analyze(&world);
        f(&OracleSnapshot::new(&population, &analysis))
    }

    #[test]
    fn test_well_formed_reply_becomes_plan() {
        let oracle = backed(Box::new(Canned(
            r#"Plan follows: {"assignments": [{"name": "Alice", "task": "rest"}, {"name": "Bob", "task": "farm_crops"}],
               "build_actions": [{"building": "house", "assigned_to": "Charlie"}]}"#,
        )));
        let plan = with_snapshot(|s| oracle.plan(s));
        assert_eq!(plan.source, PlanSource::Advisory);
        assert_eq!(plan.task_for("Alice"), Some(Task::Rest));
        assert_eq!(plan.task_for("Bob"), Some(Task::FarmCrops));
        assert_eq!(plan.task_for("Charlie"), Some(Task::Build(BuildingKind::House)));
    }

    #[test]
    fn test_malformed_reply_falls_back() {
        let oracle = backed(Box::new(Canned("I would rather not say.")));
        let plan = with_snapshot(|s| oracle.plan(s));
        assert!(plan.is_fallback(), "Expected fallback, got {:?}", plan.source);
        assert_eq!(plan.task_for("Alice"), Some(Task::Gather(Resource::Wood)));
    }

    #[test]
    fn test_transport_error_falls_back() {
        let oracle = backed(Box::new(Failing));
        let plan = with_snapshot(|s| oracle.plan(s));
        match &plan.source {
            PlanSource::Fallback(reason) => assert!(reason.contains("connection refused")),
            other => panic!("Expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_is_bounded() {
        let oracle = backed(Box::new(Slow));
        let started = Instant::now();
        let plan = with_snapshot(|s| oracle.plan(s));
        assert!(started.elapsed() < Duration::from_secs(5), "Advisory wait was not cancelled");
        assert!(plan.is_fallback());

        let rules = with_snapshot(|s| RuleBased::from_config(&SimulationConfig::default()).plan(s));
        assert_eq!(plan.assignments, rules.assignments);
    }

    #[test]
    fn test_consult_reports_timeout() {
        let oracle = backed(Box::new(Slow));
        let result = with_snapshot(|s| oracle.consult(s));
        assert!(matches!(result, Err(VillageError::AdvisoryTimeout(50))));
    }
}
