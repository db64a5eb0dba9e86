//! Deterministic planning rules
//!
//! Rules are evaluated per villager in book order. Promotion never claims a
//! villager; every other rule either returns a task (first match wins) or
//! passes to the next rule.

use crate::core::config::{BuildingTable, ConstructionTrigger, PromotionTable, ScarcityFloor, SimulationConfig};
use crate::oracle::plan::{Plan, PlanSource, Promotion};
use crate::oracle::promotion::promotion_target;
use crate::oracle::{Oracle, OracleSnapshot};
use crate::village::jobs::{Resource, Task, Tier};
use crate::village::ledger::{Cost, ResourceLedger};
use crate::village::villager::Villager;

/// A planning rule and its parameters
#[derive(Debug, Clone)]
pub enum Rule {
    /// Promote one tier when the gates allow it. Task selection that
    /// follows sees the promoted tier.
    Promotion(PromotionTable),
    /// Rest when stamina is below the threshold
    Survival { threshold: f32 },
    /// Work the first resource below its floor, for villagers on its path.
    /// Farmers and chefs farm instead of foraging.
    Scarcity(Vec<ScarcityFloor>),
    /// Send tier-3 villagers to build when stock triggers fire and the
    /// unreserved stock covers the cost
    Construction {
        triggers: Vec<ConstructionTrigger>,
        costs: BuildingTable,
    },
    /// Work the villager's own path. Chefs cook when the unreserved stock
    /// covers `cook_input`, and farm otherwise.
    Default { cook_input: Vec<(Resource, u32)> },
}

/// Villager being planned, with any promotion already applied
struct Candidate<'v> {
    villager: &'v Villager,
    tier: Tier,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Promotion(_) => "promotion",
            Rule::Survival { .. } => "survival",
            Rule::Scarcity(_) => "scarcity",
            Rule::Construction { .. } => "construction",
            Rule::Default { .. } => "default",
        }
    }

    fn apply(&self, candidate: &mut Candidate<'_>, stock: &ResourceLedger, plan: &mut Plan) -> Option<Task> {
        let villager = candidate.villager;
        match self {
            Rule::Promotion(table) => {
                if let Some(next) = promotion_target(table, villager, stock) {
                    plan.promotions.push(Promotion {
                        villager: villager.name.clone(),
                        from: villager.tier,
                        to: next,
                    });
                    candidate.tier = next;
                }
                None
            }

            Rule::Survival { threshold } => (villager.stamina < *threshold).then_some(Task::Rest),

            Rule::Scarcity(floors) => {
                let scarce = floors.iter().find(|f| stock.get(f.resource) < f.floor)?;
                let path = scarce.resource.gathering_path();
                (path == villager.path).then(|| Task::work_for(path, candidate.tier))
            }

            Rule::Construction { triggers, costs } => {
                if candidate.tier != Tier::MASTER {
                    return None;
                }
                let trigger = triggers.iter().find(|t| {
                    t.path == villager.path
                        && stock.has_materials(&t.requires)
                        && covers_unreserved(stock, &plan.reserved, &costs.get(t.building).cost)
                })?;
                reserve(plan, &costs.get(trigger.building).cost);
                Some(Task::Build(trigger.building))
            }

            Rule::Default { cook_input } => {
                let cook = Task::CookFood;
                if cook.allowed_for(villager.path, candidate.tier) && covers_unreserved(stock, &plan.reserved, cook_input) {
                    reserve(plan, cook_input);
                    return Some(cook);
                }
                Some(Task::work_for(villager.path, candidate.tier))
            }
        }
    }
}

fn reserve(plan: &mut Plan, cost: &Cost) {
    for (resource, amount) in cost {
        plan.reserved.add(*resource, *amount);
    }
}

fn covers_unreserved(stock: &ResourceLedger, reserved: &ResourceLedger, cost: &Cost) -> bool {
    cost.iter()
        .all(|(resource, amount)| stock.get(*resource).saturating_sub(reserved.get(*resource)) >= *amount)
}

/// Ordered rule list
#[derive(Debug, Clone)]
pub struct RuleBook {
    rules: Vec<Rule>,
}

impl RuleBook {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Promotion, survival, scarcity, construction, default
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(vec![
            Rule::Promotion(config.promotion.clone()),
            Rule::Survival {
                threshold: config.survival_stamina,
            },
            Rule::Scarcity(config.scarcity_floors.clone()),
            Rule::Construction {
                triggers: config.construction.clone(),
                costs: config.buildings.clone(),
            },
            Rule::Default {
                cook_input: config.gather.cook.consumes.clone(),
            },
        ])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Plan every villager in registration order
    pub fn evaluate(&self, snapshot: &OracleSnapshot<'_>) -> Plan {
        let mut plan = Plan::new(PlanSource::Rules);
        for villager in snapshot.villagers {
            let mut candidate = Candidate {
                villager,
                tier: villager.tier,
            };
            for rule in &self.rules {
                if let Some(task) = rule.apply(&mut candidate, snapshot.ledger, &mut plan) {
                    tracing::debug!("{}: {} ({} rule)", villager.name, task, rule.name());
                    plan.assign(&villager.name, task);
                    break;
                }
            }
        }
        plan
    }
}

/// Plans with the rule book alone
#[derive(Debug, Clone)]
pub struct RuleBased {
    book: RuleBook,
}

impl RuleBased {
    pub fn new(book: RuleBook) -> Self {
        Self { book }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(RuleBook::from_config(config))
    }

    pub fn book(&self) -> &RuleBook {
        &self.book
    }
}

impl Oracle for RuleBased {
    fn plan(&self, snapshot: &OracleSnapshot<'_>) -> Plan {
        self.book.evaluate(snapshot)
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EnvironmentAnalyzer;
    use crate::village::jobs::{BuildingKind, JobPath};
    use crate::village::ledger::BuildingCounts;
    use crate::world::GridWorld;

    fn plan_for(villagers: &[Villager], stock: &[(Resource, u32)]) -> Plan {
        let world = GridWorld::empty(4, 4, 0).unwrap();
        let analysis = EnvironmentAnalyzer::default().analyze(&world);
        let ledger = ResourceLedger::with_stock(stock);
        let buildings = BuildingCounts::new();
        let snapshot = OracleSnapshot {
            day: 1,
            ledger: &ledger,
            buildings: &buildings,
            villagers,
            analysis: &analysis,
        };
        RuleBased::from_config(&SimulationConfig::default()).plan(&snapshot)
    }

    const PLENTY: [(Resource, u32); 3] = [(Resource::Wood, 150), (Resource::Food, 150), (Resource::Stone, 120)];

    #[test]
    fn test_book_order() {
        let book = RuleBook::from_config(&SimulationConfig::default());
        let names: Vec<&str> = book.rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["promotion", "survival", "scarcity", "construction", "default"]);
    }

    #[test]
    fn test_survival_beats_scarcity() {
        let villagers = [Villager::new("Alice", JobPath::Wood).with_stamina(0.1)];
        let plan = plan_for(&villagers, &[(Resource::Wood, 0)]);
        assert_eq!(plan.task_for("Alice"), Some(Task::Rest));
    }

    #[test]
    fn test_scarcity_only_first_scarce_resource() {
        let villagers = [
            Villager::new("Alice", JobPath::Wood),
            Villager::new("Bob", JobPath::Food),
            Villager::new("Charlie", JobPath::Stone),
        ];
        // Food and stone are scarce; food comes first in priority
        let plan = plan_for(&villagers, &[(Resource::Wood, 150), (Resource::Food, 10), (Resource::Stone, 10)]);
        assert_eq!(plan.task_for("Alice"), Some(Task::Gather(Resource::Wood)));
        assert_eq!(plan.task_for("Bob"), Some(Task::Gather(Resource::Food)));
        assert_eq!(plan.task_for("Charlie"), Some(Task::Gather(Resource::Stone)));
        assert_eq!(plan.source, PlanSource::Rules);
    }

    #[test]
    fn test_promotion_does_not_claim_task() {
        let villagers = [Villager::new("Alice", JobPath::Wood).with_experience(75).with_stamina(0.1)];
        let plan = plan_for(&villagers, &PLENTY);
        let promotion = plan.promotion_for("Alice").unwrap();
        assert_eq!((promotion.from, promotion.to), (Tier::APPRENTICE, Tier::JOURNEYMAN));
        assert_eq!(plan.task_for("Alice"), Some(Task::Rest));
    }

    #[test]
    fn test_freshly_promoted_master_builds() {
        let villagers = [Villager::new("Alice", JobPath::Wood)
            .with_tier(Tier::JOURNEYMAN)
            .with_experience(90)];
        let plan = plan_for(&villagers, &[(Resource::Wood, 250), (Resource::Food, 150), (Resource::Stone, 100)]);
        assert_eq!(plan.promotion_for("Alice").map(|p| p.to), Some(Tier::MASTER));
        assert_eq!(plan.task_for("Alice"), Some(Task::Build(BuildingKind::House)));
        assert_eq!(plan.reserved.get(Resource::Wood), 50);
        assert_eq!(plan.reserved.get(Resource::Stone), 30);
    }

    #[test]
    fn test_construction_reserves_stock() {
        let builders = [
            Villager::new("A", JobPath::Wood).with_tier(Tier::MASTER),
            Villager::new("B", JobPath::Wood).with_tier(Tier::MASTER),
        ];
        // Enough stone for one house only
        let plan = plan_for(&builders, &[(Resource::Wood, 300), (Resource::Food, 150), (Resource::Stone, 50)]);
        assert_eq!(plan.task_for("A"), Some(Task::Build(BuildingKind::House)));
        assert_eq!(plan.task_for("B"), Some(Task::Gather(Resource::Wood)));
        assert_eq!(plan.build_orders().count(), 1);
    }

    #[test]
    fn test_construction_needs_master_on_path() {
        let villagers = [
            Villager::new("Lumberjack", JobPath::Wood).with_tier(Tier::JOURNEYMAN),
            Villager::new("Chef", JobPath::Food).with_tier(Tier::MASTER),
        ];
        let plan = plan_for(&villagers, &[(Resource::Wood, 300), (Resource::Food, 150), (Resource::Stone, 100)]);
        assert_eq!(plan.task_for("Lumberjack"), Some(Task::Gather(Resource::Wood)));
        // Food below the farm trigger, so the chef cooks
        assert_eq!(plan.task_for("Chef"), Some(Task::CookFood));
    }

    #[test]
    fn test_workshop_trigger() {
        let villagers = [Villager::new("Eng", JobPath::Stone).with_tier(Tier::MASTER)];
        let plan = plan_for(&villagers, &[(Resource::Wood, 100), (Resource::Food, 150), (Resource::Stone, 150)]);
        assert_eq!(plan.task_for("Eng"), Some(Task::Build(BuildingKind::Workshop)));
    }

    #[test]
    fn test_default_gathers_own_path() {
        let villagers = [Villager::new("Charlie", JobPath::Stone)];
        let plan = plan_for(&villagers, &PLENTY);
        assert_eq!(plan.task_for("Charlie"), Some(Task::Gather(Resource::Stone)));
        assert!(plan.promotions.is_empty());
        assert!(plan.rejected.is_empty());
    }

    #[test]
    fn test_food_scarcity_sends_farmers_to_farm() {
        let villagers = [
            Villager::new("Forager", JobPath::Food),
            Villager::new("Farmer", JobPath::Food).with_tier(Tier::JOURNEYMAN),
            Villager::new("Chef", JobPath::Food).with_tier(Tier::MASTER),
        ];
        let plan = plan_for(&villagers, &[(Resource::Wood, 150), (Resource::Food, 40), (Resource::Stone, 100)]);
        assert_eq!(plan.task_for("Forager"), Some(Task::Gather(Resource::Food)));
        assert_eq!(plan.task_for("Farmer"), Some(Task::FarmCrops));
        assert_eq!(plan.task_for("Chef"), Some(Task::FarmCrops), "Scarcity outranks cooking");
    }

    #[test]
    fn test_default_food_tasks_by_tier() {
        let villagers = [
            Villager::new("Farmer", JobPath::Food).with_tier(Tier::JOURNEYMAN),
            Villager::new("Chef", JobPath::Food).with_tier(Tier::MASTER),
        ];
        let plan = plan_for(&villagers, &PLENTY);
        assert_eq!(plan.task_for("Farmer"), Some(Task::FarmCrops));
        assert_eq!(plan.task_for("Chef"), Some(Task::CookFood));
        assert_eq!(plan.reserved.get(Resource::Food), 10, "Cooking reserves its raw food");
    }

    #[test]
    fn test_chefs_share_raw_food() {
        let chefs = [
            Villager::new("C1", JobPath::Food).with_tier(Tier::MASTER),
            Villager::new("C2", JobPath::Food).with_tier(Tier::MASTER),
        ];
        let floors_off = SimulationConfig {
            scarcity_floors: Vec::new(),
            ..SimulationConfig::default()
        };
        let world = GridWorld::empty(4, 4, 0).unwrap();
        let analysis = EnvironmentAnalyzer::default().analyze(&world);
        let ledger = ResourceLedger::with_stock(&[(Resource::Food, 15)]);
        let buildings = BuildingCounts::new();
        let snapshot = OracleSnapshot {
            day: 1,
            ledger: &ledger,
            buildings: &buildings,
            villagers: &chefs,
            analysis: &analysis,
        };
        let plan = RuleBased::from_config(&floors_off).plan(&snapshot);
        assert_eq!(plan.task_for("C1"), Some(Task::CookFood));
        assert_eq!(plan.task_for("C2"), Some(Task::FarmCrops), "Only 15 food: one cook");
    }
}
