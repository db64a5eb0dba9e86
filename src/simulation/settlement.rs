//! Settlement - the context object that owns one simulation
//!
//! A settlement owns its grid, its population and the latest analysis, plus
//! the oracle strategy used to plan each day. Independent settlements share
//! nothing and can live on different threads.

use std::time::Duration;

use serde::Serialize;

use crate::analysis::{Analysis, EnvironmentAnalyzer};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, VillageError};
use crate::core::types::{Coord, Day, WorldId};
use crate::oracle::plan::Plan;
use crate::oracle::{AdvisoryBacked, AdvisoryFunction, Oracle, OracleSnapshot, RuleBased};
use crate::simulation::tick::{ExecutionResult, TickExecutor};
use crate::village::jobs::{JobPath, Resource, Tier};
use crate::village::ledger::{BuildingCounts, ResourceLedger};
use crate::village::villager::Villager;
use crate::village::PopulationLedger;
use crate::world::{EntityId, GenerationParams, GridWorld, HarvestOutcome, Tile};

/// Full observable state of a settlement
#[derive(Debug, Clone, Serialize)]
pub struct SettlementState {
    pub world_id: WorldId,
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
    pub villagers: Vec<Villager>,
    pub ledger: ResourceLedger,
    pub buildings: BuildingCounts,
    pub day: Day,
    pub oracle_position: Coord,
}

/// Result of a facade harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    pub entity: EntityId,
    pub coord: Coord,
    pub yield_amount: u32,
    pub outcome: HarvestOutcome,
}

pub struct Settlement {
    id: WorldId,
    config: SimulationConfig,
    world: GridWorld,
    population: PopulationLedger,
    analyzer: EnvironmentAnalyzer,
    analysis: Analysis,
    oracle: Box<dyn Oracle>,
}

impl Settlement {
    /// Generate a world and found a settlement on it.
    ///
    /// Bad dimensions, generation parameters or config are the only fatal
    /// errors in the crate.
    pub fn initialize(width: i32, height: i32, params: &GenerationParams, config: SimulationConfig) -> Result<Self> {
        params.validate().map_err(VillageError::Config)?;
        let world = GridWorld::generate(width, height, params)?;
        Self::from_world(world, config)
    }

    /// Found a settlement on an existing world, e.g. a scripted layout
    pub fn from_world(world: GridWorld, config: SimulationConfig) -> Result<Self> {
        config.validate().map_err(VillageError::Config)?;
        let population = PopulationLedger::from_config(&config)?;
        let analyzer = EnvironmentAnalyzer::from_config(&config);
        let analysis = analyzer.analyze(&world);
        let oracle: Box<dyn Oracle> = Box::new(RuleBased::from_config(&config));

        let id = WorldId::new();
        tracing::info!(
            "Settlement {} founded on a {}x{} map with {} villagers",
            id,
            world.width(),
            world.height(),
            population.len()
        );

        Ok(Self {
            id,
            config,
            world,
            population,
            analyzer,
            analysis,
            oracle,
        })
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn population(&self) -> &PopulationLedger {
        &self.population
    }

    pub fn day(&self) -> Day {
        self.population.day
    }

    pub fn state(&self) -> SettlementState {
        SettlementState {
            world_id: self.id,
            width: self.world.width(),
            height: self.world.height(),
            tiles: self.world.tiles().to_vec(),
            villagers: self.population.villagers().to_vec(),
            ledger: self.population.ledger.clone(),
            buildings: self.population.buildings.clone(),
            day: self.population.day,
            oracle_position: self.analysis.oracle_spawn.coord,
        }
    }

    /// Fell a tree and credit its wood.
    ///
    /// Already-harvested and unknown entities yield zero. Only an
    /// out-of-bounds coordinate is an error. A harvest that changes the
    /// world re-runs the analysis before returning.
    pub fn harvest(&mut self, x: i32, y: i32, entity: EntityId) -> Result<HarvestReport> {
        let coord = Coord::new(x, y);
        let (yield_amount, outcome) = match self.world.harvest(x, y, entity) {
            Ok(0) => (0, HarvestOutcome::AlreadyHarvested),
            Ok(amount) => (amount, HarvestOutcome::Harvested),
            Err(VillageError::UnknownEntity { .. }) => {
                tracing::debug!("No entity {} at {}", entity, coord);
                (0, HarvestOutcome::UnknownEntity)
            }
            Err(e) => return Err(e),
        };

        if outcome == HarvestOutcome::Harvested {
            self.population.ledger.add(Resource::Wood, yield_amount);
            self.reanalyze();
        }

        Ok(HarvestReport {
            entity,
            coord,
            yield_amount,
            outcome,
        })
    }

    /// The analysis of the current world state
    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    fn reanalyze(&mut self) {
        self.analysis = self.analyzer.analyze(&self.world);
    }

    /// Name of the active planning strategy
    pub fn oracle_name(&self) -> &'static str {
        self.oracle.name()
    }

    /// Plan the current day without applying it
    pub fn consult(&self) -> Plan {
        let snapshot = OracleSnapshot::new(&self.population, &self.analysis);
        self.oracle.plan(&snapshot)
    }

    pub fn apply_plan(&mut self, plan: &Plan) -> ExecutionResult {
        TickExecutor::new(&self.config).apply(&mut self.population, plan)
    }

    /// Consult and apply, advancing one day
    pub fn tick(&mut self) -> ExecutionResult {
        let plan = self.consult();
        tracing::debug!("Day {} planned by {}", self.population.day, plan.source);
        self.apply_plan(&plan)
    }

    pub fn simulate(&mut self, days: u32) -> Vec<ExecutionResult> {
        (0..days).map(|_| self.tick()).collect()
    }

    /// Install an advisory function, or `None` for rules only.
    ///
    /// The advisory is bounded by `advisory_timeout_ms` from the config.
    pub fn set_advisory_function(&mut self, advisor: Option<Box<dyn AdvisoryFunction>>) -> Result<()> {
        let fallback = RuleBased::from_config(&self.config);
        self.oracle = match advisor {
            Some(advisor) => {
                let timeout = Duration::from_millis(self.config.advisory_timeout_ms);
                Box::new(AdvisoryBacked::new(advisor, fallback, timeout)?)
            }
            None => Box::new(fallback),
        };
        tracing::info!("Settlement {} now planned by {}", self.id, self.oracle.name());
        Ok(())
    }

    /// Register a villager; `tier` defaults to apprentice
    pub fn add_villager(&mut self, name: &str, path: JobPath, tier: Option<Tier>) -> Result<()> {
        let villager = Villager::new(name, path).with_tier(tier.unwrap_or_default());
        self.population.add_villager(villager)
    }

    /// Multi-line status text
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("=== Day {} ===\n", self.population.day));

        let stock: Vec<String> = self
            .population
            .ledger
            .iter()
            .map(|(r, n)| format!("{} {}", r, n))
            .collect();
        s.push_str(&format!("Resources: {}\n", stock.join(", ")));

        let buildings: Vec<String> = self
            .population
            .buildings
            .iter()
            .map(|(b, n)| format!("{} {}", b, n))
            .collect();
        s.push_str(&format!("Buildings: {}\n", buildings.join(", ")));

        for v in self.population.villagers() {
            let task = v.task.map(|t| t.name()).unwrap_or("idle");
            s.push_str(&format!(
                "  {} - {} (tier {}), stamina {:.0}%, exp {}, task: {}\n",
                v.name,
                v.job_title(),
                v.tier.get(),
                v.stamina * 100.0,
                v.experience,
                task
            ));
        }

        s.push_str(&format!(
            "Oracle at {}. {}\n",
            self.analysis.oracle_spawn.coord, self.analysis.map_summary
        ));
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::PlanSource;
    use crate::village::jobs::Task;
    use crate::world::TreeKind;

    fn scripted() -> Settlement {
        let mut world = GridWorld::empty(6, 6, 3).unwrap();
        world.place_tree(Coord::new(1, 1), TreeKind::Oak).unwrap();
        world.place_tree(Coord::new(2, 1), TreeKind::Pine).unwrap();
        Settlement::from_world(world, SimulationConfig::default()).unwrap()
    }

    #[test]
    fn test_initialize_rejects_bad_dimensions() {
        let result = Settlement::initialize(0, 5, &GenerationParams::default(), SimulationConfig::default());
        assert!(matches!(result, Err(VillageError::InvalidDimensions { width: 0, height: 5 })));
    }

    #[test]
    fn test_initialize_rejects_bad_config() {
        let mut config = SimulationConfig::default();
        config.rest_recovery = 0.0;
        let result = Settlement::initialize(5, 5, &GenerationParams::default(), config);
        assert!(matches!(result, Err(VillageError::Config(_))));
    }

    #[test]
    fn test_settlements_get_distinct_ids() {
        assert_ne!(scripted().id(), scripted().id());
    }

    #[test]
    fn test_harvest_credits_wood_once() {
        let mut settlement = scripted();
        let report = settlement.harvest(1, 1, EntityId(0)).unwrap();
        assert_eq!(report.outcome, HarvestOutcome::Harvested);
        assert!((6..=15).contains(&report.yield_amount));
        assert_eq!(settlement.population().ledger.get(Resource::Wood), 50 + report.yield_amount);

        let again = settlement.harvest(1, 1, EntityId(0)).unwrap();
        assert_eq!(again.outcome, HarvestOutcome::AlreadyHarvested);
        assert_eq!(again.yield_amount, 0);
        assert_eq!(settlement.population().ledger.get(Resource::Wood), 50 + report.yield_amount);
    }

    #[test]
    fn test_harvest_unknown_and_out_of_bounds() {
        let mut settlement = scripted();
        let unknown = settlement.harvest(1, 1, EntityId(1)).unwrap();
        assert_eq!(unknown.outcome, HarvestOutcome::UnknownEntity);
        assert_eq!(unknown.yield_amount, 0);

        let result = settlement.harvest(6, 0, EntityId(0));
        assert!(matches!(result, Err(VillageError::InvalidPosition(_))));
    }

    #[test]
    fn test_tick_advances_day_and_reports_plan_source() {
        let mut settlement = scripted();
        let plan = settlement.consult();
        assert_eq!(plan.source, PlanSource::Rules);
        let result = settlement.tick();
        assert_eq!(result.day, 1);
        assert_eq!(settlement.day(), 2);
        assert_eq!(
            settlement.population().villager("Alice").unwrap().task,
            Some(Task::Gather(Resource::Wood))
        );
    }

    #[test]
    fn test_add_villager_rejects_duplicates() {
        let mut settlement = scripted();
        settlement.add_villager("Dora", JobPath::Stone, None).unwrap();
        assert!(matches!(
            settlement.add_villager("Dora", JobPath::Wood, None),
            Err(VillageError::DuplicateVillager(_))
        ));
        assert_eq!(settlement.state().villagers.len(), 4);
        assert_eq!(settlement.population().villager("Dora").unwrap().tier, Tier::APPRENTICE);
    }

    #[test]
    fn test_add_villager_with_starting_tier() {
        let mut settlement = scripted();
        settlement.add_villager("Eve", JobPath::Food, Some(Tier::MASTER)).unwrap();
        let eve = settlement.population().villager("Eve").unwrap();
        assert_eq!(eve.tier, Tier::MASTER);
        assert_eq!(eve.job_title(), "chef");
    }

    #[test]
    fn test_summary_lists_villagers() {
        let settlement = scripted();
        let summary = settlement.summary();
        assert!(summary.starts_with("=== Day 1 ==="));
        assert!(summary.contains("Alice - woodcutter (tier 1)"));
        assert!(summary.contains("Resources: wood 50, food 50, stone 20"));
    }
}
