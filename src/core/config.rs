//! Simulation configuration with documented constants
//!
//! All magic numbers used by the oracle and the tick executor are collected
//! here. A config is owned by its settlement and passed explicitly; there is
//! no process-wide instance.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VillageError};
use crate::village::jobs::{BuildingKind, JobPath, Resource, Task, Tier};
use crate::world::GenerationParams;

/// Configuration for the settlement systems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === ANALYSIS ===
    /// Chebyshev distance (tiles) within which two trees share a cluster
    pub cluster_radius: i32,

    /// Minimum cluster size to be listed as a resource zone
    pub resource_zone_min_size: usize,

    /// Maximum number of resource zones reported
    pub resource_zone_limit: usize,

    // === ORACLE ===
    /// Stamina below which a villager is always sent to rest
    pub survival_stamina: f32,

    /// Resource floors in priority order. The first resource below its
    /// floor pulls every villager on its path onto gathering.
    pub scarcity_floors: Vec<ScarcityFloor>,

    /// Experience gates for promotion
    pub promotion: PromotionTable,

    /// Build triggers in priority order
    pub construction: Vec<ConstructionTrigger>,

    /// Upper bound on one advisory call before falling back to rules
    pub advisory_timeout_ms: u64,

    // === TICK ===
    /// Per-path gathering yield, stamina cost and experience
    pub gather: GatherTable,

    /// Per-structure cost, stamina cost and experience
    pub buildings: BuildingTable,

    /// Output multiplier for tiers 1, 2 and 3
    pub tier_multipliers: [f32; 3],

    /// Stamina restored by one day of rest
    pub rest_recovery: f32,

    /// Experience never accumulates past this value
    pub experience_cap: u32,

    // === STARTING STATE ===
    pub starting_stock: Vec<(Resource, u32)>,
    pub starting_buildings: Vec<(BuildingKind, u32)>,
    pub starting_villagers: Vec<VillagerSeed>,
}

/// A resource floor used by the scarcity rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScarcityFloor {
    pub resource: Resource,
    pub floor: u32,
}

/// Experience and resource gates for tier changes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionTable {
    /// Experience that must be exceeded to go from tier 1 to tier 2
    pub apprentice_experience: u32,
    pub wood: MasterGate,
    pub food: MasterGate,
    pub stone: MasterGate,
}

/// Requirements for a tier 2 to tier 3 promotion on one path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MasterGate {
    /// Experience that must be exceeded
    pub experience: u32,
    /// Ledger resource that must be stocked
    pub resource: Resource,
    /// Minimum ledger count (inclusive)
    pub minimum: u32,
}

impl PromotionTable {
    pub fn master_gate(&self, path: JobPath) -> &MasterGate {
        match path {
            JobPath::Wood => &self.wood,
            JobPath::Food => &self.food,
            JobPath::Stone => &self.stone,
        }
    }
}

impl Default for PromotionTable {
    fn default() -> Self {
        Self {
            apprentice_experience: 70,
            wood: MasterGate {
                experience: 85,
                resource: Resource::Wood,
                minimum: 200,
            },
            food: MasterGate {
                experience: 90,
                resource: Resource::Food,
                minimum: 200,
            },
            stone: MasterGate {
                experience: 90,
                resource: Resource::Stone,
                minimum: 150,
            },
        }
    }
}

/// When a tier-3 villager on `path` should be sent to build `building`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionTrigger {
    pub building: BuildingKind,
    pub path: JobPath,
    /// Stock thresholds (inclusive) that must all hold
    pub requires: Vec<(Resource, u32)>,
}

/// Daily effect of one gathering task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatherProfile {
    pub base_rate: u32,
    pub stamina_cost: f32,
    pub experience: u32,
    /// Stock used up before the yield is added (all or nothing)
    #[serde(default)]
    pub consumes: Vec<(Resource, u32)>,
}

impl GatherProfile {
    fn new(base_rate: u32, stamina_cost: f32, experience: u32) -> Self {
        Self {
            base_rate,
            stamina_cost,
            experience,
            consumes: Vec::new(),
        }
    }
}

/// Gathering profiles per task.
///
/// Yield is `round(base_rate * tier_multiplier)`, rounding halves away from
/// zero. With the default 1.5x journeyman multiplier an odd base rate loses
/// the exact ratio: farm_crops (15) yields 23 at tier 2, not 22.5.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatherTable {
    pub wood: GatherProfile,
    pub food: GatherProfile,
    pub stone: GatherProfile,
    pub farm: GatherProfile,
    pub cook: GatherProfile,
}

impl GatherTable {
    /// Profile for plain gathering of a resource
    pub fn get(&self, resource: Resource) -> &GatherProfile {
        match resource {
            Resource::Wood => &self.wood,
            Resource::Food => &self.food,
            Resource::Stone => &self.stone,
        }
    }

    /// Profile for any producing task; None for rest and building
    pub fn for_task(&self, task: Task) -> Option<&GatherProfile> {
        match task {
            Task::Gather(resource) => Some(self.get(resource)),
            Task::FarmCrops => Some(&self.farm),
            Task::CookFood => Some(&self.cook),
            Task::Rest | Task::Build(_) => None,
        }
    }

    fn profiles(&self) -> [(&'static str, &GatherProfile); 5] {
        [
            ("wood", &self.wood),
            ("food", &self.food),
            ("stone", &self.stone),
            ("farm", &self.farm),
            ("cook", &self.cook),
        ]
    }
}

impl Default for GatherTable {
    fn default() -> Self {
        Self {
            wood: GatherProfile::new(10, 0.15, 5),
            food: GatherProfile::new(8, 0.12, 5),
            stone: GatherProfile::new(12, 0.20, 6),
            farm: GatherProfile::new(15, 0.18, 8),
            cook: GatherProfile {
                consumes: vec![(Resource::Food, 10)],
                ..GatherProfile::new(20, 0.10, 10)
            },
        }
    }
}

/// Cost and effort of constructing one structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingProfile {
    pub cost: Vec<(Resource, u32)>,
    pub stamina_cost: f32,
    pub experience: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingTable {
    pub house: BuildingProfile,
    pub workshop: BuildingProfile,
    pub farm: BuildingProfile,
}

impl BuildingTable {
    pub fn get(&self, kind: BuildingKind) -> &BuildingProfile {
        match kind {
            BuildingKind::House => &self.house,
            BuildingKind::Workshop => &self.workshop,
            BuildingKind::Farm => &self.farm,
        }
    }
}

impl Default for BuildingTable {
    fn default() -> Self {
        Self {
            house: BuildingProfile {
                cost: vec![(Resource::Wood, 50), (Resource::Stone, 30)],
                stamina_cost: 0.25,
                experience: 15,
            },
            workshop: BuildingProfile {
                cost: vec![(Resource::Wood, 80), (Resource::Stone, 60)],
                stamina_cost: 0.30,
                experience: 20,
            },
            farm: BuildingProfile {
                cost: vec![(Resource::Wood, 40), (Resource::Food, 20)],
                stamina_cost: 0.20,
                experience: 15,
            },
        }
    }
}

/// A villager present when the settlement is founded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillagerSeed {
    pub name: String,
    pub path: JobPath,
    #[serde(default)]
    pub tier: Tier,
}

impl VillagerSeed {
    pub fn new(name: &str, path: JobPath) -> Self {
        Self {
            name: name.to_string(),
            path,
            tier: Tier::APPRENTICE,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Analysis
            cluster_radius: 3,
            resource_zone_min_size: 5,
            resource_zone_limit: 5,

            // Oracle rules (wood > food > stone)
            survival_stamina: 0.2,
            scarcity_floors: vec![
                ScarcityFloor {
                    resource: Resource::Wood,
                    floor: 100,
                },
                ScarcityFloor {
                    resource: Resource::Food,
                    floor: 100,
                },
                ScarcityFloor {
                    resource: Resource::Stone,
                    floor: 80,
                },
            ],
            promotion: PromotionTable::default(),
            construction: vec![
                ConstructionTrigger {
                    building: BuildingKind::House,
                    path: JobPath::Wood,
                    requires: vec![(Resource::Wood, 200)],
                },
                ConstructionTrigger {
                    building: BuildingKind::Workshop,
                    path: JobPath::Stone,
                    requires: vec![(Resource::Stone, 150), (Resource::Wood, 100)],
                },
                ConstructionTrigger {
                    building: BuildingKind::Farm,
                    path: JobPath::Food,
                    requires: vec![(Resource::Food, 180)],
                },
            ],
            advisory_timeout_ms: 5_000,

            // Tick effects
            gather: GatherTable::default(),
            buildings: BuildingTable::default(),
            tier_multipliers: [1.0, 1.5, 2.0],
            rest_recovery: 0.40,
            experience_cap: 100,

            // Founding state
            starting_stock: vec![(Resource::Wood, 50), (Resource::Food, 50), (Resource::Stone, 20)],
            starting_buildings: vec![(BuildingKind::House, 1)],
            starting_villagers: vec![
                VillagerSeed::new("Alice", JobPath::Wood),
                VillagerSeed::new("Bob", JobPath::Food),
                VillagerSeed::new("Charlie", JobPath::Stone),
            ],
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Output multiplier for a tier
    pub fn tier_multiplier(&self, tier: Tier) -> f32 {
        self.tier_multipliers[(tier.get() - 1) as usize]
    }

    /// Parse a config from TOML text. Missing fields take default values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimulationConfig =
            toml::from_str(text).map_err(|e| VillageError::Config(e.to_string()))?;
        config.validate().map_err(VillageError::Config)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.cluster_radius < 0 {
            return Err(format!("cluster_radius ({}) must be >= 0", self.cluster_radius));
        }

        if !(0.0..=1.0).contains(&self.survival_stamina) {
            return Err(format!(
                "survival_stamina ({}) must lie in [0, 1]",
                self.survival_stamina
            ));
        }

        if !(self.rest_recovery > 0.0 && self.rest_recovery <= 1.0) {
            return Err(format!("rest_recovery ({}) must lie in (0, 1]", self.rest_recovery));
        }

        // Multipliers must not shrink output as tiers rise
        if self.tier_multipliers.iter().any(|m| !m.is_finite() || *m <= 0.0)
            || self.tier_multipliers.windows(2).any(|w| w[1] < w[0])
        {
            return Err(format!(
                "tier_multipliers {:?} must be finite, positive and non-decreasing",
                self.tier_multipliers
            ));
        }

        for (name, profile) in self.gather.profiles() {
            check_stamina_cost(&format!("gather.{}", name), profile.stamina_cost)?;
            check_unique_resources(&format!("gather.{}.consumes", name), &profile.consumes)?;
        }
        for kind in BuildingKind::ALL {
            let profile = self.buildings.get(kind);
            check_stamina_cost(&format!("buildings.{}", kind), profile.stamina_cost)?;
            check_unique_resources(&format!("buildings.{}.cost", kind), &profile.cost)?;
        }

        if self.advisory_timeout_ms == 0 {
            return Err("advisory_timeout_ms must be greater than zero".into());
        }

        let mut names: Vec<&str> = Vec::with_capacity(self.starting_villagers.len());
        for seed in &self.starting_villagers {
            if names.contains(&seed.name.as_str()) {
                return Err(format!("villager '{}' defined more than once", seed.name));
            }
            names.push(&seed.name);
        }

        Ok(())
    }
}

fn check_stamina_cost(what: &str, cost: f32) -> std::result::Result<(), String> {
    if !(0.0..=1.0).contains(&cost) {
        return Err(format!("{} stamina_cost ({}) must lie in [0, 1]", what, cost));
    }
    Ok(())
}

// consume_materials checks each entry on its own, so a repeated resource
// could pass the check and then be partly deducted
fn check_unique_resources(what: &str, cost: &[(Resource, u32)]) -> std::result::Result<(), String> {
    for (i, (resource, _)) in cost.iter().enumerate() {
        if cost[..i].iter().any(|(seen, _)| seen == resource) {
            return Err(format!("{} lists {} more than once", what, resource));
        }
    }
    Ok(())
}

/// On-disk settings file: `[simulation]` and `[generation]` tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub simulation: SimulationConfig,
    pub generation: GenerationParams,
}

impl ConfigFile {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| VillageError::Config(e.to_string()))?;
        file.simulation.validate().map_err(VillageError::Config)?;
        file.generation.validate().map_err(VillageError::Config)?;
        Ok(file)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
