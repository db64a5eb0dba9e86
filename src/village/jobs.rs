//! Job paths, tiers, resources and the tasks villagers can be given

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named resource counters tracked by the settlement ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Wood,
    Food,
    Stone,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Wood, Resource::Food, Resource::Stone];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Food => "food",
            Resource::Stone => "stone",
        }
    }

    /// The job path whose villagers gather this resource
    pub fn gathering_path(&self) -> JobPath {
        match self {
            Resource::Wood => JobPath::Wood,
            Resource::Food => JobPath::Food,
            Resource::Stone => JobPath::Stone,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job progression chain. Each path has three titled tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPath {
    Wood,
    Food,
    Stone,
}

impl JobPath {
    pub const ALL: [JobPath; 3] = [JobPath::Wood, JobPath::Food, JobPath::Stone];

    /// The resource this path gathers by default
    pub fn resource(&self) -> Resource {
        match self {
            JobPath::Wood => Resource::Wood,
            JobPath::Food => Resource::Food,
            JobPath::Stone => Resource::Stone,
        }
    }

    /// Job title held at the given tier
    pub fn title(&self, tier: Tier) -> &'static str {
        match (self, tier.get()) {
            (JobPath::Wood, 1) => "woodcutter",
            (JobPath::Wood, 2) => "lumberjack",
            (JobPath::Wood, _) => "builder",
            (JobPath::Food, 1) => "forager",
            (JobPath::Food, 2) => "farmer",
            (JobPath::Food, _) => "chef",
            (JobPath::Stone, 1) => "miner",
            (JobPath::Stone, 2) => "excavator",
            (JobPath::Stone, _) => "engineer",
        }
    }

    /// Resolve a job title back to its path and tier
    pub fn from_title(title: &str) -> Option<(JobPath, Tier)> {
        JobPath::ALL.iter().find_map(|path| {
            Tier::ALL
                .iter()
                .find(|tier| path.title(**tier) == title)
                .map(|tier| (*path, *tier))
        })
    }
}

impl FromStr for JobPath {
    type Err = String;

    /// Accepts a path name ("wood") or any job title on the path ("lumberjack")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wood" => Ok(JobPath::Wood),
            "food" => Ok(JobPath::Food),
            "stone" => Ok(JobPath::Stone),
            other => JobPath::from_title(other)
                .map(|(path, _)| path)
                .ok_or_else(|| format!("unknown job: {}", s)),
        }
    }
}

/// Job proficiency level, 1 through 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tier(u8);

impl Tier {
    pub const APPRENTICE: Tier = Tier(1);
    pub const JOURNEYMAN: Tier = Tier(2);
    pub const MASTER: Tier = Tier(3);
    pub const ALL: [Tier; 3] = [Tier::APPRENTICE, Tier::JOURNEYMAN, Tier::MASTER];

    pub fn new(value: u8) -> Option<Self> {
        (1..=3).contains(&value).then_some(Self(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// The tier one step up, if any. Promotions never skip a tier.
    pub fn next(&self) -> Option<Tier> {
        Tier::new(self.0 + 1)
    }

    pub fn is_max(&self) -> bool {
        self.0 == 3
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::APPRENTICE
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Tier::new(value).ok_or_else(|| format!("tier must be 1-3, got {}", value))
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.0
    }
}

/// Structures the settlement can construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    House,
    Workshop,
    Farm,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 3] = [BuildingKind::House, BuildingKind::Workshop, BuildingKind::Farm];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildingKind::House => "house",
            BuildingKind::Workshop => "workshop",
            BuildingKind::Farm => "farm",
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches('s') {
            "house" => Ok(BuildingKind::House),
            "workshop" => Ok(BuildingKind::Workshop),
            "farm" => Ok(BuildingKind::Farm),
            _ => Err(format!("unknown building: {}", s)),
        }
    }
}

/// A villager's task for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Task {
    /// Plain gathering of one resource
    Gather(Resource),
    /// Higher-yield food work for farmers and chefs
    FarmCrops,
    /// Turns raw food into more food; chefs only
    CookFood,
    Rest,
    Build(BuildingKind),
}

impl Task {
    /// Plain gather task for a job path
    pub fn gather_for(path: JobPath) -> Task {
        Task::Gather(path.resource())
    }

    /// Best gathering task a villager on `path` at `tier` can do.
    /// Farmers and chefs farm; everyone else gathers.
    pub fn work_for(path: JobPath, tier: Tier) -> Task {
        match path {
            JobPath::Food if tier >= Tier::JOURNEYMAN => Task::FarmCrops,
            _ => Task::gather_for(path),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::Gather(Resource::Wood) => "chop_wood",
            Task::Gather(Resource::Food) => "gather_food",
            Task::Gather(Resource::Stone) => "mine_stone",
            Task::FarmCrops => "farm_crops",
            Task::CookFood => "cook_food",
            Task::Rest => "rest",
            Task::Build(BuildingKind::House) => "build_house",
            Task::Build(BuildingKind::Workshop) => "build_workshop",
            Task::Build(BuildingKind::Farm) => "build_farm",
        }
    }

    /// Resource added to the ledger by this task, if it produces one
    pub fn produces(&self) -> Option<Resource> {
        match self {
            Task::Gather(resource) => Some(*resource),
            Task::FarmCrops | Task::CookFood => Some(Resource::Food),
            Task::Rest | Task::Build(_) => None,
        }
    }

    /// Whether a villager holding this path and tier may perform the task.
    ///
    /// | task | jobs |
    /// |---|---|
    /// | gather | any tier on the resource's path |
    /// | farm_crops | farmer, chef |
    /// | cook_food | chef |
    /// | build_house, build_workshop | builder, engineer |
    /// | build_farm | farmer, chef, builder |
    /// | rest | anyone |
    pub fn allowed_for(&self, path: JobPath, tier: Tier) -> bool {
        match self {
            Task::Gather(resource) => resource.gathering_path() == path,
            Task::FarmCrops => path == JobPath::Food && tier >= Tier::JOURNEYMAN,
            Task::CookFood => path == JobPath::Food && tier == Tier::MASTER,
            Task::Rest => true,
            Task::Build(BuildingKind::House | BuildingKind::Workshop) => {
                tier == Tier::MASTER && matches!(path, JobPath::Wood | JobPath::Stone)
            }
            Task::Build(BuildingKind::Farm) => match path {
                JobPath::Food => tier >= Tier::JOURNEYMAN,
                JobPath::Wood => tier == Tier::MASTER,
                JobPath::Stone => false,
            },
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "chop_wood" => Ok(Task::Gather(Resource::Wood)),
            "gather_food" => Ok(Task::Gather(Resource::Food)),
            "mine_stone" => Ok(Task::Gather(Resource::Stone)),
            "farm_crops" => Ok(Task::FarmCrops),
            "cook_food" => Ok(Task::CookFood),
            "rest" => Ok(Task::Rest),
            other => match other.strip_prefix("build_") {
                Some(building) => building.parse().map(Task::Build),
                None => Err(format!("unknown task: {}", s)),
            },
        }
    }
}

impl TryFrom<String> for Task {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Task> for String {
    fn from(task: Task) -> Self {
        task.name().to_string()
    }
}
