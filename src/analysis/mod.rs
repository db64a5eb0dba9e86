//! Environment analysis - turns raw grid state into a strategic summary
//!
//! The analyzer reads a `GridWorld` and produces a disposable `Analysis`:
//! - tree count and density
//! - proximity clusters and the resource-zone shortlist
//! - the oracle's spawn coordinate
//!
//! Analyses are snapshots. They must be recomputed whenever the set of
//! standing trees changes.

pub mod clusters;
pub mod spawn;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::world::{GridWorld, Terrain};

pub use clusters::{find_clusters, shortlist_zones, ResourceCluster, ResourceZone};
pub use spawn::{select_spawn, SpawnPoint};

/// Tile counts by terrain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainSummary {
    pub grass: usize,
    pub dirt: usize,
    pub water: usize,
}

/// Strategic summary of one world state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub oracle_spawn: SpawnPoint,
    pub tree_count: usize,
    /// Standing trees per tile
    pub density: f64,
    pub clusters: Vec<ResourceCluster>,
    pub resource_zones: Vec<ResourceZone>,
    pub terrain: TerrainSummary,
    pub map_summary: String,
}

/// Stateless analyzer parameterized by the settlement config
#[derive(Debug, Clone)]
pub struct EnvironmentAnalyzer {
    pub cluster_radius: i32,
    pub zone_min_size: usize,
    pub zone_limit: usize,
    pub spawn_terrain: Terrain,
}

impl Default for EnvironmentAnalyzer {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl EnvironmentAnalyzer {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            cluster_radius: config.cluster_radius,
            zone_min_size: config.resource_zone_min_size,
            zone_limit: config.resource_zone_limit,
            spawn_terrain: Terrain::Grass,
        }
    }

    pub fn analyze(&self, world: &GridWorld) -> Analysis {
        let tree_count = world.active_tree_count();
        let density = tree_count as f64 / world.area() as f64;
        let clusters = find_clusters(world, self.cluster_radius);
        let resource_zones = shortlist_zones(&clusters, self.zone_min_size, self.zone_limit);
        let oracle_spawn = select_spawn(world, self.spawn_terrain);

        let mut terrain = TerrainSummary::default();
        for (kind, count) in world.terrain_counts() {
            match kind {
                Terrain::Grass => terrain.grass = count,
                Terrain::Dirt => terrain.dirt = count,
                Terrain::Water => terrain.water = count,
            }
        }

        let map_summary = format!(
            "Map {}x{} with {} trees ({:.1}% density). Terrain: {} grass, {} dirt, {} water tiles. {} tree clusters identified.",
            world.width(),
            world.height(),
            tree_count,
            density * 100.0,
            terrain.grass,
            terrain.dirt,
            terrain.water,
            clusters.len()
        );

        tracing::debug!(
            "Analysis: {} trees, {} clusters, {} zones, spawn {}",
            tree_count,
            clusters.len(),
            resource_zones.len(),
            oracle_spawn.coord
        );

        Analysis {
            oracle_spawn,
            tree_count,
            density,
            clusters,
            resource_zones,
            terrain,
            map_summary,
        }
    }
}
