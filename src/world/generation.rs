//! Seeded world generation: terrain weights and tree scattering

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VillageError};
use crate::core::types::Coord;
use crate::world::grid::{GridWorld, Terrain, TreeKind};

/// Parameters controlling terrain and tree density
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Seed for the world's random stream; equal seeds give equal layouts
    pub seed: u64,
    pub grass_weight: f64,
    pub dirt_weight: f64,
    pub water_weight: f64,
    /// Probability that a non-water tile carries trees at all
    pub tree_chance: f64,
    pub min_trees_per_tile: u32,
    pub max_trees_per_tile: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: 42,
            grass_weight: 0.75,
            dirt_weight: 0.15,
            water_weight: 0.10,
            tree_chance: 0.7,
            min_trees_per_tile: 1,
            max_trees_per_tile: 2,
        }
    }
}

impl GenerationParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let weights = [self.grass_weight, self.dirt_weight, self.water_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(format!("terrain weights {:?} must be finite and >= 0", weights));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err("at least one terrain weight must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.tree_chance) {
            return Err(format!("tree_chance ({}) must lie in [0, 1]", self.tree_chance));
        }
        if self.min_trees_per_tile > self.max_trees_per_tile {
            return Err(format!(
                "min_trees_per_tile ({}) exceeds max_trees_per_tile ({})",
                self.min_trees_per_tile, self.max_trees_per_tile
            ));
        }
        Ok(())
    }
}

impl GridWorld {
    /// Generate a world, drawing terrain and trees per tile from the
    /// params' seeded stream.
    pub fn generate(width: i32, height: i32, params: &GenerationParams) -> Result<Self> {
        params.validate().map_err(VillageError::Config)?;
        let mut world = GridWorld::empty(width, height, params.seed)?;

        let terrain_pick = WeightedIndex::new([
            params.grass_weight,
            params.dirt_weight,
            params.water_weight,
        ])
        .map_err(|e| VillageError::Config(e.to_string()))?;

        for y in 0..height {
            for x in 0..width {
                let coord = Coord::new(x, y);
                let rng = world.rng_mut();
                let terrain = Terrain::ALL[terrain_pick.sample(rng)];
                let tree_count = if terrain != Terrain::Water && rng.gen_bool(params.tree_chance) {
                    rng.gen_range(params.min_trees_per_tile..=params.max_trees_per_tile)
                } else {
                    0
                };
                let kinds: Vec<TreeKind> = (0..tree_count)
                    .map(|_| TreeKind::ALL[rng.gen_range(0..TreeKind::ALL.len())])
                    .collect();

                world.set_terrain(coord, terrain)?;
                for kind in kinds {
                    world.place_tree(coord, kind)?;
                }
            }
        }

        tracing::info!(
            "Generated {}x{} grid with {} trees",
            width,
            height,
            world.active_tree_count()
        );
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_layout() {
        let params = GenerationParams::default().with_seed(11);
        let a = GridWorld::generate(12, 9, &params).unwrap();
        let b = GridWorld::generate(12, 9, &params).unwrap();
        assert_eq!(a.tiles(), b.tiles());
    }

    #[test]
    fn test_different_seed_different_layout() {
        let a = GridWorld::generate(20, 20, &GenerationParams::default().with_seed(1)).unwrap();
        let b = GridWorld::generate(20, 20, &GenerationParams::default().with_seed(2)).unwrap();
        assert_ne!(a.tiles(), b.tiles());
    }

    #[test]
    fn test_no_trees_on_water() {
        let world = GridWorld::generate(30, 30, &GenerationParams::default()).unwrap();
        for tile in world.tiles() {
            if tile.terrain == Terrain::Water {
                assert!(tile.trees.is_empty(), "Water tile {} has trees", tile.coord);
            } else {
                assert!(tile.trees.len() <= 2);
            }
        }
    }

    #[test]
    fn test_generate_rejects_bad_input() {
        assert!(matches!(
            GridWorld::generate(0, 10, &GenerationParams::default()),
            Err(VillageError::InvalidDimensions { .. })
        ));

        let params = GenerationParams {
            min_trees_per_tile: 3,
            max_trees_per_tile: 1,
            ..Default::default()
        };
        assert!(matches!(
            GridWorld::generate(5, 5, &params),
            Err(VillageError::Config(_))
        ));
    }

    #[test]
    fn test_treeless_generation() {
        let params = GenerationParams {
            tree_chance: 0.0,
            ..Default::default()
        };
        let world = GridWorld::generate(10, 10, &params).unwrap();
        assert_eq!(world.active_tree_count(), 0);
    }
}
