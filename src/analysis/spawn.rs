//! Oracle spawn selection

use serde::{Deserialize, Serialize};

use crate::core::types::Coord;
use crate::world::{GridWorld, Terrain};

/// Where the oracle stands, and whether the collision-free search failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub coord: Coord,
    /// True when no clear tile of the allowed terrain existed and the exact
    /// grid center was used regardless of what stands there
    pub fallback: bool,
}

/// Pick the clear tile of `terrain` nearest the grid center.
///
/// Distance is Euclidean; ties go to the first tile in row-major order.
pub fn select_spawn(world: &GridWorld, terrain: Terrain) -> SpawnPoint {
    let center = world.center();
    let best = world
        .query_by_terrain(terrain)
        .filter(|coord| world.tile(*coord).is_some_and(|tile| tile.is_clear()))
        .min_by_key(|coord| coord.distance_squared(&center));

    match best {
        Some(coord) => SpawnPoint {
            coord,
            fallback: false,
        },
        None => {
            tracing::warn!("No clear {} tile; oracle placed at center {}", terrain.as_str(), center);
            SpawnPoint {
                coord: center,
                fallback: true,
            }
        }
    }
}
