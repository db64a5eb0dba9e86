//! Settlement world - tile terrain and harvestable trees

pub mod generation;
pub mod grid;

pub use generation::GenerationParams;
pub use grid::{EntityId, GridWorld, HarvestOutcome, Terrain, TerrainQuery, Tile, Tree, TreeKind};
