//! Tile grid holding terrain and harvestable trees

use std::fmt;
use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VillageError};
use crate::core::types::Coord;

/// Terrain kind of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Open ground, the only terrain the oracle may spawn on
    Grass,
    /// Obstructed ground; trees grow here but nothing spawns
    Dirt,
    /// Impassable; never holds trees
    Water,
}

impl Terrain {
    pub const ALL: [Terrain; 3] = [Terrain::Grass, Terrain::Dirt, Terrain::Water];

    pub fn as_str(&self) -> &'static str {
        match self {
            Terrain::Grass => "grass",
            Terrain::Dirt => "dirt",
            Terrain::Water => "water",
        }
    }
}

/// Identity of a harvestable entity, unique per world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    Oak,
    Pine,
    Birch,
}

impl TreeKind {
    pub const ALL: [TreeKind; 3] = [TreeKind::Oak, TreeKind::Pine, TreeKind::Birch];

    /// Wood yielded by felling one tree of this kind (inclusive)
    pub fn yield_range(&self) -> RangeInclusive<u32> {
        match self {
            TreeKind::Oak => 6..=15,
            TreeKind::Pine => 5..=12,
            TreeKind::Birch => 5..=10,
        }
    }
}

/// A harvestable tree. Harvesting flags it; it is never re-created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub id: EntityId,
    pub coord: Coord,
    pub kind: TreeKind,
    pub harvested: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: Coord,
    pub terrain: Terrain,
    pub trees: Vec<Tree>,
}

impl Tile {
    /// Trees on this tile that have not been harvested
    pub fn active_trees(&self) -> impl Iterator<Item = &Tree> + '_ {
        self.trees.iter().filter(|t| !t.harvested)
    }

    pub fn is_clear(&self) -> bool {
        self.active_trees().next().is_none()
    }
}

/// Outcome of a harvest call that reached an existing entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestOutcome {
    Harvested,
    AlreadyHarvested,
    UnknownEntity,
}

/// The spatial store: terrain per tile plus tree placement
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: i32,
    height: i32,
    /// Row-major: index = y * width + x
    tiles: Vec<Tile>,
    next_entity: u32,
    rng: ChaCha8Rng,
}

impl GridWorld {
    /// An all-grass grid with no trees
    pub fn empty(width: i32, height: i32, seed: u64) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(VillageError::InvalidDimensions { width, height });
        }
        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| Coord::new(x, y)))
            .map(|coord| Tile {
                coord,
                terrain: Terrain::Grass,
                trees: Vec::new(),
            })
            .collect();
        Ok(Self {
            width,
            height,
            tiles,
            next_entity: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn area(&self) -> usize {
        self.tiles.len()
    }

    /// Integer grid center (width / 2, height / 2)
    pub fn center(&self) -> Coord {
        Coord::new(self.width / 2, self.height / 2)
    }

    #[inline]
    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    #[inline]
    fn index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some((coord.y * self.width + coord.x) as usize)
        } else {
            None
        }
    }

    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    fn tile_mut(&mut self, coord: Coord) -> Result<&mut Tile> {
        let index = self.index(coord).ok_or(VillageError::InvalidPosition(coord))?;
        Ok(&mut self.tiles[index])
    }

    /// All tiles in row-major order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn set_terrain(&mut self, coord: Coord, terrain: Terrain) -> Result<()> {
        let tile = self.tile_mut(coord)?;
        if terrain == Terrain::Water && !tile.trees.is_empty() {
            return Err(VillageError::InvalidPosition(coord));
        }
        tile.terrain = terrain;
        Ok(())
    }

    /// Place a new tree on a tile, returning its id
    pub fn place_tree(&mut self, coord: Coord, kind: TreeKind) -> Result<EntityId> {
        let id = EntityId(self.next_entity);
        let tile = self.tile_mut(coord)?;
        if tile.terrain == Terrain::Water {
            return Err(VillageError::InvalidPosition(coord));
        }
        tile.trees.push(Tree {
            id,
            coord,
            kind,
            harvested: false,
        });
        self.next_entity += 1;
        Ok(id)
    }

    /// Fell a tree. The first call yields wood from the kind's range; any
    /// later call for the same tree yields 0 and changes nothing.
    pub fn harvest(&mut self, x: i32, y: i32, entity: EntityId) -> Result<u32> {
        let coord = Coord::new(x, y);
        let index = self.index(coord).ok_or(VillageError::InvalidPosition(coord))?;
        let tree = self.tiles[index]
            .trees
            .iter_mut()
            .find(|t| t.id == entity)
            .ok_or(VillageError::UnknownEntity {
                at: coord,
                entity: entity.0,
            })?;

        if tree.harvested {
            return Ok(0);
        }
        tree.harvested = true;
        let amount = self.rng.gen_range(tree.kind.yield_range());
        tracing::debug!("Tree {} felled at {} for {} wood", entity, coord, amount);
        Ok(amount)
    }

    /// Lazily yields coordinates of tiles with the given terrain in
    /// row-major order. Clone the iterator to restart it.
    pub fn query_by_terrain(&self, terrain: Terrain) -> TerrainQuery<'_> {
        TerrainQuery {
            tiles: self.tiles.iter(),
            terrain,
        }
    }

    /// Every tree that has not been harvested, in row-major tile order
    pub fn active_trees(&self) -> impl Iterator<Item = &Tree> + '_ {
        self.tiles.iter().flat_map(|tile| tile.active_trees())
    }

    pub fn active_tree_count(&self) -> usize {
        self.active_trees().count()
    }

    pub fn total_tree_count(&self) -> usize {
        self.next_entity as usize
    }

    pub fn harvested_count(&self) -> usize {
        self.total_tree_count() - self.active_tree_count()
    }

    /// Number of tiles per terrain kind, in `Terrain::ALL` order
    pub fn terrain_counts(&self) -> [(Terrain, usize); 3] {
        Terrain::ALL.map(|terrain| (terrain, self.query_by_terrain(terrain).count()))
    }

    pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

/// Restartable terrain query over a grid's tiles
#[derive(Debug, Clone)]
pub struct TerrainQuery<'a> {
    tiles: std::slice::Iter<'a, Tile>,
    terrain: Terrain,
}

impl<'a> Iterator for TerrainQuery<'a> {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let terrain = self.terrain;
        self.tiles
            .by_ref()
            .find(|tile| tile.terrain == terrain)
            .map(|tile| tile.coord)
    }
}
