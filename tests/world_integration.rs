//! Integration tests for the grid world and environment analysis
//!
//! These tests verify:
//! - Harvesting is idempotent and feeds back into the analysis
//! - Seeded generation is reproducible
//! - Spawn and cluster results on hand-built layouts

use oracle_village::analysis::EnvironmentAnalyzer;
use oracle_village::core::types::Coord;
use oracle_village::world::{EntityId, GenerationParams, GridWorld, HarvestOutcome, Terrain, TreeKind};
use oracle_village::{Settlement, SimulationConfig, VillageError};

/// 10x10 grid with 15 trees; tree 7 stands alone on (3,4)
fn fifteen_tree_world() -> GridWorld {
    let mut world = GridWorld::empty(10, 10, 7).unwrap();
    let layout = [
        ((0, 0), TreeKind::Pine),
        ((1, 0), TreeKind::Pine),
        ((2, 1), TreeKind::Birch),
        ((0, 2), TreeKind::Oak),
        ((1, 2), TreeKind::Oak),
        ((8, 0), TreeKind::Birch),
        ((9, 1), TreeKind::Pine),
        ((3, 4), TreeKind::Oak),
        ((8, 8), TreeKind::Oak),
        ((9, 8), TreeKind::Oak),
        ((8, 9), TreeKind::Pine),
        ((9, 9), TreeKind::Birch),
        ((7, 7), TreeKind::Pine),
        ((0, 9), TreeKind::Birch),
        ((1, 9), TreeKind::Birch),
    ];
    for ((x, y), kind) in layout {
        world.place_tree(Coord::new(x, y), kind).unwrap();
    }
    world
}

#[test]
fn test_harvest_scenario_on_fixed_layout() {
    let world = fifteen_tree_world();
    assert_eq!(world.active_tree_count(), 15);
    let mut settlement = Settlement::from_world(world, SimulationConfig::default()).unwrap();
    let before = settlement.analysis().tree_count;
    assert_eq!(before, 15);

    let first = settlement.harvest(3, 4, EntityId(7)).unwrap();
    assert_eq!(first.outcome, HarvestOutcome::Harvested);
    assert!(
        TreeKind::Oak.yield_range().contains(&first.yield_amount),
        "Oak yield {} out of range",
        first.yield_amount
    );

    let second = settlement.harvest(3, 4, EntityId(7)).unwrap();
    assert_eq!(second.yield_amount, 0, "Repeat harvest must yield nothing");
    assert_eq!(second.outcome, HarvestOutcome::AlreadyHarvested);

    assert_eq!(settlement.analysis().tree_count, before - 1);
    assert!((settlement.analysis().density - 0.14).abs() < 1e-9);
}

#[test]
fn test_fixed_layout_clusters_and_zones() {
    let world = fifteen_tree_world();
    let analysis = EnvironmentAnalyzer::default().analyze(&world);

    // Clusters by first scanned member: top-left, top-right, (3,4) joins the
    // top-left group through (1,2); bottom-left; bottom-right
    let sizes: Vec<usize> = analysis.clusters.iter().map(|c| c.size).collect();
    assert_eq!(sizes.iter().sum::<usize>(), 15);
    assert_eq!(analysis.resource_zones.len(), 2, "Zones: {:?}", analysis.resource_zones);
    assert!(analysis.resource_zones.iter().all(|z| z.size >= 5));
    assert!(analysis.resource_zones[0].size >= analysis.resource_zones[1].size);
}

#[test]
fn test_harvest_errors_at_grid_level() {
    let mut world = fifteen_tree_world();
    assert!(matches!(
        world.harvest(3, 4, EntityId(3)),
        Err(VillageError::UnknownEntity { entity: 3, .. })
    ));
    assert!(matches!(world.harvest(-1, 4, EntityId(7)), Err(VillageError::InvalidPosition(_))));
    assert_eq!(world.active_tree_count(), 15, "Failed harvests change nothing");
}

#[test]
fn test_generation_is_reproducible() {
    let params = GenerationParams::default().with_seed(1234);
    let a = GridWorld::generate(16, 12, &params).unwrap();
    let b = GridWorld::generate(16, 12, &params).unwrap();
    assert_eq!(a.tiles(), b.tiles());

    let c = GridWorld::generate(16, 12, &params.clone().with_seed(4321)).unwrap();
    assert_ne!(a.tiles(), c.tiles());
}

#[test]
fn test_generated_water_has_no_trees() {
    let world = GridWorld::generate(30, 30, &GenerationParams::default()).unwrap();
    for coord in world.query_by_terrain(Terrain::Water) {
        assert!(world.tile(coord).unwrap().trees.is_empty(), "Tree on water at {}", coord);
    }
}

#[test]
fn test_terrain_query_is_restartable() {
    let world = GridWorld::generate(8, 8, &GenerationParams::default()).unwrap();
    let query = world.query_by_terrain(Terrain::Grass);
    let first: Vec<Coord> = query.clone().collect();
    let second: Vec<Coord> = query.collect();
    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| (w[0].y, w[0].x) < (w[1].y, w[1].x)), "Row-major order");
}

#[test]
fn test_spawn_stays_valid_after_harvests() {
    let mut settlement = Settlement::from_world(fifteen_tree_world(), SimulationConfig::default()).unwrap();
    for (id, (x, y)) in [(8, (8, 8)), (12, (7, 7))] {
        settlement.harvest(x, y, EntityId(id)).unwrap();
        let spawn = settlement.analysis().oracle_spawn;
        let tile = settlement.world().tile(spawn.coord).unwrap();
        assert!(!spawn.fallback);
        assert_eq!(tile.terrain, Terrain::Grass);
        assert!(tile.is_clear());
    }
}
