//! Proximity clustering of standing trees
//!
//! Trees within a fixed Chebyshev radius of each other are joined with a
//! union-find, so membership is transitive: a chain of near neighbours
//! forms one cluster even when its ends are far apart.

use serde::{Deserialize, Serialize};

use crate::core::types::Coord;
use crate::world::{EntityId, GridWorld};

/// A maximal group of standing trees. Ids are only stable within one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCluster {
    pub cluster_id: u32,
    /// Integer mean of member coordinates
    pub center: Coord,
    pub size: usize,
    pub members: Vec<EntityId>,
}

/// A cluster large enough to be worth sending gatherers to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceZone {
    pub cluster_id: u32,
    pub center: Coord,
    pub size: usize,
}

impl From<&ResourceCluster> for ResourceZone {
    fn from(cluster: &ResourceCluster) -> Self {
        Self {
            cluster_id: cluster.cluster_id,
            center: cluster.center,
            size: cluster.size,
        }
    }
}

/// Disjoint-set forest with path halving and union by rank
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Partition every standing tree into clusters.
///
/// Cluster ids ascend in the order each cluster's first member is met on a
/// row-major scan (y, then x, then entity id within a tile).
pub fn find_clusters(world: &GridWorld, radius: i32) -> Vec<ResourceCluster> {
    let trees: Vec<(EntityId, Coord)> = world.active_trees().map(|t| (t.id, t.coord)).collect();
    if trees.is_empty() {
        return Vec::new();
    }

    // Standing-tree indices per tile, so each tree only checks its neighbourhood
    let width = world.width();
    let mut per_tile: Vec<Vec<usize>> = vec![Vec::new(); world.area()];
    for (i, (_, coord)) in trees.iter().enumerate() {
        per_tile[(coord.y * width + coord.x) as usize].push(i);
    }

    let mut sets = UnionFind::new(trees.len());
    for (i, (_, coord)) in trees.iter().enumerate() {
        for y in (coord.y - radius).max(0)..=(coord.y + radius).min(world.height() - 1) {
            for x in (coord.x - radius).max(0)..=(coord.x + radius).min(width - 1) {
                for &j in &per_tile[(y * width + x) as usize] {
                    if j > i {
                        sets.union(i, j);
                    }
                }
            }
        }
    }

    let mut cluster_of_root: Vec<Option<usize>> = vec![None; trees.len()];
    let mut clusters: Vec<ResourceCluster> = Vec::new();
    let mut sums: Vec<(i64, i64)> = Vec::new();

    for (i, (id, coord)) in trees.iter().enumerate() {
        let root = sets.find(i);
        let slot = match cluster_of_root[root] {
            Some(slot) => slot,
            None => {
                let slot = clusters.len();
                cluster_of_root[root] = Some(slot);
                clusters.push(ResourceCluster {
                    cluster_id: slot as u32,
                    center: *coord,
                    size: 0,
                    members: Vec::new(),
                });
                sums.push((0, 0));
                slot
            }
        };
        clusters[slot].members.push(*id);
        clusters[slot].size += 1;
        sums[slot].0 += coord.x as i64;
        sums[slot].1 += coord.y as i64;
    }

    for (cluster, (sx, sy)) in clusters.iter_mut().zip(sums) {
        let n = cluster.size as i64;
        cluster.center = Coord::new((sx / n) as i32, (sy / n) as i32);
    }

    clusters
}

/// Clusters with at least `min_size` members, largest first (ties by
/// ascending id), truncated to `limit`.
pub fn shortlist_zones(clusters: &[ResourceCluster], min_size: usize, limit: usize) -> Vec<ResourceZone> {
    let mut zones: Vec<ResourceZone> = clusters
        .iter()
        .filter(|c| c.size >= min_size)
        .map(ResourceZone::from)
        .collect();
    zones.sort_by(|a, b| b.size.cmp(&a.size).then(a.cluster_id.cmp(&b.cluster_id)));
    zones.truncate(limit);
    zones
}
