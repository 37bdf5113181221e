//! Spatial partitioning for tower range queries.
//!
//! Divides the world into cells and tracks which live enemies are in each
//! cell, so a tower's in-range scan touches O(k) nearby entries instead of
//! every enemy. Rebuilt wholesale each tick, right after enemy movement,
//! so entries reflect current positions and exclude enemies despawned
//! earlier in the tick.

use crate::components::{EnemyStats, Health, PathProgress, Position};
use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// One live enemy as seen by the grid: position plus path progress, which is
/// everything targeting needs to rank candidates without a second lookup.
#[derive(Debug, Clone, Copy)]
pub struct EnemyEntry {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    pub progress: f32,
}

/// Grid-based spatial index over live enemies.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Cell size in world units.
    pub cell_size: f32,
    cells: HashMap<(i32, i32), Vec<EnemyEntry>>,
    count: usize,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(64.0)
    }
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            count: 0,
        }
    }

    #[inline]
    fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Drop all entries, ahead of a rebuild.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.count = 0;
    }

    pub fn insert(&mut self, entity: Entity, x: f32, y: f32, progress: f32) {
        let cell = self.world_to_cell(x, y);
        self.cells.entry(cell).or_default().push(EnemyEntry {
            entity,
            x,
            y,
            progress,
        });
        self.count += 1;
    }

    /// All enemies within `radius` of `(x, y)`, in no particular order.
    pub fn query_radius(&self, x: f32, y: f32, radius: f32) -> Vec<EnemyEntry> {
        let radius_sq = radius * radius;
        let reach = (radius / self.cell_size).ceil() as i32 + 1;
        let center = self.world_to_cell(x, y);

        let mut results = Vec::new();
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                let cell = (center.0 + dx, center.1 + dy);
                if let Some(entries) = self.cells.get(&cell) {
                    for entry in entries {
                        let dist_sq = (entry.x - x).powi(2) + (entry.y - y).powi(2);
                        if dist_sq <= radius_sq {
                            results.push(*entry);
                        }
                    }
                }
            }
        }
        results
    }

    pub fn total_count(&self) -> usize {
        self.count
    }
}

/// System that rebuilds the grid from live enemies each tick.
pub fn spatial_grid_update_system(
    mut grid: ResMut<SpatialGrid>,
    query: Query<(Entity, &Position, &PathProgress, &Health), With<EnemyStats>>,
) {
    grid.clear();
    for (entity, pos, progress, health) in query.iter() {
        if !health.is_alive() {
            continue;
        }
        grid.insert(entity, pos.x, pos.y, progress.t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_query_respects_distance() {
        let mut grid = SpatialGrid::new(50.0);
        grid.insert(Entity::from_raw(1), 10.0, 0.0, 0.1);
        grid.insert(Entity::from_raw(2), 90.0, 0.0, 0.2);
        grid.insert(Entity::from_raw(3), 500.0, 500.0, 0.3);

        let near = grid.query_radius(0.0, 0.0, 100.0);
        assert_eq!(near.len(), 2);

        let tight = grid.query_radius(0.0, 0.0, 20.0);
        assert_eq!(tight.len(), 1);
        assert_eq!(tight[0].entity, Entity::from_raw(1));
    }

    #[test]
    fn test_entries_carry_progress() {
        let mut grid = SpatialGrid::new(50.0);
        grid.insert(Entity::from_raw(7), 5.0, 5.0, 0.42);
        let found = grid.query_radius(0.0, 0.0, 50.0);
        assert_eq!(found.len(), 1);
        assert!((found[0].progress - 0.42).abs() < 1e-6);
    }

    #[test]
    fn test_rebuild_skips_dead_enemies() {
        use crate::components::{EnemyId, EnemyKind, SlowEffect};

        let mut world = World::new();
        world.insert_resource(SpatialGrid::new(50.0));

        let stats = EnemyKind::Normal.stats_for_wave(1);
        world.spawn(crate::components::EnemyBundle {
            id: EnemyId(0),
            kind: EnemyKind::Normal,
            stats,
            progress: PathProgress { t: 0.5 },
            position: Position::new(0.0, 0.0),
            health: Health::new(stats.max_hp),
            slow: SlowEffect::default(),
        });
        world.spawn(crate::components::EnemyBundle {
            id: EnemyId(1),
            kind: EnemyKind::Normal,
            stats,
            progress: PathProgress { t: 0.6 },
            position: Position::new(10.0, 0.0),
            health: Health { current: 0, max: stats.max_hp },
            slow: SlowEffect::default(),
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(spatial_grid_update_system);
        schedule.run(&mut world);

        let grid = world.resource::<SpatialGrid>();
        assert_eq!(grid.total_count(), 1);
    }
}
