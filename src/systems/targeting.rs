//! Target selection - the furthest-along-the-path policy.
//!
//! Among enemies within range, a tower shoots the one closest to the exit.
//! Ties break toward the lower entity id (spawn order), so a selection is
//! fully determined by the grid contents - repeated calls within a tick
//! always agree, which replay and the tests rely on.

use crate::spatial::{EnemyEntry, SpatialGrid};

/// Pick the enemy a tower at `(x, y)` with `range` should shoot, if any.
pub fn select_target(grid: &SpatialGrid, x: f32, y: f32, range: f32) -> Option<EnemyEntry> {
    let mut best: Option<EnemyEntry> = None;
    for entry in grid.query_radius(x, y, range) {
        let better = match &best {
            None => true,
            Some(current) => {
                entry.progress > current.progress
                    || (entry.progress == current.progress && entry.entity < current.entity)
            }
        };
        if better {
            best = Some(entry);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::Entity;

    #[test]
    fn test_prefers_furthest_along_path() {
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(Entity::from_raw(1), 10.0, 0.0, 0.2);
        grid.insert(Entity::from_raw(2), 50.0, 0.0, 0.8);
        grid.insert(Entity::from_raw(3), 30.0, 0.0, 0.5);

        let target = select_target(&grid, 0.0, 0.0, 100.0).unwrap();
        assert_eq!(target.entity, Entity::from_raw(2));
    }

    #[test]
    fn test_no_target_out_of_range() {
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(Entity::from_raw(1), 150.0, 0.0, 0.9);

        assert!(select_target(&grid, 0.0, 0.0, 100.0).is_none());
    }

    #[test]
    fn test_ties_break_by_spawn_order() {
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(Entity::from_raw(9), 10.0, 0.0, 0.5);
        grid.insert(Entity::from_raw(2), 20.0, 0.0, 0.5);

        let target = select_target(&grid, 0.0, 0.0, 100.0).unwrap();
        assert_eq!(target.entity, Entity::from_raw(2));
    }

    #[test]
    fn test_selection_is_deterministic_within_a_tick() {
        let mut grid = SpatialGrid::new(64.0);
        for i in 0..16 {
            grid.insert(Entity::from_raw(i), i as f32 * 5.0, 0.0, 0.3);
        }

        let first = select_target(&grid, 0.0, 0.0, 100.0).unwrap();
        for _ in 0..50 {
            let again = select_target(&grid, 0.0, 0.0, 100.0).unwrap();
            assert_eq!(again.entity, first.entity);
        }
    }
}
