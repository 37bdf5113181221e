//! Enemy update system - advances enemies along the path and resolves
//! leaks and deaths.
//!
//! Per-enemy order within one tick: slow multiplier, advance, slow decay,
//! regen, then the terminal checks. The leak check runs before the death
//! check: reaching the end of the path is terminal regardless of remaining
//! hp, costs a life, and never grants a reward. Despawns go through the
//! command buffer, so the pass iterates a stable collection and removals
//! land after it.

use crate::components::*;
use crate::economy::Ledger;
use crate::path::Path;
use crate::systems::particles::spawn_burst;
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Movement multiplier while a slow effect is active.
pub const SLOW_MULTIPLIER: f32 = 0.5;

/// System that moves every live enemy and settles its fate for the tick.
pub fn enemy_update_system(
    dt: Res<DeltaTime>,
    path: Res<Path>,
    mut ledger: ResMut<Ledger>,
    mut commands: Commands,
    mut query: Query<(
        Entity,
        &EnemyKind,
        &EnemyStats,
        &mut PathProgress,
        &mut Position,
        &mut Health,
        &mut SlowEffect,
        Option<&mut Regeneration>,
    )>,
) {
    let delta = dt.0;
    for (entity, kind, stats, mut progress, mut pos, mut health, mut slow, regen) in
        query.iter_mut()
    {
        let slow_mult = if slow.is_active() {
            SLOW_MULTIPLIER
        } else {
            1.0
        };
        progress.advance(stats.base_speed * delta * slow_mult);
        let (x, y) = path.point_at(progress.t);
        pos.x = x;
        pos.y = y;

        slow.decay(delta);

        if let Some(mut regen) = regen {
            regen.timer -= delta;
            if regen.timer <= 0.0 {
                health.heal(regen.amount);
                regen.timer += regen.interval;
            }
        }

        // Leak beats death: an enemy that reaches the exit this tick costs a
        // life even if its hp also hit zero.
        if progress.at_end() {
            ledger.lose_life();
            log::debug!("enemy leaked, lives left: {}", ledger.lives());
            spawn_burst(&mut commands, x, y, kind.color(), 6);
            commands.entity(entity).despawn();
        } else if !health.is_alive() {
            ledger.credit(stats.reward);
            spawn_burst(&mut commands, x, y, kind.color(), 10);
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world(path: Path) -> World {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0));
        world.insert_resource(path);
        world.insert_resource(Ledger::new(100, 10));
        world
    }

    fn straight_path() -> Path {
        Path::new(vec![(0.0, 0.0), (1000.0, 0.0)]).unwrap()
    }

    fn spawn_enemy(world: &mut World, kind: EnemyKind, t: f32, hp: i32) -> Entity {
        let mut stats = kind.stats_for_wave(1);
        stats.base_speed = 0.1; // one tenth of the path per second
        world
            .spawn(EnemyBundle {
                id: EnemyId(0),
                kind,
                stats,
                progress: PathProgress { t },
                position: Position::default(),
                health: Health {
                    current: hp,
                    max: stats.max_hp.max(hp),
                },
                slow: SlowEffect::default(),
            })
            .id()
    }

    fn run_tick(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(enemy_update_system);
        schedule.run(world);
    }

    #[test]
    fn test_advances_and_caches_position() {
        let mut world = test_world(straight_path());
        let enemy = spawn_enemy(&mut world, EnemyKind::Normal, 0.0, 30);

        run_tick(&mut world);

        let progress = world.get::<PathProgress>(enemy).unwrap();
        assert!((progress.t - 0.1).abs() < 1e-6);
        let pos = world.get::<Position>(enemy).unwrap();
        assert!((pos.x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_slow_halves_advance_and_decays() {
        let mut world = test_world(straight_path());
        let enemy = spawn_enemy(&mut world, EnemyKind::Normal, 0.0, 30);
        world.get_mut::<SlowEffect>(enemy).unwrap().remaining = 1.5;

        run_tick(&mut world);

        let progress = world.get::<PathProgress>(enemy).unwrap();
        assert!((progress.t - 0.05).abs() < 1e-6);
        let slow = world.get::<SlowEffect>(enemy).unwrap();
        assert!((slow.remaining - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_regen_heals_capped_at_max() {
        let mut world = test_world(straight_path());
        let enemy = spawn_enemy(&mut world, EnemyKind::Regen, 0.0, 30);
        world.get_mut::<Health>(enemy).unwrap().max = 32;
        world.entity_mut(enemy).insert(Regeneration {
            timer: 0.5,
            interval: 1.5,
            amount: 5,
        });

        run_tick(&mut world);

        let health = world.get::<Health>(enemy).unwrap();
        assert_eq!(health.current, 32); // 30 + 5, capped at 32
        let regen = world.get::<Regeneration>(enemy).unwrap();
        assert!(regen.timer > 0.0);
    }

    #[test]
    fn test_leak_costs_a_life_and_pays_nothing() {
        let mut world = test_world(straight_path());
        spawn_enemy(&mut world, EnemyKind::Normal, 0.95, 15);

        run_tick(&mut world);

        let ledger = world.resource::<Ledger>();
        assert_eq!(ledger.lives(), 9);
        assert_eq!(ledger.money(), 100);
        let mut enemies = world.query::<&EnemyStats>();
        assert_eq!(enemies.iter(&world).count(), 0);
    }

    #[test]
    fn test_death_rewards_once_and_removes() {
        let mut world = test_world(straight_path());
        spawn_enemy(&mut world, EnemyKind::Normal, 0.2, 0);

        run_tick(&mut world);

        let ledger = world.resource::<Ledger>();
        assert_eq!(ledger.lives(), 10);
        assert_eq!(ledger.money(), 100 + 8);
        let mut enemies = world.query::<&EnemyStats>();
        assert_eq!(enemies.iter(&world).count(), 0);

        // A second tick must not pay again.
        run_tick(&mut world);
        assert_eq!(world.resource::<Ledger>().money(), 108);
    }

    #[test]
    fn test_leak_takes_precedence_over_death() {
        let mut world = test_world(straight_path());
        // Both terminal conditions become true on the same tick.
        spawn_enemy(&mut world, EnemyKind::Normal, 0.95, 0);

        run_tick(&mut world);

        let ledger = world.resource::<Ledger>();
        assert_eq!(ledger.lives(), 9);
        assert_eq!(ledger.money(), 100);
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut world = test_world(straight_path());
        let enemy = spawn_enemy(&mut world, EnemyKind::Normal, 0.0, 1000);
        world.get_mut::<SlowEffect>(enemy).unwrap().remaining = 2.0;

        let mut last = 0.0;
        for _ in 0..8 {
            run_tick(&mut world);
            if let Some(progress) = world.get::<PathProgress>(enemy) {
                assert!(progress.t >= last);
                last = progress.t;
            }
        }
    }
}
