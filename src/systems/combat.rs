//! Tower combat systems - buff auras, firing, and projectile resolution.
//!
//! Three passes per tick, in schedule order:
//! 1. `buff_aura_system` resets every tower's transient multipliers and
//!    reapplies the strongest overlapping aura per stat.
//! 2. `tower_fire_system` counts down cooldowns and spawns homing
//!    projectiles at the selected target.
//! 3. `projectile_system` re-samples each target's current position, snaps
//!    onto it when the tick's travel covers the remaining distance, applies
//!    damage and status, and expires strays by TTL.

use crate::components::*;
use crate::systems::movement::DeltaTime;
use crate::systems::particles::spawn_burst;
use crate::systems::targeting::select_target;
use crate::spatial::SpatialGrid;
use bevy_ecs::prelude::*;

/// Flight time budget per projectile, seconds.
pub const PROJECTILE_TTL: f32 = 1.2;
/// Trail ring-buffer capacity.
pub const TRAIL_CAPACITY: usize = 8;
const IMPACT_BURST: usize = 3;

/// Recompute the transient buff multipliers on every tower.
///
/// Multipliers never persist: a sold buff tower or a receiver out of range
/// simply stops being counted on the next tick.
pub fn buff_aura_system(
    mut towers: Query<(&Position, &TowerStats, &mut BuffState, Option<&Aura>)>,
) {
    let auras: Vec<(f32, f32, f32, Aura)> = towers
        .iter()
        .filter_map(|(pos, stats, _, aura)| aura.map(|a| (pos.x, pos.y, stats.range, *a)))
        .collect();

    for (pos, _, mut buff, aura) in towers.iter_mut() {
        buff.reset();
        if aura.is_some() {
            // Buff towers do not buff themselves or each other.
            continue;
        }
        for (ax, ay, radius, aura) in &auras {
            let dx = pos.x - ax;
            let dy = pos.y - ay;
            if dx * dx + dy * dy <= radius * radius {
                buff.apply_strongest(aura);
            }
        }
    }
}

/// Count down cooldowns and fire at the furthest-along enemy in range.
pub fn tower_fire_system(
    dt: Res<DeltaTime>,
    grid: Res<SpatialGrid>,
    mut commands: Commands,
    mut towers: Query<(&TowerKind, &Position, &TowerStats, &BuffState, &mut FireControl)>,
) {
    let delta = dt.0;
    for (kind, pos, stats, buff, mut fire) in towers.iter_mut() {
        if kind.is_support() {
            continue;
        }
        fire.cooldown = (fire.cooldown - delta).max(0.0);
        if fire.cooldown > 0.0 {
            continue;
        }
        let Some(target) = select_target(&grid, pos.x, pos.y, stats.range) else {
            continue;
        };
        let damage = (stats.damage as f32 * buff.damage_mult).round() as i32;
        commands.spawn(ProjectileBundle {
            projectile: Projectile {
                target: target.entity,
                speed: stats.projectile_speed,
                damage,
                slow_duration: stats.slow_duration,
                ttl: PROJECTILE_TTL,
            },
            position: Position::new(pos.x, pos.y),
            trail: Trail::new(TRAIL_CAPACITY),
        });
        fire.cooldown = stats.fire_interval * buff.rate_mult;
    }
}

/// Advance every projectile toward its target's current position.
pub fn projectile_system(
    dt: Res<DeltaTime>,
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Position, &mut Trail)>,
    mut enemies: Query<
        (&EnemyKind, &Position, &mut Health, &mut SlowEffect),
        Without<Projectile>,
    >,
) {
    let delta = dt.0;
    for (entity, mut projectile, mut pos, mut trail) in projectiles.iter_mut() {
        trail.push(pos.x, pos.y);

        // Re-validate the weak handle every tick; a despawned target means
        // the shot is discarded without effect.
        let Ok((kind, target_pos, mut health, mut slow)) = enemies.get_mut(projectile.target)
        else {
            commands.entity(entity).despawn();
            continue;
        };

        let dx = target_pos.x - pos.x;
        let dy = target_pos.y - pos.y;
        let dist = (dx * dx + dy * dy).sqrt();
        let step = projectile.speed * delta;

        if dist <= step {
            // Impact: snap to the target, never overshoot.
            pos.x = target_pos.x;
            pos.y = target_pos.y;
            let dealt =
                (projectile.damage as f32 * kind.damage_taken_multiplier()).round() as i32;
            health.damage(dealt);
            if let Some(duration) = projectile.slow_duration {
                slow.refresh(duration);
            }
            spawn_burst(&mut commands, pos.x, pos.y, "#ffd166", IMPACT_BURST);
            commands.entity(entity).despawn();
            continue;
        }

        pos.x += dx / dist * step;
        pos.y += dy / dist * step;

        projectile.ttl -= delta;
        if projectile.ttl <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}
