//! Particle effects - purely cosmetic, no gameplay reads them.
//!
//! Bursts use a deterministic golden-angle scatter instead of an RNG so
//! replays of the same run produce bit-identical state.

use crate::components::{Particle, ParticleBundle, Position};
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;

const BURST_LIFE: f32 = 0.5;
const BURST_BASE_SPEED: f32 = 40.0;

/// Outward velocity for particle `i` of a `count`-sized burst.
pub fn scatter_velocity(i: usize, count: usize) -> (f32, f32) {
    let angle = (i as f32 / count as f32) * std::f32::consts::TAU + i as f32 * 1.618;
    let speed = BURST_BASE_SPEED * (0.6 + ((i as f32 * 0.7).sin().abs()));
    (angle.cos() * speed, angle.sin() * speed)
}

/// Emit a burst of `count` particles at `(x, y)` from inside a system.
pub fn spawn_burst(commands: &mut Commands, x: f32, y: f32, color: &'static str, count: usize) {
    for i in 0..count {
        let (vx, vy) = scatter_velocity(i, count);
        commands.spawn(ParticleBundle {
            particle: Particle {
                vx,
                vy,
                life: BURST_LIFE,
                color,
            },
            position: Position::new(x, y),
        });
    }
}

/// Emit a burst directly into the world, for command handlers that run
/// outside the schedule.
pub fn spawn_burst_world(world: &mut World, x: f32, y: f32, color: &'static str, count: usize) {
    for i in 0..count {
        let (vx, vy) = scatter_velocity(i, count);
        world.spawn(ParticleBundle {
            particle: Particle {
                vx,
                vy,
                life: BURST_LIFE,
                color,
            },
            position: Position::new(x, y),
        });
    }
}

/// System that integrates particle motion and expires dead ones.
pub fn particle_update_system(
    dt: Res<DeltaTime>,
    mut commands: Commands,
    mut query: Query<(Entity, &mut Position, &mut Particle)>,
) {
    let delta = dt.0;
    for (entity, mut pos, mut particle) in query.iter_mut() {
        pos.x += particle.vx * delta;
        pos.y += particle.vy * delta;
        particle.life -= delta;
        if particle.life <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_drift_and_expire() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.3));

        let mut schedule = Schedule::default();
        schedule.add_systems(particle_update_system);

        world.spawn(ParticleBundle {
            particle: Particle {
                vx: 10.0,
                vy: 0.0,
                life: 0.5,
                color: "#ffd166",
            },
            position: Position::default(),
        });

        schedule.run(&mut world);
        {
            let mut query = world.query::<(&Position, &Particle)>();
            let (pos, particle) = query.single(&world);
            assert!((pos.x - 3.0).abs() < 1e-5);
            assert!(particle.life > 0.0);
        }

        // Second tick pushes life past zero and despawns.
        schedule.run(&mut world);
        let mut query = world.query::<&Particle>();
        assert_eq!(query.iter(&world).count(), 0);
    }

    #[test]
    fn test_scatter_is_deterministic() {
        assert_eq!(scatter_velocity(3, 8), scatter_velocity(3, 8));
    }
}
