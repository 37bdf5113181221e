//! Snapshot types - the serializable, read-only view of the simulation.
//!
//! A host renderer or HUD polls [`Snapshot`] each frame; nothing in it can
//! mutate simulation state. Kinds and phases are exported as strings so the
//! wire format stays stable if the enums grow.

use crate::api::RunStatus;
use crate::components::*;
use crate::economy::Ledger;
use crate::waves::WaveDirector;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// One tower as the renderer sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerView {
    pub id: u32,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub damage: i32,
    pub range: f32,
    pub fire_interval: f32,
    pub cooldown: f32,
    pub power_level: u8,
    pub utility_level: u8,
    pub color: String,
}

/// One enemy as the renderer sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub hp: i32,
    pub hp_max: i32,
    pub progress: f32,
    pub size: f32,
    pub slowed: bool,
    pub color: String,
}

/// One projectile in flight, with its cosmetic trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub x: f32,
    pub y: f32,
    pub trail: Vec<(f32, f32)>,
}

/// One cosmetic particle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub life: f32,
    pub color: String,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// `running`, `paused`, `game_over`, or `won`.
    pub status: String,
    /// Wave-machine phase: `idle`, `spawning`, `draining`, `complete`.
    pub phase: String,
    pub money: u32,
    pub lives: i32,
    pub wave: u32,
    pub towers: Vec<TowerView>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub particles: Vec<ParticleView>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, time: f32, status: RunStatus) -> Self {
        let ledger = world.resource::<Ledger>().clone();
        let phase = world.resource::<WaveDirector>().phase().label().to_string();

        let mut towers = Vec::new();
        let mut tower_query = world.query::<(
            &TowerId,
            &TowerKind,
            &Position,
            &TowerStats,
            &UpgradeState,
            &FireControl,
        )>();
        for (id, kind, pos, stats, upgrades, fire) in tower_query.iter(world) {
            towers.push(TowerView {
                id: id.0,
                kind: kind.label().to_string(),
                x: pos.x,
                y: pos.y,
                damage: stats.damage,
                range: stats.range,
                fire_interval: stats.fire_interval,
                cooldown: fire.cooldown,
                power_level: upgrades.power,
                utility_level: upgrades.utility,
                color: kind.color().to_string(),
            });
        }

        let mut enemies = Vec::new();
        let mut enemy_query = world.query::<(
            &EnemyId,
            &EnemyKind,
            &Position,
            &PathProgress,
            &Health,
            &EnemyStats,
            &SlowEffect,
        )>();
        for (id, kind, pos, progress, health, stats, slow) in enemy_query.iter(world) {
            enemies.push(EnemyView {
                id: id.0,
                kind: kind.label().to_string(),
                x: pos.x,
                y: pos.y,
                hp: health.current,
                hp_max: health.max,
                progress: progress.t,
                size: stats.size,
                slowed: slow.is_active(),
                color: kind.color().to_string(),
            });
        }

        let mut projectiles = Vec::new();
        let mut projectile_query = world.query_filtered::<(&Position, &Trail), With<Projectile>>();
        for (pos, trail) in projectile_query.iter(world) {
            projectiles.push(ProjectileView {
                x: pos.x,
                y: pos.y,
                trail: trail.points().collect(),
            });
        }

        let mut particles = Vec::new();
        let mut particle_query = world.query::<(&Position, &Particle)>();
        for (pos, particle) in particle_query.iter(world) {
            particles.push(ParticleView {
                x: pos.x,
                y: pos.y,
                life: particle.life,
                color: particle.color.to_string(),
            });
        }

        Self {
            tick,
            time,
            status: status.label().to_string(),
            phase,
            money: ledger.money(),
            lives: ledger.lives(),
            wave: ledger.wave(),
            towers,
            enemies,
            projectiles,
            particles,
        }
    }

    /// Serialize snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to a pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
