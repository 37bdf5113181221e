//! ECS components for the Rampart simulation.
//!
//! Components are pure data containers attached to entities; all game logic
//! lives in systems that query them. The static per-kind parameter tables
//! are methods on the kind enums - loaded at spawn time, never mutated by
//! the running simulation.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in world coordinates.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Fractional progress along the whole path, `0..1`.
/// Monotonically non-decreasing while the enemy is alive.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PathProgress {
    pub t: f32,
}

impl PathProgress {
    pub fn advance(&mut self, amount: f32) {
        self.t += amount;
    }

    pub fn at_end(&self) -> bool {
        self.t >= 1.0
    }
}

// ============================================================================
// ENEMY COMPONENTS
// ============================================================================

/// Unique identifier for an enemy, stable across its lifetime.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Enemy variant.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Normal,
    Fast,
    Armored,
    Regen,
    Tank,
    Swarm,
    Boss,
}

impl EnemyKind {
    /// Parameters for this kind on the given wave. The base curve scales
    /// with the wave number; each kind multiplies it.
    pub fn stats_for_wave(&self, wave: u32) -> EnemyStats {
        let base_hp = (30 + 10 * wave) as f32;
        let base_speed = 0.035 + (0.003 * wave as f32).min(0.05);
        let (hp_mult, speed_mult, reward, size) = match self {
            EnemyKind::Normal => (1.0, 1.0, 8, 10.0),
            EnemyKind::Fast => (0.6, 1.7, 10, 8.0),
            EnemyKind::Armored => (1.4, 0.8, 14, 11.0),
            EnemyKind::Regen => (1.2, 0.9, 14, 10.0),
            EnemyKind::Tank => (2.5, 0.6, 20, 14.0),
            EnemyKind::Swarm => (0.35, 1.3, 4, 6.0),
            EnemyKind::Boss => (8.0, 0.45, 120, 22.0),
        };
        EnemyStats {
            max_hp: ((base_hp * hp_mult).round() as i32).max(1),
            base_speed: base_speed * speed_mult,
            reward,
            size,
        }
    }

    /// Incoming-damage multiplier. Armored enemies shrug off part of every
    /// hit.
    pub fn damage_taken_multiplier(&self) -> f32 {
        match self {
            EnemyKind::Armored => 0.7,
            _ => 1.0,
        }
    }

    /// Regeneration cadence: `(interval seconds, heal amount)`.
    pub fn regen(&self) -> Option<(f32, i32)> {
        match self {
            EnemyKind::Regen => Some((1.5, 5)),
            EnemyKind::Boss => Some((2.0, 10)),
            _ => None,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            EnemyKind::Normal => "#ff6b6b",
            EnemyKind::Fast => "#ffb86b",
            EnemyKind::Armored => "#9aa7b8",
            EnemyKind::Regen => "#7ee787",
            EnemyKind::Tank => "#b86bff",
            EnemyKind::Swarm => "#ffe66b",
            EnemyKind::Boss => "#ff2e63",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EnemyKind::Normal => "normal",
            EnemyKind::Fast => "fast",
            EnemyKind::Armored => "armored",
            EnemyKind::Regen => "regen",
            EnemyKind::Tank => "tank",
            EnemyKind::Swarm => "swarm",
            EnemyKind::Boss => "boss",
        }
    }
}

/// Resolved per-enemy parameters, frozen at spawn time.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemyStats {
    pub max_hp: i32,
    /// Path fractions per second.
    pub base_speed: f32,
    pub reward: u32,
    /// Visual radius, render-relevant only.
    pub size: f32,
}

/// Hit points. `0 <= current <= max` at all times.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Remaining slow duration in seconds. While active, movement is halved.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SlowEffect {
    pub remaining: f32,
}

impl SlowEffect {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Extend the slow to at least `duration`. A fresh hit never shortens
    /// an existing longer slow.
    pub fn refresh(&mut self, duration: f32) {
        self.remaining = self.remaining.max(duration);
    }

    pub fn decay(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }
}

/// Periodic self-heal for regenerating kinds.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Regeneration {
    pub timer: f32,
    pub interval: f32,
    pub amount: i32,
}

/// Bundle for spawning a complete enemy entity.
#[derive(Bundle)]
pub struct EnemyBundle {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub stats: EnemyStats,
    pub progress: PathProgress,
    pub position: Position,
    pub health: Health,
    pub slow: SlowEffect,
}

// ============================================================================
// TOWER COMPONENTS
// ============================================================================

/// Unique identifier for a tower; the handle external commands use.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TowerId(pub u32);

/// Tower variant.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    Basic,
    Rapid,
    Sniper,
    Frost,
    Buff,
}

impl TowerKind {
    pub fn cost(&self) -> u32 {
        match self {
            TowerKind::Basic => 50,
            TowerKind::Rapid => 80,
            TowerKind::Sniper => 120,
            TowerKind::Frost => 90,
            TowerKind::Buff => 100,
        }
    }

    /// Base upgrade cost; the price of the next level on a track is
    /// `upgrade_cost() * (track_level + 1)`.
    pub fn upgrade_cost(&self) -> u32 {
        match self {
            TowerKind::Basic => 60,
            TowerKind::Rapid => 80,
            TowerKind::Sniper => 130,
            TowerKind::Frost => 90,
            TowerKind::Buff => 110,
        }
    }

    /// Combat parameters at level 0.
    pub fn base_stats(&self) -> TowerStats {
        match self {
            TowerKind::Basic => TowerStats {
                damage: 22,
                range: 110.0,
                fire_interval: 0.75,
                projectile_speed: 615.0,
                slow_duration: None,
            },
            TowerKind::Rapid => TowerStats {
                damage: 8,
                range: 90.0,
                fire_interval: 0.23,
                projectile_speed: 520.0,
                slow_duration: None,
            },
            TowerKind::Sniper => TowerStats {
                damage: 48,
                range: 190.0,
                fire_interval: 1.8,
                projectile_speed: 805.0,
                slow_duration: None,
            },
            TowerKind::Frost => TowerStats {
                damage: 12,
                range: 120.0,
                fire_interval: 1.33,
                projectile_speed: 720.0,
                slow_duration: Some(1.5),
            },
            // Buff towers never fire; range is the aura radius.
            TowerKind::Buff => TowerStats {
                damage: 0,
                range: 100.0,
                fire_interval: 0.0,
                projectile_speed: 0.0,
                slow_duration: None,
            },
        }
    }

    /// Aura projected onto other towers in range, if this is a buff kind.
    pub fn aura(&self) -> Option<Aura> {
        match self {
            TowerKind::Buff => Some(Aura {
                damage_mult: 1.3,
                rate_mult: 0.8,
            }),
            _ => None,
        }
    }

    /// Support towers enhance neighbours instead of firing.
    pub fn is_support(&self) -> bool {
        matches!(self, TowerKind::Buff)
    }

    pub fn color(&self) -> &'static str {
        match self {
            TowerKind::Basic => "#ffd166",
            TowerKind::Rapid => "#ffd6a6",
            TowerKind::Sniper => "#c9a7ff",
            TowerKind::Frost => "#7ee787",
            TowerKind::Buff => "#7fd4ff",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TowerKind::Basic => "basic",
            TowerKind::Rapid => "rapid",
            TowerKind::Sniper => "sniper",
            TowerKind::Frost => "frost",
            TowerKind::Buff => "buff",
        }
    }
}

/// Live combat parameters of one tower instance; upgrades mutate these.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TowerStats {
    pub damage: i32,
    pub range: f32,
    /// Seconds between shots.
    pub fire_interval: f32,
    /// Pixels per second.
    pub projectile_speed: f32,
    /// Slow applied on hit: the floor duration the target's slow timer is
    /// refreshed to.
    pub slow_duration: Option<f32>,
}

/// Which upgrade track a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeTrack {
    /// Damage and range.
    Power,
    /// Fire rate and the kind-specific secondary stat.
    Utility,
}

/// Once one track reaches this level, the other locks permanently.
pub const TRACK_LOCK_LEVEL: u8 = 3;

/// Per-tower upgrade progress along the two mutually-limiting tracks.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UpgradeState {
    pub power: u8,
    pub utility: u8,
}

impl UpgradeState {
    pub fn level(&self, track: UpgradeTrack) -> u8 {
        match track {
            UpgradeTrack::Power => self.power,
            UpgradeTrack::Utility => self.utility,
        }
    }

    /// A track is locked when the opposite track has committed.
    pub fn is_locked(&self, track: UpgradeTrack) -> bool {
        match track {
            UpgradeTrack::Power => self.utility >= TRACK_LOCK_LEVEL,
            UpgradeTrack::Utility => self.power >= TRACK_LOCK_LEVEL,
        }
    }

    pub fn total_levels(&self) -> u8 {
        self.power + self.utility
    }
}

/// Aura a buff tower projects; strengthened by its own upgrades.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Aura {
    /// Damage multiplier granted to towers in range (> 1).
    pub damage_mult: f32,
    /// Fire-interval multiplier granted to towers in range (< 1).
    pub rate_mult: f32,
}

/// Transient buff multipliers received from nearby buff towers.
/// Reset and recomputed from scratch every tick; never persists once the
/// buff tower is sold or the receiver leaves range.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuffState {
    pub damage_mult: f32,
    pub rate_mult: f32,
}

impl Default for BuffState {
    fn default() -> Self {
        Self {
            damage_mult: 1.0,
            rate_mult: 1.0,
        }
    }
}

impl BuffState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Overlapping auras do not stack: the strongest value per stat wins.
    pub fn apply_strongest(&mut self, aura: &Aura) {
        self.damage_mult = self.damage_mult.max(aura.damage_mult);
        self.rate_mult = self.rate_mult.min(aura.rate_mult);
    }
}

/// Firing cooldown. A tower shoots when this reaches zero and a target is
/// in range.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FireControl {
    pub cooldown: f32,
}

/// Total money sunk into this tower, for refund calculation.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostPaid(pub u32);

/// Bundle for spawning a complete tower entity.
/// Buff kinds additionally get an [`Aura`] component.
#[derive(Bundle)]
pub struct TowerBundle {
    pub id: TowerId,
    pub kind: TowerKind,
    pub position: Position,
    pub stats: TowerStats,
    pub upgrades: UpgradeState,
    pub buff: BuffState,
    pub fire: FireControl,
    pub cost_paid: CostPaid,
}

// ============================================================================
// PROJECTILE COMPONENTS
// ============================================================================

/// A shot in flight, homing on a specific enemy.
///
/// `target` is a weak handle: if the enemy is removed before impact the
/// projectile is discarded without effect.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile {
    pub target: Entity,
    /// Pixels per second.
    pub speed: f32,
    pub damage: i32,
    /// Slow floor applied on impact, if any.
    pub slow_duration: Option<f32>,
    /// Remaining flight time; expiry discards the shot even with a live
    /// target, bounding pursuit of enemies that outrun it.
    pub ttl: f32,
}

/// Recent positions of a projectile, cosmetic only.
#[derive(Component, Debug, Clone)]
pub struct Trail {
    points: VecDeque<(f32, f32)>,
    cap: usize,
}

impl Trail {
    pub fn new(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, x: f32, y: f32) {
        if self.points.len() == self.cap {
            self.points.pop_front();
        }
        self.points.push_back((x, y));
    }

    pub fn points(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Bundle for spawning a projectile.
#[derive(Bundle)]
pub struct ProjectileBundle {
    pub projectile: Projectile,
    pub position: Position,
    pub trail: Trail,
}

// ============================================================================
// PARTICLE COMPONENTS
// ============================================================================

/// Purely cosmetic transient. No gameplay effect.
#[derive(Component, Debug, Clone, Copy)]
pub struct Particle {
    pub vx: f32,
    pub vy: f32,
    /// Remaining life in seconds.
    pub life: f32,
    pub color: &'static str,
}

/// Bundle for spawning a particle.
#[derive(Bundle)]
pub struct ParticleBundle {
    pub particle: Particle,
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamps_at_bounds() {
        let mut health = Health::new(30);
        health.damage(50);
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
        health.heal(100);
        assert_eq!(health.current, 30);
    }

    #[test]
    fn test_slow_refresh_never_shortens() {
        let mut slow = SlowEffect { remaining: 2.0 };
        slow.refresh(1.5);
        assert_eq!(slow.remaining, 2.0);
        slow.refresh(3.0);
        assert_eq!(slow.remaining, 3.0);
        slow.decay(10.0);
        assert_eq!(slow.remaining, 0.0);
    }

    #[test]
    fn test_enemy_stats_scale_with_wave() {
        let early = EnemyKind::Normal.stats_for_wave(1);
        let late = EnemyKind::Normal.stats_for_wave(10);
        assert!(late.max_hp > early.max_hp);
        assert!(late.base_speed > early.base_speed);
        // Speed growth is capped.
        let very_late = EnemyKind::Normal.stats_for_wave(100);
        assert!((very_late.base_speed - (0.035 + 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_boss_outclasses_normal() {
        let normal = EnemyKind::Normal.stats_for_wave(5);
        let boss = EnemyKind::Boss.stats_for_wave(5);
        assert!(boss.max_hp > 4 * normal.max_hp);
        assert!(boss.reward > 10 * normal.reward);
        assert!(boss.base_speed < normal.base_speed);
    }

    #[test]
    fn test_track_lock_is_mutual() {
        let mut upgrades = UpgradeState::default();
        assert!(!upgrades.is_locked(UpgradeTrack::Utility));
        upgrades.power = TRACK_LOCK_LEVEL;
        assert!(upgrades.is_locked(UpgradeTrack::Utility));
        assert!(!upgrades.is_locked(UpgradeTrack::Power));
    }

    #[test]
    fn test_buff_state_takes_strongest_aura() {
        let mut buff = BuffState::default();
        buff.apply_strongest(&Aura {
            damage_mult: 1.3,
            rate_mult: 0.8,
        });
        buff.apply_strongest(&Aura {
            damage_mult: 1.2,
            rate_mult: 0.7,
        });
        assert_eq!(buff.damage_mult, 1.3);
        assert_eq!(buff.rate_mult, 0.7);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut trail = Trail::new(3);
        for i in 0..10 {
            trail.push(i as f32, 0.0);
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<f32> = trail.points().map(|(x, _)| x).collect();
        assert_eq!(xs, vec![7.0, 8.0, 9.0]);
    }
}
