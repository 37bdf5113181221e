//! Public API for the simulation.
//!
//! This module provides the main interface for a host renderer (or any
//! other client) to drive the simulation.
//!
//! ## Fixed Timestep
//!
//! The simulation uses a fixed timestep internally (default 30 Hz). When
//! `step(dt)` is called, time accumulates and fixed updates run as needed,
//! so behavior is deterministic regardless of frame rate. A single call's
//! contribution is clamped to `SimConfig::max_frame_time`, so a long host
//! pause plays out as a brief slow-down instead of a catch-up burst.
//!
//! ## Commands
//!
//! Placement, upgrades, sales, and wave starts arrive through `&mut self`
//! methods, which cannot interleave with a running tick: all shared state
//! is mutated either by the tick driver or between ticks, never both at
//! once. Rejections (insufficient funds, blocked placement, locked upgrade
//! track) are ordinary [`CommandError`] values, never fatal. Commands
//! addressed to a tower that no longer exists are no-ops.

use crate::components::*;
use crate::config::SimConfig;
use crate::economy::{InsufficientFunds, Ledger};
use crate::path::{Path, PathError};
use crate::spatial::{spatial_grid_update_system, SpatialGrid};
use crate::systems::combat::{buff_aura_system, projectile_system, tower_fire_system};
use crate::systems::movement::{enemy_update_system, DeltaTime};
use crate::systems::particles::{particle_update_system, spawn_burst_world};
use crate::waves::{wave_progress_system, wave_spawn_system, WaveDirector, WavePhase};
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use thiserror::Error;

/// Power track: damage multiplier per level.
const POWER_DAMAGE_FACTOR: f32 = 1.25;
/// Power track: range multiplier per level.
const POWER_RANGE_FACTOR: f32 = 1.10;
/// Utility track: fire-interval multiplier per level.
const UTILITY_INTERVAL_FACTOR: f32 = 0.85;
/// Fire interval never drops below this.
const MIN_FIRE_INTERVAL: f32 = 0.08;
/// Utility track on a frost tower: slow-duration multiplier per level.
const FROST_UTILITY_SLOW_FACTOR: f32 = 1.15;
/// Power track on a buff tower: added aura damage multiplier per level.
const BUFF_POWER_DAMAGE_BONUS: f32 = 0.10;
/// Utility track on a buff tower: aura rate multiplier per level.
const BUFF_UTILITY_RATE_FACTOR: f32 = 0.95;
/// Aura rate multiplier never drops below this.
const MIN_AURA_RATE_MULT: f32 = 0.5;
/// Fraction of the purchase price returned on sale.
const SELL_REFUND_RATIO: f32 = 0.6;
/// Extra refund per upgrade level across both tracks.
const SELL_LEVEL_BONUS: u32 = 10;
const PLACEMENT_BURST: usize = 8;

/// Where the run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Paused,
    GameOver,
    Won,
}

impl RunStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Paused => "paused",
            RunStatus::GameOver => "game_over",
            RunStatus::Won => "won",
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self, RunStatus::GameOver | RunStatus::Won)
    }
}

/// A command the simulation rejected. Never fatal; no state was mutated.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },
    #[error("too close to the path: {clearance} units of clearance required")]
    BlockedByPath { clearance: f32 },
    #[error("the {0:?} track is locked on this tower")]
    TrackLocked(UpgradeTrack),
}

impl From<InsufficientFunds> for CommandError {
    fn from(err: InsufficientFunds) -> Self {
        Self::InsufficientFunds {
            needed: err.needed,
            available: err.available,
        }
    }
}

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Initializing a run against a path and wave plan
/// - Stepping the simulation forward
/// - Extracting state snapshots
/// - Issuing commands
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    /// Accumulated time for fixed timestep.
    time_accumulator: f32,
    status: RunStatus,
    next_tower_id: u32,
}

impl std::fmt::Debug for SimWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimWorld")
            .field("tick", &self.tick)
            .field("time", &self.time)
            .field("time_accumulator", &self.time_accumulator)
            .field("status", &self.status)
            .field("next_tower_id", &self.next_tower_id)
            .finish_non_exhaustive()
    }
}

impl SimWorld {
    /// Create a simulation against `waypoints` with procedural waves.
    ///
    /// Fails if the path is degenerate; a run must not start on fewer than
    /// two waypoints.
    pub fn new(waypoints: &[(f32, f32)], config: SimConfig) -> Result<Self, PathError> {
        Self::with_wave_plan(waypoints, config, Vec::new())
    }

    /// Create a simulation with an authored wave plan (ordered enemy-kind
    /// lists, one per wave). An empty plan means procedural generation.
    pub fn with_wave_plan(
        waypoints: &[(f32, f32)],
        config: SimConfig,
        plan: Vec<Vec<EnemyKind>>,
    ) -> Result<Self, PathError> {
        let path = Path::new(waypoints.to_vec())?;

        let mut world = World::new();
        world.insert_resource(DeltaTime(config.fixed_timestep));
        world.insert_resource(SpatialGrid::default());
        world.insert_resource(Ledger::new(config.starting_money, config.starting_lives));
        world.insert_resource(WaveDirector::new(&config, plan));
        world.insert_resource(path);
        world.insert_resource(config);

        // One tick advances every subsystem synchronously, in this order.
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                wave_spawn_system,
                enemy_update_system,
                spatial_grid_update_system,
                buff_aura_system,
                tower_fire_system,
                projectile_system,
                particle_update_system,
                wave_progress_system,
            )
                .chain(),
        );

        Ok(Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            time_accumulator: 0.0,
            status: RunStatus::Running,
            next_tower_id: 0,
        })
    }

    /// Step the simulation forward by `dt` seconds.
    ///
    /// Accumulates time and runs fixed updates as needed. Does nothing
    /// while paused or after the run has ended.
    pub fn step(&mut self, dt: f32) {
        if self.status != RunStatus::Running {
            return;
        }
        let (fixed_dt, max_frame) = {
            let config = self.world.resource::<SimConfig>();
            (config.fixed_timestep, config.max_frame_time)
        };

        self.time_accumulator += dt.min(max_frame);

        while self.time_accumulator >= fixed_dt {
            self.fixed_update(fixed_dt);
            self.time_accumulator -= fixed_dt;
            if self.status != RunStatus::Running {
                break;
            }
        }
    }

    /// Run a single fixed timestep update.
    fn fixed_update(&mut self, dt: f32) {
        if let Some(mut dt_res) = self.world.get_resource_mut::<DeltaTime>() {
            dt_res.0 = dt;
        }

        self.schedule.run(&mut self.world);

        self.tick += 1;
        self.time += dt;

        // Game over beats winning: losing the last life on the tick that
        // clears the final wave is still a loss.
        if self.world.resource::<Ledger>().out_of_lives() {
            self.status = RunStatus::GameOver;
            log::info!("game over at tick {}", self.tick);
        } else if self.world.resource::<WaveDirector>().phase() == WavePhase::Complete {
            self.status = RunStatus::Won;
            log::info!("run won at tick {}", self.tick);
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Place a tower of `kind` at `(x, y)`.
    ///
    /// Rejects placements too close to the path and purchases the player
    /// cannot afford; on success returns the new tower's id.
    pub fn place_tower(&mut self, x: f32, y: f32, kind: TowerKind) -> Result<u32, CommandError> {
        let clearance = self.world.resource::<SimConfig>().path_clearance;
        if self.world.resource::<Path>().distance_to(x, y) < clearance {
            log::debug!("placement at ({x:.0}, {y:.0}) rejected: too close to the path");
            return Err(CommandError::BlockedByPath { clearance });
        }

        let cost = kind.cost();
        self.world.resource_mut::<Ledger>().spend(cost)?;

        let id = self.next_tower_id;
        self.next_tower_id += 1;
        let entity = self
            .world
            .spawn(TowerBundle {
                id: TowerId(id),
                kind,
                position: Position::new(x, y),
                stats: kind.base_stats(),
                upgrades: UpgradeState::default(),
                buff: BuffState::default(),
                fire: FireControl::default(),
                cost_paid: CostPaid(cost),
            })
            .id();
        if let Some(aura) = kind.aura() {
            self.world.entity_mut(entity).insert(aura);
        }
        spawn_burst_world(&mut self.world, x, y, kind.color(), PLACEMENT_BURST);
        log::debug!("placed {} tower {id} at ({x:.0}, {y:.0})", kind.label());
        Ok(id)
    }

    /// Upgrade a tower along one of its two tracks.
    ///
    /// Rejects when the track is locked (the other track committed first)
    /// or the player cannot afford the next level. Upgrading a tower that
    /// no longer exists is a no-op.
    pub fn upgrade_tower(&mut self, id: u32, track: UpgradeTrack) -> Result<(), CommandError> {
        let Some(entity) = self.tower_entity(id) else {
            return Ok(());
        };
        let kind = match self.world.get::<TowerKind>(entity) {
            Some(kind) => *kind,
            None => return Ok(()),
        };
        let upgrades = match self.world.get::<UpgradeState>(entity) {
            Some(upgrades) => *upgrades,
            None => return Ok(()),
        };

        if upgrades.is_locked(track) {
            return Err(CommandError::TrackLocked(track));
        }
        let cost = kind.upgrade_cost() * (u32::from(upgrades.level(track)) + 1);
        self.world.resource_mut::<Ledger>().spend(cost)?;

        if let Some(mut stats) = self.world.get_mut::<TowerStats>(entity) {
            match track {
                UpgradeTrack::Power => {
                    stats.damage = (stats.damage as f32 * POWER_DAMAGE_FACTOR).round() as i32;
                    stats.range *= POWER_RANGE_FACTOR;
                }
                UpgradeTrack::Utility => {
                    if !kind.is_support() {
                        stats.fire_interval =
                            (stats.fire_interval * UTILITY_INTERVAL_FACTOR).max(MIN_FIRE_INTERVAL);
                    }
                    if let Some(slow) = stats.slow_duration.as_mut() {
                        *slow *= FROST_UTILITY_SLOW_FACTOR;
                    }
                }
            }
        }
        // Buff towers channel upgrades into their aura instead.
        if let Some(mut aura) = self.world.get_mut::<Aura>(entity) {
            match track {
                UpgradeTrack::Power => aura.damage_mult += BUFF_POWER_DAMAGE_BONUS,
                UpgradeTrack::Utility => {
                    aura.rate_mult =
                        (aura.rate_mult * BUFF_UTILITY_RATE_FACTOR).max(MIN_AURA_RATE_MULT)
                }
            }
        }
        if let Some(mut upgrades) = self.world.get_mut::<UpgradeState>(entity) {
            match track {
                UpgradeTrack::Power => upgrades.power += 1,
                UpgradeTrack::Utility => upgrades.utility += 1,
            }
        }
        Ok(())
    }

    /// Sell a tower, crediting the refund. Returns the refund, or `None`
    /// if the tower no longer exists (a no-op, not an error).
    pub fn sell_tower(&mut self, id: u32) -> Option<u32> {
        let entity = self.tower_entity(id)?;
        let cost_paid = self.world.get::<CostPaid>(entity)?.0;
        let levels = self
            .world
            .get::<UpgradeState>(entity)
            .map(|u| u32::from(u.total_levels()))
            .unwrap_or(0);
        let (x, y, color) = {
            let pos = self.world.get::<Position>(entity)?;
            let kind = self.world.get::<TowerKind>(entity)?;
            (pos.x, pos.y, kind.color())
        };

        let refund = (cost_paid as f32 * SELL_REFUND_RATIO).floor() as u32 + SELL_LEVEL_BONUS * levels;
        self.world.resource_mut::<Ledger>().credit(refund);
        self.world.despawn(entity);
        spawn_burst_world(&mut self.world, x, y, color, PLACEMENT_BURST);
        log::debug!("tower {id} sold for {refund}");
        Some(refund)
    }

    /// Request the next wave. Honoured at the next tick boundary; returns
    /// `false` when a wave is already in progress or the run is not live.
    pub fn start_next_wave(&mut self) -> bool {
        if self.status != RunStatus::Running {
            return false;
        }
        let mut director = self.world.resource_mut::<WaveDirector>();
        if director.phase() != WavePhase::Idle {
            return false;
        }
        director.request_start();
        true
    }

    /// Pause or resume. A finished run stays finished.
    pub fn set_paused(&mut self, paused: bool) {
        self.status = match (self.status, paused) {
            (RunStatus::Running, true) => RunStatus::Paused,
            (RunStatus::Paused, false) => RunStatus::Running,
            (status, _) => status,
        };
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    pub fn money(&self) -> u32 {
        self.world.resource::<Ledger>().money()
    }

    pub fn lives(&self) -> i32 {
        self.world.resource::<Ledger>().lives()
    }

    pub fn wave(&self) -> u32 {
        self.world.resource::<Ledger>().wave()
    }

    pub fn wave_phase(&self) -> WavePhase {
        self.world.resource::<WaveDirector>().phase()
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.time, self.status)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot()
            .to_json()
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn tower_entity(&mut self, id: u32) -> Option<Entity> {
        let mut query = self.world.query::<(Entity, &TowerId)>();
        query
            .iter(&self.world)
            .find(|(_, tower_id)| tower_id.0 == id)
            .map(|(entity, _)| entity)
    }
}
