//! Simulation configuration.
//!
//! Static tuning loaded once at construction; nothing in here is mutated by
//! the running simulation. Per-kind tower and enemy parameter tables live on
//! the kind enums in [`crate::components`].

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// How the run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Waves start on an external trigger; clearing the final wave (if one
    /// is defined) wins the run.
    Standard,
    /// Cleared waves auto-restart after a short delay, forever.
    Endless,
}

/// Configuration for a simulation run.
#[derive(Resource, Debug, Clone)]
pub struct SimConfig {
    /// Fixed timestep in seconds (e.g., 1/30 = 0.0333 for 30 Hz).
    pub fixed_timestep: f32,
    /// Upper bound on a single `step(dt)` contribution, in seconds. Large
    /// host pauses (tab backgrounding) are clamped to this instead of being
    /// replayed, trading slow-motion for stability.
    pub max_frame_time: f32,
    /// Seconds between enemy spawns within a wave.
    pub spawn_interval: f32,
    /// Endless mode: delay before the next wave auto-starts after a clear.
    pub endless_wave_delay: f32,
    /// Minimum distance between a tower and any path segment.
    pub path_clearance: f32,
    /// Starting money.
    pub starting_money: u32,
    /// Starting lives.
    pub starting_lives: i32,
    pub mode: GameMode,
    /// Standard mode: clearing this wave wins the run. `None` means the run
    /// has no win condition (an authored wave plan supplies its own).
    pub final_wave: Option<u32>,
    /// Procedural waves get a boss appended every Nth wave. 0 disables.
    pub boss_wave_every: u32,
    /// Seed for procedural wave composition. Identical seeds replay
    /// identical waves.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 30.0, // 30 Hz
            max_frame_time: 1.0 / 30.0, // at most one tick of catch-up per call
            spawn_interval: 0.6,
            endless_wave_delay: 0.9,
            path_clearance: 36.0,
            starting_money: 150,
            starting_lives: 10,
            mode: GameMode::Standard,
            final_wave: None,
            boss_wave_every: 5,
            seed: 0,
        }
    }
}
