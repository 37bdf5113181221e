//! Wave direction - spawn scheduling, composition, and the wave state
//! machine.
//!
//! Phases run `Idle -> Spawning -> Draining -> Idle` (or `Complete` after a
//! designated final wave). The wave counter increments exactly once per
//! `Idle -> Spawning` transition, before the first enemy of that wave
//! spawns, so HUD reads and composition lookups agree.
//!
//! Compositions are either authored (an ordered list of kinds per wave,
//! from the level editor) or generated procedurally from the wave number
//! with a seeded PCG stream, so identical seeds replay identical waves.

use crate::components::*;
use crate::config::{GameMode, SimConfig};
use crate::economy::Ledger;
use crate::path::Path;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Where the director is in the wave cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Waiting for a start trigger (external request, or the endless timer).
    Idle,
    /// Consuming the current composition at the spawn interval.
    Spawning,
    /// Spawning finished; live enemies remain.
    Draining,
    /// The designated final wave has been cleared.
    Complete,
}

impl WavePhase {
    pub fn label(&self) -> &'static str {
        match self {
            WavePhase::Idle => "idle",
            WavePhase::Spawning => "spawning",
            WavePhase::Draining => "draining",
            WavePhase::Complete => "complete",
        }
    }
}

/// The wave state machine, owned by the world as a resource.
#[derive(Resource, Debug)]
pub struct WaveDirector {
    phase: WavePhase,
    pending: VecDeque<EnemyKind>,
    spawn_timer: f32,
    spawn_interval: f32,
    start_requested: bool,
    /// Endless mode: at most one outstanding auto-start timer.
    next_wave_timer: Option<f32>,
    endless_delay: f32,
    endless: bool,
    /// Authored compositions, indexed by wave number.
    plan: Vec<Vec<EnemyKind>>,
    final_wave: Option<u32>,
    boss_wave_every: u32,
    rng: Pcg32,
    next_enemy_id: u32,
}

impl WaveDirector {
    pub fn new(config: &SimConfig, plan: Vec<Vec<EnemyKind>>) -> Self {
        let endless = config.mode == GameMode::Endless;
        // An authored plan defines its own final wave; endless runs never
        // complete.
        let final_wave = if endless {
            None
        } else if !plan.is_empty() {
            Some(plan.len() as u32)
        } else {
            config.final_wave
        };
        Self {
            phase: WavePhase::Idle,
            pending: VecDeque::new(),
            spawn_timer: 0.0,
            spawn_interval: config.spawn_interval,
            start_requested: false,
            next_wave_timer: None,
            endless_delay: config.endless_wave_delay,
            endless,
            plan,
            final_wave,
            boss_wave_every: config.boss_wave_every,
            rng: Pcg32::seed_from_u64(config.seed),
            next_enemy_id: 0,
        }
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn final_wave(&self) -> Option<u32> {
        self.final_wave
    }

    /// Latch a start request, honoured at the next tick boundary.
    /// Only meaningful while idle.
    pub fn request_start(&mut self) {
        self.start_requested = true;
    }

    /// The composition for `wave`: the authored entry if one exists, else
    /// procedural.
    fn compose(&mut self, wave: u32) -> Vec<EnemyKind> {
        if let Some(authored) = self.plan.get(wave as usize - 1) {
            return authored.clone();
        }
        let count = 6 + 2 * wave as usize;
        let mut composition = Vec::with_capacity(count + 1);
        for _ in 0..count {
            composition.push(self.roll_kind(wave));
        }
        if self.boss_wave_every > 0 && wave % self.boss_wave_every == 0 {
            composition.push(EnemyKind::Boss);
        }
        composition
    }

    /// Weighted kind draw; harder kinds phase in and grow with the wave
    /// number.
    fn roll_kind(&mut self, wave: u32) -> EnemyKind {
        let w = wave as f32;
        let gate = |from: u32, weight: f32| if wave >= from { weight } else { 0.0 };
        let weights = [
            (EnemyKind::Normal, 1.0),
            (EnemyKind::Fast, 0.15 + 0.03 * w),
            (EnemyKind::Swarm, gate(2, 0.12 + 0.02 * w)),
            (EnemyKind::Armored, gate(3, 0.10 + 0.02 * w)),
            (EnemyKind::Regen, gate(4, 0.08 + 0.02 * w)),
            (EnemyKind::Tank, gate(5, 0.05 + 0.02 * w)),
        ];
        let total: f32 = weights.iter().map(|(_, weight)| weight).sum();
        let mut roll = self.rng.random_range(0.0..total);
        for (kind, weight) in weights {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        EnemyKind::Normal
    }
}

/// System that drives Idle and Spawning: honours start requests, runs the
/// endless auto-start timer, and releases pending enemies on the interval.
pub fn wave_spawn_system(
    dt: Res<DeltaTime>,
    path: Res<Path>,
    mut director: ResMut<WaveDirector>,
    mut ledger: ResMut<Ledger>,
    mut commands: Commands,
) {
    let delta = dt.0;
    let director = &mut *director;
    match director.phase {
        WavePhase::Idle => {
            if let Some(timer) = director.next_wave_timer.as_mut() {
                *timer -= delta;
                if *timer <= 0.0 {
                    director.next_wave_timer = None;
                    director.start_requested = true;
                }
            }
            if director.start_requested {
                director.start_requested = false;
                let wave = ledger.advance_wave();
                let composition = director.compose(wave);
                log::info!("wave {wave} started: {} enemies", composition.len());
                director.pending = composition.into();
                director.spawn_timer = 0.0;
                director.phase = WavePhase::Spawning;
            }
        }
        WavePhase::Spawning => {
            director.spawn_timer -= delta;
            if director.spawn_timer <= 0.0 {
                if let Some(kind) = director.pending.pop_front() {
                    let stats = kind.stats_for_wave(ledger.wave());
                    let (x, y) = path.point_at(0.0);
                    let mut spawned = commands.spawn(EnemyBundle {
                        id: EnemyId(director.next_enemy_id),
                        kind,
                        stats,
                        progress: PathProgress::default(),
                        position: Position::new(x, y),
                        health: Health::new(stats.max_hp),
                        slow: SlowEffect::default(),
                    });
                    if let Some((interval, amount)) = kind.regen() {
                        spawned.insert(Regeneration {
                            timer: interval,
                            interval,
                            amount,
                        });
                    }
                    director.next_enemy_id += 1;
                    director.spawn_timer = director.spawn_interval;
                }
                if director.pending.is_empty() {
                    director.phase = WavePhase::Draining;
                }
            }
        }
        WavePhase::Draining | WavePhase::Complete => {}
    }
}

/// System that closes out a wave once the field is clear, and schedules the
/// endless auto-restart.
pub fn wave_progress_system(
    ledger: Res<Ledger>,
    mut director: ResMut<WaveDirector>,
    enemies: Query<(), With<EnemyStats>>,
) {
    if director.phase != WavePhase::Draining || !enemies.is_empty() {
        return;
    }
    if director
        .final_wave
        .is_some_and(|last| ledger.wave() >= last)
    {
        log::info!("final wave {} cleared", ledger.wave());
        director.phase = WavePhase::Complete;
        return;
    }
    director.phase = WavePhase::Idle;
    if director.endless && director.next_wave_timer.is_none() {
        director.next_wave_timer = Some(director.endless_delay);
    }
}
