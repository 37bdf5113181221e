//! Rampart - Tower Defense Simulation Core
//!
//! A deterministic, fixed-timestep simulation of a path-based tower defense
//! game. Uses `bevy_ecs` for the entity-component-system architecture.
//!
//! The crate is headless: a host (canvas renderer, terminal, test harness)
//! drives it through [`SimWorld::step`] and reads [`Snapshot`]s. Nothing in
//! here draws, touches the DOM, or owns a frame loop.

pub mod api;
pub mod components;
pub mod config;
pub mod economy;
pub mod path;
pub mod spatial;
pub mod systems;
pub mod waves;
pub mod world;

pub use api::{CommandError, RunStatus, SimWorld};
pub use components::*;
pub use config::{GameMode, SimConfig};
pub use economy::Ledger;
pub use path::{Path, PathError};
pub use spatial::{EnemyEntry, SpatialGrid};
pub use systems::*;
pub use waves::{WaveDirector, WavePhase};
pub use world::Snapshot;
