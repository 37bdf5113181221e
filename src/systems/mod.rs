//! ECS systems for the Rampart simulation.
//!
//! One tick runs every subsystem synchronously, in a fixed chained order:
//!
//! 1. `wave_spawn_system` - start requests, endless timer, enemy release
//! 2. `enemy_update_system` - movement, slow decay, regen, leak/death
//! 3. `spatial_grid_update_system` - rebuild the enemy index
//! 4. `buff_aura_system` - recompute transient tower buffs
//! 5. `tower_fire_system` - cooldowns and projectile spawns
//! 6. `projectile_system` - homing, impact, status, TTL
//! 7. `particle_update_system` - cosmetic drift and expiry
//! 8. `wave_progress_system` - wave completion and endless restart
//!
//! Command buffers flush between systems, so removals requested by one pass
//! are visible to the next and never disturb an in-progress iteration. The
//! run-status checks (game over, win) happen in the driving loop after the
//! schedule, not in any system.

pub mod combat;
pub mod movement;
pub mod particles;
pub mod serialization;
pub mod targeting;

pub use combat::*;
pub use movement::*;
pub use particles::*;
pub use serialization::*;
pub use targeting::*;
