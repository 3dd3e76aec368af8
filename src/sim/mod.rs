//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied `dt` only, physics normalized to 60 fps
//! - Seeded RNG only
//! - Obstacles processed in spawn order
//! - No audio, storage, or rendering dependencies

pub mod physics;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod zones;

pub use physics::{Aabb, Character, apply_gravity, check_collision, jump};
pub use spawn::spawn_obstacle;
pub use state::{GamePhase, GameState, Obstacle, Particle, ParticleKind};
pub use tick::{
    Effect, Haptic, advance_to_next_zone, complete_zone, restart_from_zone, restart_game, update,
    update_transition,
};
pub use zones::{HeightClass, ObstacleTemplate, ZoneCatalog, ZoneDescriptor, ZoneId, ZoneTheme};
