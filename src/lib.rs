//! Zone Runner - a side-scrolling arcade runner across ten musical zones
//!
//! Core modules:
//! - `sim`: Simulation (physics, spawning, collisions, zone progression)
//! - `audio`: Zone soundtrack playback with fades and crossfades
//! - `engine`: Phase machine, public actions, and effect interpreter
//! - `renderer`: Pure frame composition for a host drawing backend
//! - `persistence`: Save slot and storage capabilities
//! - `platform`: Browser/native platform abstraction

pub mod audio;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use engine::{Engine, HudSnapshot};
pub use settings::Settings;

use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Gravity per 60 fps frame (pixels/frame²)
    pub const GRAVITY: f32 = 0.38;
    /// Vertical velocity applied on jump (negative is up)
    pub const JUMP_FORCE: f32 = -16.0;
    /// Ground line as a fraction of viewport height
    pub const GROUND_Y_RATIO: f32 = 0.78;
    /// Character sprite size (square)
    pub const CHARACTER_SIZE: f32 = 60.0;
    /// Character x position as a fraction of viewport width
    pub const CHARACTER_X_RATIO: f32 = 0.18;
    /// Hitbox shrink applied to each side of the character
    pub const CHARACTER_HITBOX_PADDING: f32 = 18.0;
    /// Hitbox shrink applied to each side of an obstacle
    pub const OBSTACLE_HITBOX_PADDING: f32 = 8.0;

    /// Lives at the start of a run (also the cap)
    pub const MAX_LIVES: u8 = 3;

    /// Time budget of every zone (seconds)
    pub const ZONE_MAX_DURATION: f32 = 60.0;
    /// Zone time at which the soundtrack starts fading out
    pub const ZONE_FADE_START: f32 = 57.0;
    /// Length of the end-of-zone fade (seconds)
    pub const ZONE_FADE_DURATION: f32 = 3.0;

    /// Zone transition overlay: fade-in ends, hold ends, transition ends
    pub const TRANSITION_FADE_IN: f32 = 0.5;
    pub const TRANSITION_HOLD_END: f32 = 1.0;
    pub const TRANSITION_DURATION: f32 = 1.5;

    /// Scroll speed = width * SCROLL_WIDTH_FACTOR / ZONE_MAX_DURATION * speed * SCROLL_BOOST
    pub const SCROLL_WIDTH_FACTOR: f32 = 1.5;
    pub const SCROLL_BOOST: f32 = 1.6;

    /// Obstacles spawn this far past the right edge
    pub const SPAWN_MARGIN: f32 = 20.0;
    /// Obstacles are dropped once their right edge is this far past the left edge
    pub const OFFSCREEN_MARGIN: f32 = 50.0;
    /// Obstacle size ranges (min, spread)
    pub const OBSTACLE_MIN_WIDTH: f32 = 35.0;
    pub const OBSTACLE_WIDTH_SPREAD: f32 = 15.0;
    pub const OBSTACLE_MIN_HEIGHT: f32 = 40.0;
    pub const OBSTACLE_HEIGHT_SPREAD: f32 = 20.0;
    /// Floating band: lift above ground plus random extra lift
    pub const FLOAT_BASE_LIFT: f32 = 20.0;
    pub const FLOAT_LIFT_SPREAD: f32 = 40.0;
    /// Safe-zone scatter band as a fraction of viewport height
    pub const SAFE_SCATTER_RATIO: f32 = 0.3;

    /// Score for letting a hazard scroll past
    pub const PASS_BONUS: u64 = 10;
    /// Value of a collectible whose template declares none
    pub const DEFAULT_COLLECT_POINTS: u64 = 10;

    /// Saves older than this are not resumable (24 hours, in ms)
    pub const SAVE_TTL_MS: u64 = 24 * 60 * 60 * 1000;
    /// Upper bound on waiting for the audio context to resume (ms)
    pub const UNLOCK_TIMEOUT_MS: u64 = 1000;
    /// Host frame delta clamp (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;
}

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Y coordinate of the ground line
    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.height * consts::GROUND_Y_RATIO
    }

    /// Horizontal scroll speed (pixels/second) for a zone speed multiplier
    #[inline]
    pub fn scroll_speed(&self, zone_speed: f32) -> f32 {
        use consts::*;
        self.width * SCROLL_WIDTH_FACTOR / ZONE_MAX_DURATION * zone_speed * SCROLL_BOOST
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_line() {
        let vp = Viewport::new(1000.0, 500.0);
        assert!((vp.ground_y() - 390.0).abs() < 1e-4);
    }

    #[test]
    fn test_scroll_speed_scales_with_width_and_zone() {
        let vp = Viewport::new(1000.0, 500.0);
        // 1000 * 1.5 / 60 * 1.0 * 1.6 = 40
        assert!((vp.scroll_speed(1.0) - 40.0).abs() < 1e-4);
        assert!((vp.scroll_speed(2.0) - 80.0).abs() < 1e-4);
    }
}
