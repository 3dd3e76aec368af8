//! Character physics and hitbox tests
//!
//! Integration is normalized to 60 fps (`dt * 60`) so a jump feels the same
//! regardless of the host's refresh rate. Collision uses padded axis-aligned
//! boxes: both the character and the obstacle are shrunk before the overlap
//! test, so sprites have to overlap noticeably before a hit registers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Obstacle;
use crate::consts::*;

/// Seconds between run-animation frames
const ANIM_FRAME_TIME: f32 = 0.1;
/// Number of run-animation frames
const ANIM_FRAMES: u8 = 4;
/// Rotation per unit of vertical velocity while airborne
const ROTATION_PER_VY: f32 = 0.02;
/// Cosmetic decay rates (per second)
const SQUISH_DECAY: f32 = 8.0;
const HIT_FLASH_DECAY: f32 = 5.0;

/// The player-controlled character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Top-left corner of the sprite
    pub pos: Vec2,
    /// Vertical velocity (pixels per 60 fps frame, negative is up)
    pub vy: f32,
    pub is_on_ground: bool,
    pub is_jumping: bool,
    /// Landing squish (1 on touchdown, decays to 0)
    pub squish: f32,
    /// Hit flash (1 on hazard hit, decays to 0)
    pub hit_flash: f32,
    /// Sprite rotation (radians), follows vertical velocity while airborne
    pub rotation: f32,
    pub anim_frame: u8,
    pub anim_timer: f32,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vy: 0.0,
            is_on_ground: true,
            is_jumping: false,
            squish: 0.0,
            hit_flash: 0.0,
            rotation: 0.0,
            anim_frame: 0,
            anim_timer: 0.0,
        }
    }
}

impl Character {
    /// Fresh character standing on the ground of the given viewport
    pub fn new(viewport: &crate::Viewport) -> Self {
        let mut character = Self::default();
        character.place(viewport);
        character
    }

    /// Anchor horizontally and stand on the ground line
    pub fn place(&mut self, viewport: &crate::Viewport) {
        self.pos.x = viewport.width * CHARACTER_X_RATIO;
        if self.is_on_ground {
            self.pos.y = viewport.ground_y() - CHARACTER_SIZE;
        }
    }

    /// Y coordinate of the sprite's top when standing on `ground_y`
    #[inline]
    pub fn rest_y(ground_y: f32) -> f32 {
        ground_y - CHARACTER_SIZE
    }
}

/// Advance vertical motion and cosmetic timers by `dt` seconds
///
/// Airborne: integrates gravity, tilts with velocity, and lands exactly on
/// `ground_y - CHARACTER_SIZE` with zero velocity and a squish.
pub fn apply_gravity(character: &mut Character, ground_y: f32, dt: f32) {
    let frames = dt * 60.0;

    if !character.is_on_ground {
        character.vy += GRAVITY * frames;
        character.pos.y += character.vy * frames;
        character.rotation = character.vy * ROTATION_PER_VY;

        let rest_y = Character::rest_y(ground_y);
        if character.pos.y >= rest_y {
            character.pos.y = rest_y;
            character.vy = 0.0;
            character.is_on_ground = true;
            character.is_jumping = false;
            character.rotation = 0.0;
            character.squish = 1.0;
        }
    }

    if character.squish > 0.0 {
        character.squish = (character.squish - dt * SQUISH_DECAY).max(0.0);
    }
    if character.hit_flash > 0.0 {
        character.hit_flash = (character.hit_flash - dt * HIT_FLASH_DECAY).max(0.0);
    }

    character.anim_timer += dt;
    if character.anim_timer > ANIM_FRAME_TIME {
        character.anim_timer = 0.0;
        character.anim_frame = (character.anim_frame + 1) % ANIM_FRAMES;
    }
}

/// Start a jump. Only accepted from the ground: no double jump, no buffering.
pub fn jump(character: &mut Character) -> bool {
    if !character.is_on_ground {
        return false;
    }
    character.vy = JUMP_FORCE;
    character.is_on_ground = false;
    character.is_jumping = true;
    true
}

/// Axis-aligned box given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub const fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Shrink inward by `padding` on every side
    #[inline]
    pub fn shrink(&self, padding: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(padding),
            size: self.size - Vec2::splat(padding * 2.0),
        }
    }

    /// Strict overlap: boxes that only share an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x
            && a_max.x > other.min.x
            && self.min.y < b_max.y
            && a_max.y > other.min.y
    }
}

/// Character hitbox at `character_pos` (top-left of the sprite)
#[inline]
pub fn character_hitbox(character_pos: Vec2) -> Aabb {
    Aabb::new(character_pos, Vec2::splat(CHARACTER_SIZE)).shrink(CHARACTER_HITBOX_PADDING)
}

/// Obstacle hitbox
#[inline]
pub fn obstacle_hitbox(obstacle: &Obstacle) -> Aabb {
    Aabb::new(obstacle.pos, obstacle.size).shrink(OBSTACLE_HITBOX_PADDING)
}

/// Does the character at `character_pos` touch `obstacle`?
pub fn check_collision(character_pos: Vec2, obstacle: &Obstacle) -> bool {
    character_hitbox(character_pos).overlaps(&obstacle_hitbox(obstacle))
}
