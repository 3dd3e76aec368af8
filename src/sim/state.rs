//! Game state and core simulation types
//!
//! `GameState` is the single mutable aggregate; only the engine mutates it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::Character;
use crate::Viewport;
use crate::consts::*;

/// Top-level phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Zone tracks are being decoded
    Loading,
    /// Title screen, waiting for start
    Start,
    /// Active gameplay
    Playing,
    /// Game is paused (audio stopped)
    Paused,
    /// Out of lives
    GameOver,
    /// Overlay between two zones
    ZoneTransition,
    /// Last zone cleared
    Finale,
}

impl GamePhase {
    /// Phases in which score and lives carry meaning
    pub fn has_run(&self) -> bool {
        !matches!(self, GamePhase::Loading | GamePhase::Start)
    }
}

/// An obstacle or collectible scrolling toward the character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Template kind, used for drawing
    pub kind: String,
    pub is_collectible: bool,
    pub gives_life: bool,
    pub points: u64,
    /// Collectibles only: already picked up
    pub collected: bool,
    /// Game time at spawn
    pub spawn_time: f32,
}

impl Obstacle {
    /// A plain hazard
    pub fn hazard(kind: &str, pos: Vec2, size: Vec2, spawn_time: f32) -> Self {
        Self {
            pos,
            size,
            kind: kind.to_string(),
            is_collectible: false,
            gives_life: false,
            points: 0,
            collected: false,
            spawn_time,
        }
    }

    /// A collectible worth `points`
    pub fn collectible(kind: &str, pos: Vec2, size: Vec2, points: u64, gives_life: bool) -> Self {
        Self {
            is_collectible: true,
            gives_life,
            points,
            ..Self::hazard(kind, pos, size, 0.0)
        }
    }

    /// Right edge has left the viewport by more than the off-screen margin
    #[inline]
    pub fn is_offscreen(&self) -> bool {
        self.pos.x + self.size.x < -OFFSCREEN_MARGIN
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }
}

/// Floating text kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// "+N" score popup
    Score,
    /// Extra life popup
    LifeGain,
}

/// Floating feedback text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    /// Vertical velocity (pixels per 60 fps frame)
    pub vy: f32,
    pub text: String,
    /// Remaining life; alpha follows it. Removed at <= 0.
    pub life: f32,
}

impl Particle {
    pub fn score(obstacle: &Obstacle) -> Self {
        Self {
            kind: ParticleKind::Score,
            pos: Vec2::new(obstacle.center_x(), obstacle.pos.y),
            vy: -2.0,
            text: format!("+{}", obstacle.points),
            life: 1.0,
        }
    }

    pub fn life_gain(obstacle: &Obstacle) -> Self {
        Self {
            kind: ParticleKind::LifeGain,
            pos: Vec2::new(obstacle.center_x(), obstacle.pos.y - 15.0),
            vy: -2.5,
            text: "+1 life".to_string(),
            life: 1.2,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub current_zone_index: usize,
    /// Seconds since the current zone started
    pub zone_timer: f32,
    /// `zone_timer / ZONE_MAX_DURATION`, clamped to [0, 1]
    pub zone_progress: f32,
    /// Cumulative horizontal world offset
    pub scroll_x: f32,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    pub last_obstacle_spawn_time: f32,
    pub character: Character,
    /// Game time since the run started (seconds)
    pub time: f32,
    /// Only meaningful during ZoneTransition
    pub transition_timer: f32,
    pub transition_alpha: f32,
    /// Visual feedback, not gameplay-affecting
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// End-of-zone fade already requested for this zone entry
    pub fade_fired: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Fresh state on the title screen
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Start,
            score: 0,
            lives: MAX_LIVES,
            current_zone_index: 0,
            zone_timer: 0.0,
            zone_progress: 0.0,
            scroll_x: 0.0,
            obstacles: Vec::new(),
            last_obstacle_spawn_time: 0.0,
            character: Character::default(),
            time: 0.0,
            transition_timer: 0.0,
            transition_alpha: 0.0,
            particles: Vec::new(),
            fade_fired: false,
        }
    }

    /// Reset everything scoped to a single zone entry
    pub fn enter_zone(&mut self, zone_index: usize) {
        self.current_zone_index = zone_index;
        self.zone_timer = 0.0;
        self.zone_progress = 0.0;
        self.obstacles.clear();
        self.particles.clear();
        self.last_obstacle_spawn_time = 0.0;
        self.transition_timer = 0.0;
        self.transition_alpha = 0.0;
        self.fade_fired = false;
    }

    /// Recompute the derived zone progress
    #[inline]
    pub fn refresh_zone_progress(&mut self) {
        self.zone_progress = (self.zone_timer / ZONE_MAX_DURATION).clamp(0.0, 1.0);
    }

    /// Place a brand-new character on the ground
    pub fn reset_character(&mut self, viewport: &Viewport) {
        self.character = Character::new(viewport);
    }
}
