//! Frame composition
//!
//! `render` reads the game state and emits triangles and text labels to a
//! `Surface`. It never mutates state, so a host may call it as often as it
//! likes (or not at all).

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::Viewport;
use crate::consts::*;
use crate::sim::{GamePhase, GameState, Obstacle, ParticleKind, ZoneCatalog};

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// A line of text for the host to draw
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub pos: Vec2,
    /// Font size in pixels
    pub size: f32,
    pub color: [f32; 4],
    pub align: TextAlign,
}

/// Drawing target
pub trait Surface {
    /// Triangle list, three vertices per triangle
    fn fill(&mut self, vertices: &[Vertex]);
    fn text(&mut self, label: TextLabel);
}

/// Collected draw output for one frame
#[derive(Debug, Default, Clone)]
pub struct Frame {
    pub vertices: Vec<Vertex>,
    pub labels: Vec<TextLabel>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.labels.clear();
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

impl Surface for Frame {
    fn fill(&mut self, vertices: &[Vertex]) {
        self.vertices.extend_from_slice(vertices);
    }

    fn text(&mut self, label: TextLabel) {
        self.labels.push(label);
    }
}

/// Spacing of the scrolling ground dashes
const GROUND_DASH_SPACING: f32 = 80.0;
const GROUND_DASH_WIDTH: f32 = 30.0;
const ACCENT_HEIGHT: f32 = 4.0;
const PROGRESS_HEIGHT: f32 = 6.0;
const CIRCLE_SEGMENTS: u32 = 24;
const PARTICLE_FONT: f32 = 22.0;

/// Draw one frame of `state`
pub fn render(
    surface: &mut dyn Surface,
    state: &GameState,
    catalog: &ZoneCatalog,
    viewport: &Viewport,
) {
    let zone = catalog.get(state.current_zone_index);
    let theme = &zone.theme;
    let ground_y = viewport.ground_y();
    let size = Vec2::new(viewport.width, viewport.height);

    // Sky
    surface.fill(&shapes::gradient_rect(
        Vec2::ZERO,
        Vec2::new(size.x, ground_y),
        colors::rgba(theme.sky_top, 1.0),
        colors::rgba(theme.sky_bottom, 1.0),
    ));

    // Ground, accent line, scrolling dashes
    surface.fill(&shapes::rect(
        Vec2::new(0.0, ground_y),
        Vec2::new(size.x, size.y - ground_y),
        colors::rgba(theme.ground, 1.0),
    ));
    let accent = colors::rgba(theme.ground_accent, 1.0);
    surface.fill(&shapes::rect(
        Vec2::new(0.0, ground_y),
        Vec2::new(size.x, ACCENT_HEIGHT),
        accent,
    ));
    let mut x = -(state.scroll_x % GROUND_DASH_SPACING);
    while x < size.x {
        surface.fill(&shapes::rect(
            Vec2::new(x, ground_y + 18.0),
            Vec2::new(GROUND_DASH_WIDTH, ACCENT_HEIGHT),
            colors::with_alpha(accent, 0.5),
        ));
        x += GROUND_DASH_SPACING;
    }

    for obstacle in state.obstacles.iter().filter(|o| !o.collected) {
        draw_obstacle(surface, obstacle, state.time);
    }

    draw_character(surface, state);

    for particle in &state.particles {
        let color = match particle.kind {
            ParticleKind::Score => colors::SCORE_TEXT,
            ParticleKind::LifeGain => colors::LIFE_TEXT,
        };
        surface.text(TextLabel {
            text: particle.text.clone(),
            pos: particle.pos,
            size: PARTICLE_FONT,
            color: colors::with_alpha(color, particle.life.clamp(0.0, 1.0)),
            align: TextAlign::Center,
        });
    }

    // Zone progress
    if state.phase.has_run() {
        surface.fill(&shapes::rect(
            Vec2::ZERO,
            Vec2::new(size.x * state.zone_progress, PROGRESS_HEIGHT),
            colors::PROGRESS,
        ));
    }

    match state.phase {
        GamePhase::ZoneTransition => draw_transition(surface, state, catalog, size),
        GamePhase::Paused => draw_banner(surface, size, 0.5, "Paused"),
        GamePhase::GameOver => draw_banner(surface, size, 0.6, "Game Over"),
        GamePhase::Finale => draw_banner(surface, size, 0.6, "Finale"),
        _ => {}
    }
}

/// Stable palette slot for an obstacle kind
fn kind_color(kind: &str) -> [f32; 4] {
    // FNV-1a
    let hash = kind
        .bytes()
        .fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    colors::HAZARD_PALETTE[hash as usize % colors::HAZARD_PALETTE.len()]
}

fn draw_obstacle(surface: &mut dyn Surface, obstacle: &Obstacle, time: f32) {
    let center = obstacle.pos + obstacle.size / 2.0;

    if obstacle.is_collectible {
        let pulse = 1.0 + 0.1 * (time * 3.0).sin();
        let radius = obstacle.size.max_element() * 0.6 * pulse;
        surface.fill(&shapes::circle(
            center,
            radius,
            colors::COLLECTIBLE_HALO,
            CIRCLE_SEGMENTS,
        ));
        let body = if obstacle.gives_life {
            colors::LIFE_ITEM
        } else {
            colors::COLLECTIBLE
        };
        surface.fill(&shapes::circle(
            center,
            obstacle.size.min_element() / 2.0,
            body,
            CIRCLE_SEGMENTS,
        ));
        return;
    }

    surface.fill(&shapes::rect(obstacle.pos, obstacle.size, kind_color(&obstacle.kind)));
}

fn draw_character(surface: &mut dyn Surface, state: &GameState) {
    let c = &state.character;
    // Squash on landing, bottom-anchored
    let size = Vec2::new(
        CHARACTER_SIZE * (1.0 + 0.2 * c.squish),
        CHARACTER_SIZE * (1.0 - 0.2 * c.squish),
    );
    let bottom = c.pos.y + CHARACTER_SIZE;
    let center = Vec2::new(c.pos.x + CHARACTER_SIZE / 2.0, bottom - size.y / 2.0);
    let color = colors::lerp(colors::CHARACTER, colors::CHARACTER_HIT, c.hit_flash);

    surface.fill(&shapes::rotated_rect(center, size, c.rotation, color));

    // Eye, bobbing with the run cycle while grounded
    let bob = if c.is_on_ground {
        (c.anim_frame % 2) as f32 * 2.0
    } else {
        0.0
    };
    let offset = Vec2::new(size.x * 0.2, -size.y * 0.2 + bob);
    let eye = center + Vec2::from_angle(c.rotation).rotate(offset);
    surface.fill(&shapes::circle(eye, 6.0, colors::CHARACTER_EYE, 12));
}

fn draw_transition(
    surface: &mut dyn Surface,
    state: &GameState,
    catalog: &ZoneCatalog,
    size: Vec2,
) {
    surface.fill(&shapes::rect(
        Vec2::ZERO,
        size,
        colors::with_alpha(colors::OVERLAY, state.transition_alpha * 0.8),
    ));

    if (TRANSITION_FADE_IN..TRANSITION_HOLD_END).contains(&state.transition_timer) {
        let next_index = (state.current_zone_index + 1).min(catalog.len() - 1);
        let next = catalog.get(next_index);
        surface.text(TextLabel {
            text: format!("Zone {}", next_index + 1),
            pos: Vec2::new(size.x / 2.0, size.y / 2.0 - 30.0),
            size: 28.0,
            color: colors::TITLE_TEXT,
            align: TextAlign::Center,
        });
        surface.text(TextLabel {
            text: next.name.clone(),
            pos: Vec2::new(size.x / 2.0, size.y / 2.0 + 20.0),
            size: 44.0,
            color: colors::TITLE_TEXT,
            align: TextAlign::Center,
        });
    }
}

fn draw_banner(surface: &mut dyn Surface, size: Vec2, dim: f32, title: &str) {
    surface.fill(&shapes::rect(
        Vec2::ZERO,
        size,
        colors::with_alpha(colors::OVERLAY, dim),
    ));
    surface.text(TextLabel {
        text: title.to_string(),
        pos: size / 2.0,
        size: 48.0,
        color: colors::TITLE_TEXT,
        align: TextAlign::Center,
    });
}
