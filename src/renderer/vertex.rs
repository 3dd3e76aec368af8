//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Floats per vertex when uploaded as a flat buffer
    pub const FLOATS: usize = 6;
}

/// Raw bytes of a vertex slice, ready for a GPU or JS buffer
pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Flat `[x, y, r, g, b, a, ...]` view of a vertex slice
pub fn as_floats(vertices: &[Vertex]) -> &[f32] {
    bytemuck::cast_slice(vertices)
}

/// Colors for game elements
pub mod colors {
    /// `0xRRGGBB` with an explicit alpha
    pub const fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
        [
            ((hex >> 16) & 0xFF) as f32 / 255.0,
            ((hex >> 8) & 0xFF) as f32 / 255.0,
            (hex & 0xFF) as f32 / 255.0,
            alpha,
        ]
    }

    pub fn lerp(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        let t = t.clamp(0.0, 1.0);
        [
            a[0] * (1.0 - t) + b[0] * t,
            a[1] * (1.0 - t) + b[1] * t,
            a[2] * (1.0 - t) + b[2] * t,
            a[3] * (1.0 - t) + b[3] * t,
        ]
    }

    pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
        [color[0], color[1], color[2], alpha]
    }

    pub const CHARACTER: [f32; 4] = rgba(0x3A86FF, 1.0);
    pub const CHARACTER_HIT: [f32; 4] = rgba(0xFF3B3B, 1.0);
    pub const CHARACTER_EYE: [f32; 4] = rgba(0xFFFFFF, 1.0);
    pub const COLLECTIBLE: [f32; 4] = rgba(0xFFD700, 1.0);
    pub const COLLECTIBLE_HALO: [f32; 4] = rgba(0xFFD700, 0.35);
    pub const LIFE_ITEM: [f32; 4] = rgba(0xFF4D6D, 1.0);
    pub const SCORE_TEXT: [f32; 4] = rgba(0xFFD700, 1.0);
    pub const LIFE_TEXT: [f32; 4] = rgba(0xFF4D6D, 1.0);
    pub const OVERLAY: [f32; 4] = rgba(0x000000, 1.0);
    pub const PROGRESS: [f32; 4] = rgba(0xFFFFFF, 0.85);
    pub const TITLE_TEXT: [f32; 4] = rgba(0xFFFFFF, 1.0);

    /// Hazard fills, picked per obstacle kind
    pub const HAZARD_PALETTE: [[f32; 4]; 6] = [
        rgba(0x8338EC, 1.0),
        rgba(0xFB5607, 1.0),
        rgba(0x2B2D42, 1.0),
        rgba(0xD62828, 1.0),
        rgba(0x6D597A, 1.0),
        rgba(0x1D3557, 1.0),
    ];
}
