//! JavaScript-facing wrapper around the engine
//!
//! The page owns the animation loop and the canvas; it forwards input and
//! frame deltas here and reads back the HUD snapshot and vertex buffer.

use wasm_bindgen::prelude::*;

use crate::audio::{AudioManager, decode_wav};
use crate::engine::Engine;
use crate::renderer::{Frame, vertex};
use crate::sim::ZoneCatalog;

#[wasm_bindgen]
pub struct WebGame {
    engine: Engine,
    frame: Frame,
}

#[wasm_bindgen]
impl WebGame {
    /// Built-in zones, Web Audio output, LocalStorage saves
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, seed: u64) -> WebGame {
        super::init_logging();
        log::info!("Zone Runner starting...");

        let mut engine = Engine::new(
            ZoneCatalog::builtin(),
            AudioManager::with_default_output(),
            super::default_storage(),
            seed,
        );
        engine.resize(width, height);
        WebGame {
            engine,
            frame: Frame::new(),
        }
    }

    /// Audio file name for zone `index`, for the page to fetch
    pub fn zone_audio(&self, index: usize) -> Option<String> {
        self.engine.catalog().try_get(index).map(|z| z.audio.clone())
    }

    pub fn zone_count(&self) -> usize {
        self.engine.catalog().len()
    }

    /// Hand over fetched WAV bytes for zone `index`. Returns false on decode failure.
    pub fn load_track(&mut self, index: usize, bytes: &[u8]) -> bool {
        let Some(zone) = self.engine.catalog().try_get(index).map(|z| z.id) else {
            return false;
        };
        match decode_wav(bytes) {
            Ok(buffer) => {
                self.engine.load_track(zone, buffer);
                true
            }
            Err(e) => {
                log::warn!("Zone {} track unavailable: {}", zone, e);
                false
            }
        }
    }

    pub fn finish_loading(&mut self) {
        self.engine.finish_loading();
    }

    pub fn frame(&mut self, dt: f32) {
        self.engine.frame(dt);
        for pattern in self.engine.drain_haptics() {
            super::vibrate(pattern.pattern());
        }
    }

    /// Current frame as flat `[x, y, r, g, b, a, ...]` triangles
    pub fn vertices(&mut self) -> js_sys::Float32Array {
        self.frame.clear();
        self.engine.render(&mut self.frame);
        js_sys::Float32Array::from(vertex::as_floats(&self.frame.vertices))
    }

    /// Labels of the last `vertices()` call as JSON
    pub fn labels(&self) -> String {
        let labels: Vec<_> = self
            .frame
            .labels
            .iter()
            .map(|l| {
                serde_json::json!({
                    "text": l.text,
                    "x": l.pos.x,
                    "y": l.pos.y,
                    "size": l.size,
                    "color": l.color,
                })
            })
            .collect();
        serde_json::Value::Array(labels).to_string()
    }

    pub fn hud(&self) -> String {
        serde_json::to_string(&self.engine.hud()).unwrap_or_default()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.engine.resize(width, height);
    }

    pub fn start(&mut self) -> bool {
        self.engine.start()
    }

    pub fn has_saved_game(&self) -> bool {
        self.engine.has_saved_game()
    }

    pub fn resume_saved(&mut self) -> bool {
        self.engine.resume_saved()
    }

    pub fn pause(&mut self) -> bool {
        self.engine.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.engine.resume()
    }

    pub fn restart_current_zone(&mut self) -> bool {
        self.engine.restart_current_zone()
    }

    pub fn retry(&mut self) -> bool {
        self.engine.retry()
    }

    pub fn main_menu(&mut self) -> bool {
        self.engine.main_menu()
    }

    pub fn play_again(&mut self) -> bool {
        self.engine.play_again()
    }

    pub fn select_zone(&mut self, index: usize) -> bool {
        self.engine.select_zone(index)
    }

    pub fn jump(&mut self) -> bool {
        self.engine.handle_jump()
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.engine.set_volume(volume);
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.engine.toggle_mute()
    }
}
