//! Game engine: phase machine, public actions and effect interpreter
//!
//! `Engine` exclusively owns the `GameState`. Every action mutates the state
//! through the `sim::tick` transitions and then performs the returned effects
//! in order (audio, save slot, haptics), so state always changes before the
//! side effects that follow it.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::Viewport;
use crate::audio::{AudioManager, PreloadReport, TrackBuffer, TrackLoader};
use crate::consts::{MAX_FRAME_DT, ZONE_MAX_DURATION};
use crate::persistence::{Clock, SaveSlot, SaveState, Storage};
use crate::platform::SystemClock;
use crate::renderer::{self, Surface};
use crate::settings::Settings;
use crate::sim::{self, Effect, GamePhase, GameState, Haptic, ZoneCatalog};

/// Read-only projection of the state for a HUD/UI layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub zone_index: usize,
    pub zone_count: usize,
    pub zone_name: String,
    pub zone_progress: f32,
    pub transition_alpha: f32,
    /// 0 - 100
    pub volume: u8,
    pub muted: bool,
}

/// Non-finite or negative host deltas count as no time passing
fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.max(0.0) } else { 0.0 }
}

/// The runtime game engine
pub struct Engine {
    state: GameState,
    catalog: ZoneCatalog,
    viewport: Viewport,
    rng: Pcg32,
    audio: AudioManager,
    storage: Box<dyn Storage>,
    save_slot: SaveSlot,
    settings: Settings,
    clock: Box<dyn Clock>,
    haptics: Vec<Haptic>,
}

impl Engine {
    /// New engine in the Loading phase
    ///
    /// Settings are read from `storage` and applied to `audio`.
    pub fn new(
        catalog: ZoneCatalog,
        mut audio: AudioManager,
        storage: Box<dyn Storage>,
        seed: u64,
    ) -> Self {
        let settings = Settings::load(storage.as_ref());
        audio.set_volume(settings.volume_fraction());
        audio.set_muted(settings.muted);

        let viewport = Viewport::default();
        let mut state = GameState::new();
        state.phase = GamePhase::Loading;
        state.reset_character(&viewport);

        Self {
            state,
            catalog,
            viewport,
            rng: Pcg32::seed_from_u64(seed),
            audio,
            storage,
            save_slot: SaveSlot::default(),
            settings,
            clock: Box::new(SystemClock),
            haptics: Vec::new(),
        }
    }

    /// Replace the wall clock used for save timestamps
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn catalog(&self) -> &ZoneCatalog {
        &self.catalog
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn hud(&self) -> HudSnapshot {
        let zone = self.catalog.get(self.state.current_zone_index);
        HudSnapshot {
            phase: self.state.phase,
            score: self.state.score,
            lives: self.state.lives,
            zone_index: self.state.current_zone_index,
            zone_count: self.catalog.len(),
            zone_name: zone.name.clone(),
            zone_progress: self.state.zone_progress,
            transition_alpha: self.state.transition_alpha,
            volume: self.settings.volume,
            muted: self.audio.is_muted(),
        }
    }

    /// Compose the current frame onto `surface`
    pub fn render(&self, surface: &mut dyn Surface) {
        renderer::render(surface, &self.state, &self.catalog, &self.viewport);
    }

    // === Loading ===

    /// Decode every zone track, then move to Start
    pub fn preload_audio(
        &mut self,
        loader: &(dyn TrackLoader + Sync),
        on_progress: impl FnMut(usize, usize),
    ) -> PreloadReport {
        let report = self
            .audio
            .preload_all(self.catalog.zones(), loader, on_progress);
        self.finish_loading();
        report
    }

    /// Register one decoded track, for hosts that fetch audio themselves
    pub fn load_track(&mut self, zone: sim::ZoneId, buffer: TrackBuffer) {
        self.audio.insert_track(zone, buffer);
    }

    /// Loading complete (or skipped): show the title screen
    pub fn finish_loading(&mut self) {
        if self.state.phase == GamePhase::Loading {
            self.set_phase(GamePhase::Start);
        }
    }

    // === Frame driver ===

    /// Advance one host frame. `dt` is clamped to `MAX_FRAME_DT`.
    pub fn frame(&mut self, dt: f32) {
        let dt = sanitize_dt(dt).min(MAX_FRAME_DT);
        let before = self.state.phase;

        match self.state.phase {
            GamePhase::Playing => {
                self.update(dt);
            }
            GamePhase::ZoneTransition => {
                if sim::update_transition(&mut self.state, dt) {
                    let effects = sim::advance_to_next_zone(&mut self.state, &self.catalog);
                    self.apply(effects);
                }
            }
            _ => {}
        }

        self.audio.tick(dt);
        self.log_phase_change(before);
    }

    /// One simulation step. Returns false (and does nothing) unless Playing.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        let effects = sim::update(
            &mut self.state,
            &self.catalog,
            &self.viewport,
            sanitize_dt(dt),
            &mut self.rng,
        );
        self.apply(effects);
        true
    }

    /// Viewport changed: keep the character on the new ground line
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = Viewport::new(width, height);
        self.state.character.place(&self.viewport);
        if !self.state.character.is_on_ground {
            let rest_y = sim::Character::rest_y(self.viewport.ground_y());
            self.state.character.pos.y = self.state.character.pos.y.min(rest_y);
        }
    }

    // === Actions ===

    /// Start a new run from the title screen
    pub fn start(&mut self) -> bool {
        if self.state.phase != GamePhase::Start {
            return false;
        }
        self.audio.unlock();
        let effects = sim::restart_game(&mut self.state, &self.catalog, &self.viewport);
        self.apply(effects);
        self.log_phase_change(GamePhase::Start);
        true
    }

    /// Is there a fresh save to resume?
    pub fn has_saved_game(&self) -> bool {
        self.save_slot
            .load(self.storage.as_ref(), self.clock.now_ms())
            .is_some()
    }

    /// Resume the saved zone from the title screen, or start fresh without one
    pub fn resume_saved(&mut self) -> bool {
        if self.state.phase != GamePhase::Start {
            return false;
        }
        let Some(save) = self
            .save_slot
            .load(self.storage.as_ref(), self.clock.now_ms())
        else {
            return self.start();
        };

        self.audio.unlock();
        self.state = GameState::new();
        let effects = sim::restart_from_zone(
            &mut self.state,
            &self.catalog,
            save.current_zone,
            &self.viewport,
        );
        self.state.score = save.score;
        self.state.lives = save.resume_lives();
        log::info!(
            "Resuming zone {} (score {}, lives {})",
            self.state.current_zone_index + 1,
            self.state.score,
            self.state.lives
        );
        self.apply(effects);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.set_phase(GamePhase::Paused);
        self.apply(vec![Effect::StopAllAudio]);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state.phase != GamePhase::Paused {
            return false;
        }
        self.set_phase(GamePhase::Playing);
        let zone = self.catalog.get(self.state.current_zone_index).id;
        let mut effects = vec![Effect::PlayZone(zone)];
        // Pausing cancelled an end-of-zone fade that will not fire again
        if self.state.fade_fired {
            effects.push(Effect::FadeOutZone {
                zone,
                duration: (ZONE_MAX_DURATION - self.state.zone_timer).max(0.0),
            });
        }
        self.apply(effects);
        true
    }

    /// From the pause menu: replay the current zone
    pub fn restart_current_zone(&mut self) -> bool {
        if self.state.phase != GamePhase::Paused {
            return false;
        }
        self.restart_zone(self.state.current_zone_index)
    }

    /// After game over: replay the zone that was lost
    pub fn retry(&mut self) -> bool {
        if self.state.phase != GamePhase::GameOver {
            return false;
        }
        self.restart_zone(self.state.current_zone_index)
    }

    /// After the finale (or from the title screen): play a chosen zone
    ///
    /// Out-of-range indices fall back to the first zone.
    pub fn select_zone(&mut self, index: usize) -> bool {
        if !matches!(self.state.phase, GamePhase::Finale | GamePhase::Start) {
            return false;
        }
        self.audio.unlock();
        self.restart_zone(index)
    }

    /// After the finale: a brand-new run
    pub fn play_again(&mut self) -> bool {
        if self.state.phase != GamePhase::Finale {
            return false;
        }
        let effects = sim::restart_game(&mut self.state, &self.catalog, &self.viewport);
        self.apply(effects);
        self.log_phase_change(GamePhase::Finale);
        true
    }

    pub fn main_menu(&mut self) -> bool {
        if !matches!(
            self.state.phase,
            GamePhase::Paused | GamePhase::GameOver | GamePhase::Finale
        ) {
            return false;
        }
        let before = self.state.phase;
        self.state = GameState::new();
        self.state.reset_character(&self.viewport);
        self.apply(vec![Effect::StopAllAudio]);
        self.log_phase_change(before);
        true
    }

    fn restart_zone(&mut self, index: usize) -> bool {
        let before = self.state.phase;
        let effects = sim::restart_from_zone(&mut self.state, &self.catalog, index, &self.viewport);
        self.apply(effects);
        self.log_phase_change(before);
        true
    }

    /// Jump input. Returns whether the jump was accepted.
    pub fn handle_jump(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        if !sim::jump(&mut self.state.character) {
            return false;
        }
        self.apply(vec![Effect::Haptic(Haptic::Jump)]);
        true
    }

    /// Master volume, 0 - 100
    pub fn set_volume(&mut self, volume: u8) {
        self.settings.volume = volume.min(100);
        self.audio.set_volume(self.settings.volume_fraction());
        self.settings.save(self.storage.as_mut());
    }

    /// Returns the new mute state
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.audio.toggle_mute();
        self.settings.muted = muted;
        self.settings.save(self.storage.as_mut());
        muted
    }

    pub fn set_haptics(&mut self, enabled: bool) {
        self.settings.haptics = enabled;
        if !enabled {
            self.haptics.clear();
        }
        self.settings.save(self.storage.as_mut());
    }

    /// Haptic patterns requested since the last call
    pub fn drain_haptics(&mut self) -> Vec<Haptic> {
        std::mem::take(&mut self.haptics)
    }

    // === Effects ===

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StopAllAudio => self.audio.stop_all(),
                Effect::PlayZone(zone) => self.audio.play(zone, true),
                Effect::FadeOutZone { zone, duration } => self.audio.fade_out(zone, duration),
                Effect::PersistSave {
                    current_zone,
                    score,
                    lives,
                } => {
                    let save = SaveState {
                        current_zone,
                        score,
                        lives,
                        timestamp: self.clock.now_ms(),
                    };
                    self.save_slot.write(self.storage.as_mut(), &save);
                }
                Effect::Haptic(pattern) => {
                    if self.settings.haptics {
                        self.haptics.push(pattern);
                    }
                }
            }
        }
    }

    fn set_phase(&mut self, phase: GamePhase) {
        let before = self.state.phase;
        self.state.phase = phase;
        self.log_phase_change(before);
    }

    fn log_phase_change(&self, before: GamePhase) {
        if before != self.state.phase {
            log::info!("Phase {:?} -> {:?}", before, self.state.phase);
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("phase", &self.state.phase)
            .field("zone", &self.state.current_zone_index)
            .field("score", &self.state.score)
            .field("lives", &self.state.lives)
            .field("viewport", &self.viewport)
            .field("audio", &self.audio)
            .finish()
    }
}
