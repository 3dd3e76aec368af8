//! Zone soundtrack playback
//!
//! One decoded track per zone, played as a looping voice on an `AudioOutput`
//! backend. The manager owns every voice and its gain ramp; fades advance in
//! `tick`, driven by the frame loop, so no timers outlive a `stop_all`.
//!
//! Failures here are logged and absorbed: gameplay never waits on audio.

#[cfg(any(target_arch = "wasm32", test))]
mod cache;
mod loader;
mod output;
#[cfg(all(feature = "rodio-output", not(target_arch = "wasm32")))]
mod rodio_output;
#[cfg(target_arch = "wasm32")]
mod web;

use std::collections::HashMap;
use std::sync::Arc;

pub use loader::{MemoryLoader, TrackBuffer, TrackLoader, WavFileLoader, decode_wav};
pub use output::{AudioOutput, NullOutput, VoiceId};
#[cfg(all(feature = "rodio-output", not(target_arch = "wasm32")))]
pub use rodio_output::RodioOutput;
#[cfg(target_arch = "wasm32")]
pub use web::WebAudioOutput;

#[cfg(test)]
pub(crate) use loader::test_wav;

use crate::consts::UNLOCK_TIMEOUT_MS;
use crate::error::AudioError;
use crate::sim::{ZoneDescriptor, ZoneId};

/// Default master volume (0.0 - 1.0)
pub const DEFAULT_VOLUME: f32 = 0.8;

/// Linear gain envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRamp {
    pub from: f32,
    pub to: f32,
    pub elapsed: f32,
    pub duration: f32,
}

impl GainRamp {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration,
        }
    }

    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).min(1.0);
        self.from + (self.to - self.from) * t
    }

    /// Returns true once the ramp has reached its target
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.duration
    }
}

#[derive(Debug)]
struct Voice {
    handle: VoiceId,
    gain: f32,
    ramp: Option<GainRamp>,
    /// Fading out: stop once the ramp completes
    stop_when_done: bool,
}

#[derive(Debug, Default)]
struct Track {
    buffer: Option<Arc<TrackBuffer>>,
    voice: Option<Voice>,
}

/// Outcome of `preload_all`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub loaded: usize,
    /// Zones whose track failed to load; they play silently
    pub failed: Vec<ZoneId>,
}

/// Owns the zone tracks and every playing voice
pub struct AudioManager {
    output: Box<dyn AudioOutput>,
    tracks: HashMap<ZoneId, Track>,
    current_zone: Option<ZoneId>,
    volume: f32,
    muted: bool,
    unlocked: bool,
}

impl AudioManager {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        let mut manager = Self {
            output,
            tracks: HashMap::new(),
            current_zone: None,
            volume: DEFAULT_VOLUME,
            muted: false,
            unlocked: false,
        };
        manager.apply_master_gain();
        manager
    }

    /// Manager on the silent backend
    pub fn silent() -> Self {
        Self::new(Box::new(NullOutput::new()))
    }

    /// Best available backend for this platform, silent on failure
    pub fn with_default_output() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            match WebAudioOutput::new() {
                Ok(out) => return Self::new(Box::new(out)),
                Err(e) => log::warn!("{} - audio disabled", e),
            }
        }
        #[cfg(all(feature = "rodio-output", not(target_arch = "wasm32")))]
        {
            match RodioOutput::new() {
                Ok(out) => return Self::new(Box::new(out)),
                Err(e) => log::warn!("{} - audio disabled", e),
            }
        }
        Self::silent()
    }

    /// Resume the output after a user gesture. Idempotent.
    ///
    /// A failed or slow resume is logged and the game continues.
    pub fn unlock(&mut self) {
        if self.unlocked {
            return;
        }
        if let Err(e) = self.output.resume(UNLOCK_TIMEOUT_MS) {
            log::warn!("Audio unlock failed: {}", e);
        }
        if let Err(e) = self.output.play_silence() {
            log::debug!("Silent unlock buffer failed: {}", e);
        }
        self.unlocked = true;
        log::info!("Audio unlocked");
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Register a decoded track for `zone`
    pub fn insert_track(&mut self, zone: ZoneId, buffer: TrackBuffer) {
        self.tracks.entry(zone).or_default().buffer = Some(Arc::new(buffer));
    }

    pub fn has_track(&self, zone: ZoneId) -> bool {
        self.tracks.get(&zone).is_some_and(|t| t.buffer.is_some())
    }

    /// Decode every zone track, reporting `(loaded, total)` after each one
    ///
    /// Tracks load concurrently on native targets. Failed zones are recorded
    /// and simply play silence later.
    pub fn preload_all(
        &mut self,
        zones: &[ZoneDescriptor],
        loader: &(dyn TrackLoader + Sync),
        mut on_progress: impl FnMut(usize, usize),
    ) -> PreloadReport {
        let total = zones.len();
        let mut report = PreloadReport::default();
        on_progress(0, total);

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::scope(|scope| {
            let (tx, rx) = std::sync::mpsc::channel();
            for zone in zones {
                let tx = tx.clone();
                scope.spawn(move || {
                    let _ = tx.send((zone, loader.load(&zone.audio)));
                });
            }
            drop(tx);

            for (done, (zone, result)) in rx.iter().enumerate() {
                self.record_load(zone, result, &mut report);
                on_progress(done + 1, total);
            }
        });

        #[cfg(target_arch = "wasm32")]
        for (done, zone) in zones.iter().enumerate() {
            let result = loader.load(&zone.audio);
            self.record_load(zone, result, &mut report);
            on_progress(done + 1, total);
        }

        log::info!("Preloaded {}/{} zone tracks", report.loaded, total);
        report
    }

    fn record_load(
        &mut self,
        zone: &ZoneDescriptor,
        result: Result<TrackBuffer, AudioError>,
        report: &mut PreloadReport,
    ) {
        match result {
            Ok(buffer) => {
                log::debug!("Zone {} track: {:.1}s", zone.id, buffer.duration_secs());
                self.insert_track(zone.id, buffer);
                report.loaded += 1;
            }
            Err(e) => {
                log::warn!("Zone {} track '{}' unavailable: {}", zone.id, zone.audio, e);
                self.tracks.entry(zone.id).or_default();
                report.failed.push(zone.id);
            }
        }
    }

    /// Play `zone`'s track from the start at full gain
    ///
    /// Stops the previous zone's track. No-op if `zone` is already playing;
    /// a track that is fading out is restarted fresh.
    pub fn play(&mut self, zone: ZoneId, looping: bool) {
        if let Some(current) = self.current_zone.filter(|&c| c != zone) {
            self.stop(current);
        }

        if self.is_playing(zone) {
            self.current_zone = Some(zone);
            return;
        }
        self.stop(zone);
        self.start_track(zone, 1.0, looping, None);
    }

    /// Fade `from` (and the active track, if different) out while `to`
    /// fades in over the same window
    ///
    /// The incoming track always loops.
    pub fn crossfade(&mut self, from: Option<ZoneId>, to: ZoneId, duration: f32) {
        let current = self.current_zone;
        if let Some(zone) = from.filter(|&z| z != to) {
            self.fade_out(zone, duration);
        }
        if let Some(zone) = current.filter(|&z| z != to && Some(z) != from) {
            self.fade_out(zone, duration);
        }

        if self.is_playing(to) {
            self.current_zone = Some(to);
            return;
        }
        self.current_zone = None;
        self.stop(to);
        self.start_track(to, 0.0, true, Some(GainRamp::new(0.0, 1.0, duration)));
    }

    fn start_track(&mut self, zone: ZoneId, gain: f32, looping: bool, ramp: Option<GainRamp>) {
        let Some(buffer) = self.tracks.get(&zone).and_then(|t| t.buffer.clone()) else {
            log::debug!("No track loaded for zone {}", zone);
            return;
        };

        match self.output.start_voice(&buffer, looping, gain) {
            Ok(handle) => {
                self.tracks.entry(zone).or_default().voice = Some(Voice {
                    handle,
                    gain,
                    ramp,
                    stop_when_done: false,
                });
                self.current_zone = Some(zone);
            }
            Err(e) => log::warn!("Failed to start zone {} track: {}", zone, e),
        }
    }

    /// Stop `zone`'s track immediately
    pub fn stop(&mut self, zone: ZoneId) {
        if let Some(voice) = self.tracks.get_mut(&zone).and_then(|t| t.voice.take()) {
            self.output.stop_voice(voice.handle);
        }
        if self.current_zone == Some(zone) {
            self.current_zone = None;
        }
    }

    /// Ramp `zone`'s track to silence over `duration` seconds, then stop it
    pub fn fade_out(&mut self, zone: ZoneId, duration: f32) {
        if duration <= 0.0 {
            self.stop(zone);
            return;
        }
        if let Some(voice) = self.tracks.get_mut(&zone).and_then(|t| t.voice.as_mut()) {
            voice.ramp = Some(GainRamp::new(voice.gain, 0.0, duration));
            voice.stop_when_done = true;
        }
    }

    /// Stop every track and cancel every pending fade
    pub fn stop_all(&mut self) {
        for track in self.tracks.values_mut() {
            if let Some(voice) = track.voice.take() {
                self.output.stop_voice(voice.handle);
            }
        }
        self.current_zone = None;
    }

    /// Advance gain ramps by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let mut finished = Vec::new();

        for (&zone, track) in self.tracks.iter_mut() {
            let Some(voice) = track.voice.as_mut() else {
                continue;
            };

            let mut stop = false;
            if let Some(ramp) = voice.ramp.as_mut() {
                let done = ramp.advance(dt);
                voice.gain = ramp.value();
                self.output.set_voice_gain(voice.handle, voice.gain);
                if done {
                    voice.ramp = None;
                    stop = voice.stop_when_done;
                }
            } else if self.output.voice_finished(voice.handle) {
                stop = true;
            }

            if stop {
                self.output.stop_voice(voice.handle);
                track.voice = None;
                finished.push(zone);
            }
        }

        for zone in finished {
            if self.current_zone == Some(zone) {
                self.current_zone = None;
            }
        }
    }

    /// Master volume, clamped to [0, 1]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_master_gain();
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Flip mute, applied to live voices immediately. Returns the new state.
    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_master_gain();
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn apply_master_gain(&mut self) {
        let gain = if self.muted { 0.0 } else { self.volume };
        self.output.set_master_gain(gain);
    }

    pub fn current_zone(&self) -> Option<ZoneId> {
        self.current_zone
    }

    /// Playing and not on its way out
    pub fn is_playing(&self, zone: ZoneId) -> bool {
        self.tracks
            .get(&zone)
            .and_then(|t| t.voice.as_ref())
            .is_some_and(|v| !v.stop_when_done)
    }

    pub fn is_fading(&self, zone: ZoneId) -> bool {
        self.tracks
            .get(&zone)
            .and_then(|t| t.voice.as_ref())
            .is_some_and(|v| v.ramp.is_some())
    }

    /// Effective gain of `zone`'s voice (mute applied), if it is sounding
    pub fn track_gain(&self, zone: ZoneId) -> Option<f32> {
        let voice = self.tracks.get(&zone)?.voice.as_ref()?;
        Some(if self.muted { 0.0 } else { voice.gain })
    }

    /// Number of voices currently sounding
    pub fn active_voices(&self) -> usize {
        self.tracks.values().filter(|t| t.voice.is_some()).count()
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("tracks", &self.tracks.len())
            .field("current_zone", &self.current_zone)
            .field("volume", &self.volume)
            .field("muted", &self.muted)
            .field("unlocked", &self.unlocked)
            .finish()
    }
}
