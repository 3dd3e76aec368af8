//! Output backend seam
//!
//! The manager drives playback through `AudioOutput`; backends only know how
//! to start, re-gain and stop looping voices.

use std::collections::HashMap;
use std::sync::Arc;

use super::loader::TrackBuffer;
use crate::error::AudioError;

/// Handle to one playing buffer
pub type VoiceId = u64;

/// A device or context that can play decoded tracks
pub trait AudioOutput {
    /// Resume a suspended context, giving up after `timeout_ms`
    fn resume(&mut self, timeout_ms: u64) -> Result<(), AudioError>;

    /// Play a short silent buffer to finish unlocking the device
    fn play_silence(&mut self) -> Result<(), AudioError>;

    fn start_voice(
        &mut self,
        buffer: &Arc<TrackBuffer>,
        looping: bool,
        gain: f32,
    ) -> Result<VoiceId, AudioError>;

    fn set_voice_gain(&mut self, voice: VoiceId, gain: f32);

    fn stop_voice(&mut self, voice: VoiceId);

    /// Gain applied after every voice (volume and mute)
    fn set_master_gain(&mut self, gain: f32);

    /// Non-looping voice ran out of samples
    fn voice_finished(&self, _voice: VoiceId) -> bool {
        false
    }
}

/// Silent backend: tracks voices and gains but produces no sound
#[derive(Debug, Default)]
pub struct NullOutput {
    next_id: VoiceId,
    voices: HashMap<VoiceId, f32>,
    master_gain: f32,
}

impl NullOutput {
    pub fn new() -> Self {
        Self {
            master_gain: 1.0,
            ..Default::default()
        }
    }

    pub fn live_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn voice_gain(&self, voice: VoiceId) -> Option<f32> {
        self.voices.get(&voice).copied()
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }
}

impl AudioOutput for NullOutput {
    fn resume(&mut self, _timeout_ms: u64) -> Result<(), AudioError> {
        Ok(())
    }

    fn play_silence(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn start_voice(
        &mut self,
        _buffer: &Arc<TrackBuffer>,
        _looping: bool,
        gain: f32,
    ) -> Result<VoiceId, AudioError> {
        self.next_id += 1;
        self.voices.insert(self.next_id, gain);
        Ok(self.next_id)
    }

    fn set_voice_gain(&mut self, voice: VoiceId, gain: f32) {
        if let Some(g) = self.voices.get_mut(&voice) {
            *g = gain;
        }
    }

    fn stop_voice(&mut self, voice: VoiceId) {
        self.voices.remove(&voice);
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_output_tracks_voices() {
        let buffer = Arc::new(TrackBuffer {
            channels: 1,
            sample_rate: 8000,
            samples: vec![0.0; 8],
        });
        let mut out = NullOutput::new();
        let a = out.start_voice(&buffer, true, 1.0).unwrap();
        let b = out.start_voice(&buffer, true, 0.0).unwrap();
        assert_ne!(a, b);
        assert_eq!(out.live_voices(), 2);

        out.set_voice_gain(b, 0.4);
        assert_eq!(out.voice_gain(b), Some(0.4));

        out.stop_voice(a);
        assert_eq!(out.live_voices(), 1);
        assert_eq!(out.voice_gain(a), None);
        assert!(!out.voice_finished(b));
    }
}
