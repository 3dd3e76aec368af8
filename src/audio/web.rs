//! Browser playback through the Web Audio API

use std::collections::HashMap;
use std::sync::Arc;

use web_sys::{AudioBufferSourceNode, AudioContext, GainNode};

use super::cache::BufferCache;
use super::loader::TrackBuffer;
use super::output::{AudioOutput, VoiceId};
use crate::error::AudioError;

fn js_err(context: &str, err: wasm_bindgen::JsValue) -> AudioError {
    AudioError::Output(format!("{}: {:?}", context, err))
}

/// Voices are buffer sources routed through their own gain into a master gain
///
/// Each track is converted to an `AudioBuffer` once and shared by every voice
/// that plays it.
pub struct WebAudioOutput {
    ctx: AudioContext,
    master: GainNode,
    buffers: BufferCache<web_sys::AudioBuffer>,
    voices: HashMap<VoiceId, (AudioBufferSourceNode, GainNode)>,
    next_id: VoiceId,
}

impl WebAudioOutput {
    pub fn new() -> Result<Self, AudioError> {
        let ctx = AudioContext::new().map_err(|e| js_err("Failed to create AudioContext", e))?;
        let master = ctx
            .create_gain()
            .map_err(|e| js_err("Failed to create master gain", e))?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| js_err("Failed to connect master gain", e))?;
        Ok(Self {
            ctx,
            master,
            buffers: BufferCache::new(),
            voices: HashMap::new(),
            next_id: 0,
        })
    }

    fn audio_buffer(
        &mut self,
        track: &Arc<TrackBuffer>,
    ) -> Result<web_sys::AudioBuffer, AudioError> {
        let ctx = &self.ctx;
        let buffer = self
            .buffers
            .get_or_try_insert(track, |t| to_audio_buffer(ctx, t))?;
        log::trace!("{} AudioBuffers cached", self.buffers.len());
        Ok(buffer)
    }
}

fn to_audio_buffer(
    ctx: &AudioContext,
    track: &TrackBuffer,
) -> Result<web_sys::AudioBuffer, AudioError> {
    let channels = track.channels as usize;
    let frames = track.frames();
    let buffer = ctx
        .create_buffer(track.channels as u32, frames as u32, track.sample_rate as f32)
        .map_err(|e| js_err("Failed to allocate AudioBuffer", e))?;

    // De-interleave
    for ch in 0..channels {
        let mut data: Vec<f32> = track
            .samples
            .iter()
            .skip(ch)
            .step_by(channels)
            .copied()
            .collect();
        buffer
            .copy_to_channel(&mut data, ch as i32)
            .map_err(|e| js_err("Failed to fill AudioBuffer", e))?;
    }
    Ok(buffer)
}

impl AudioOutput for WebAudioOutput {
    /// The resume promise is not awaited; browsers settle it after the gesture
    fn resume(&mut self, _timeout_ms: u64) -> Result<(), AudioError> {
        if self.ctx.state() == web_sys::AudioContextState::Suspended {
            self.ctx
                .resume()
                .map_err(|e| js_err("Failed to resume AudioContext", e))?;
        }
        Ok(())
    }

    fn play_silence(&mut self) -> Result<(), AudioError> {
        let buffer = self
            .ctx
            .create_buffer(1, 1, 22050.0)
            .map_err(|e| js_err("Failed to allocate silent buffer", e))?;
        let source = self
            .ctx
            .create_buffer_source()
            .map_err(|e| js_err("Failed to create buffer source", e))?;
        source.set_buffer(Some(&buffer));
        source
            .connect_with_audio_node(&self.ctx.destination())
            .map_err(|e| js_err("Failed to connect silent buffer", e))?;
        source
            .start()
            .map_err(|e| js_err("Failed to start silent buffer", e))?;
        Ok(())
    }

    fn start_voice(
        &mut self,
        buffer: &Arc<TrackBuffer>,
        looping: bool,
        gain: f32,
    ) -> Result<VoiceId, AudioError> {
        let audio_buffer = self.audio_buffer(buffer)?;
        let source = self
            .ctx
            .create_buffer_source()
            .map_err(|e| js_err("Failed to create buffer source", e))?;
        source.set_buffer(Some(&audio_buffer));
        source.set_loop(looping);

        let gain_node = self
            .ctx
            .create_gain()
            .map_err(|e| js_err("Failed to create voice gain", e))?;
        gain_node.gain().set_value(gain);

        source
            .connect_with_audio_node(&gain_node)
            .map_err(|e| js_err("Failed to connect voice", e))?;
        gain_node
            .connect_with_audio_node(&self.master)
            .map_err(|e| js_err("Failed to connect voice gain", e))?;
        source
            .start()
            .map_err(|e| js_err("Failed to start voice", e))?;

        self.next_id += 1;
        self.voices.insert(self.next_id, (source, gain_node));
        Ok(self.next_id)
    }

    fn set_voice_gain(&mut self, voice: VoiceId, gain: f32) {
        if let Some((_, gain_node)) = self.voices.get(&voice) {
            gain_node.gain().set_value(gain);
        }
    }

    fn stop_voice(&mut self, voice: VoiceId) {
        if let Some((source, gain_node)) = self.voices.remove(&voice) {
            let _ = source.stop();
            let _ = gain_node.disconnect();
        }
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.master.gain().set_value(gain);
    }
}
