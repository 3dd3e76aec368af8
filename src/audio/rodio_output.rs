//! Native playback through rodio (feature `rodio-output`)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use super::loader::TrackBuffer;
use super::output::{AudioOutput, VoiceId};
use crate::error::AudioError;

/// Plays a shared decoded track without copying its samples
struct TrackSource {
    track: Arc<TrackBuffer>,
    pos: usize,
    looping: bool,
}

impl TrackSource {
    fn new(track: Arc<TrackBuffer>, looping: bool) -> Self {
        Self {
            track,
            pos: 0,
            looping,
        }
    }
}

impl Iterator for TrackSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.pos >= self.track.samples.len() {
            if !self.looping || self.track.samples.is_empty() {
                return None;
            }
            self.pos = 0;
        }
        let sample = self.track.samples.get(self.pos).copied();
        self.pos += 1;
        sample
    }
}

impl Source for TrackSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.track.channels
    }

    fn sample_rate(&self) -> u32 {
        self.track.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        if self.looping {
            None
        } else {
            Some(Duration::from_secs_f32(self.track.duration_secs()))
        }
    }
}

/// One sink per voice; master gain is folded into each sink's volume
pub struct RodioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sinks: HashMap<VoiceId, (Sink, f32)>,
    next_id: VoiceId,
    master_gain: f32,
}

impl RodioOutput {
    /// Open the default output device
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| AudioError::Output(format!("Failed to create audio stream: {}", e)))?;
        Ok(Self {
            _stream: stream,
            handle,
            sinks: HashMap::new(),
            next_id: 0,
            master_gain: 1.0,
        })
    }

    fn new_sink(&self) -> Result<Sink, AudioError> {
        Sink::try_new(&self.handle)
            .map_err(|e| AudioError::Output(format!("Failed to create audio sink: {}", e)))
    }
}

impl AudioOutput for RodioOutput {
    fn resume(&mut self, _timeout_ms: u64) -> Result<(), AudioError> {
        // Native devices start running
        Ok(())
    }

    fn play_silence(&mut self) -> Result<(), AudioError> {
        let sink = self.new_sink()?;
        sink.append(SamplesBuffer::new(1, 22050, vec![0.0f32; 1]));
        sink.detach();
        Ok(())
    }

    fn start_voice(
        &mut self,
        buffer: &Arc<TrackBuffer>,
        looping: bool,
        gain: f32,
    ) -> Result<VoiceId, AudioError> {
        let sink = self.new_sink()?;
        sink.append(TrackSource::new(Arc::clone(buffer), looping));
        sink.set_volume(gain * self.master_gain);

        self.next_id += 1;
        self.sinks.insert(self.next_id, (sink, gain));
        Ok(self.next_id)
    }

    fn set_voice_gain(&mut self, voice: VoiceId, gain: f32) {
        if let Some((sink, g)) = self.sinks.get_mut(&voice) {
            *g = gain;
            sink.set_volume(gain * self.master_gain);
        }
    }

    fn stop_voice(&mut self, voice: VoiceId) {
        if let Some((sink, _)) = self.sinks.remove(&voice) {
            sink.stop();
        }
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = gain;
        for (sink, g) in self.sinks.values() {
            sink.set_volume(g * gain);
        }
    }

    fn voice_finished(&self, voice: VoiceId) -> bool {
        self.sinks.get(&voice).is_none_or(|(sink, _)| sink.empty())
    }
}
