//! Track loading and WAV decoding

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::AudioError;

/// A fully decoded track, interleaved f32 samples in [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct TrackBuffer {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl TrackBuffer {
    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate.max(1) as f32
    }
}

/// Source of decoded tracks, keyed by the zone's audio reference
pub trait TrackLoader {
    fn load(&self, source: &str) -> Result<TrackBuffer, AudioError>;
}

/// Loads WAV files relative to a directory
#[derive(Debug, Clone)]
pub struct WavFileLoader {
    dir: PathBuf,
}

impl WavFileLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TrackLoader for WavFileLoader {
    fn load(&self, source: &str) -> Result<TrackBuffer, AudioError> {
        let path = self.dir.join(source);
        let bytes = std::fs::read(&path).map_err(|e| AudioError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        decode_wav(&bytes)
    }
}

/// WAV files already in memory (embedded assets, fetched bytes)
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(source.into(), bytes);
    }
}

impl TrackLoader for MemoryLoader {
    fn load(&self, source: &str) -> Result<TrackBuffer, AudioError> {
        let bytes = self.files.get(source).ok_or_else(|| AudioError::Read {
            path: source.to_string(),
            reason: "not found".into(),
        })?;
        decode_wav(bytes)
    }
}

/// Decode a complete WAV file held in memory
///
/// Integer PCM is scaled by `2^(bits - 1)` into [-1, 1].
pub fn decode_wav(bytes: &[u8]) -> Result<TrackBuffer, AudioError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(AudioError::Unsupported("zero channels".into()));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AudioError::Unsupported(format!(
                    "{} bits per sample",
                    spec.bits_per_sample
                )));
            }
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    if samples.is_empty() {
        return Err(AudioError::Unsupported("no samples".into()));
    }

    Ok(TrackBuffer {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        samples,
    })
}

/// Short mono 16-bit WAV for tests
#[cfg(test)]
pub(crate) fn test_wav(frames: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut bytes = Vec::new();
    let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
    for i in 0..frames {
        writer.write_sample((i % 64) as i16 * 256).unwrap();
    }
    writer.finalize().unwrap();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_memory_loader() {
        let mut loader = MemoryLoader::new();
        loader.insert("zone01.wav", test_wav(100));
        let track = loader.load("zone01.wav").unwrap();
        assert_eq!(track.frames(), 100);
        assert!(matches!(loader.load("zone02.wav"), Err(AudioError::Read { .. })));
    }

    fn write_wav(path: &Path, spec: hound::WavSpec, samples: &[i16]) {
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn pcm16(channels: u16) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_decode_int_pcm_scaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zone01.wav");
        write_wav(&path, pcm16(2), &[0, 16384, -16384, i16::MIN]);

        let track = WavFileLoader::new(dir.path()).load("zone01.wav").unwrap();
        assert_eq!(track.channels, 2);
        assert_eq!(track.sample_rate, 22050);
        assert_eq!(track.frames(), 2);
        assert_relative_eq!(track.samples[1], 0.5);
        assert_relative_eq!(track.samples[2], -0.5);
        assert_relative_eq!(track.samples[3], -1.0);
    }

    #[test]
    fn test_decode_float_pcm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0.25f32, -0.75, 1.0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let track = decode_wav(&bytes).unwrap();
        assert_eq!(track.samples, vec![0.25, -0.75, 1.0]);
        assert_relative_eq!(track.duration_secs(), 3.0 / 8000.0);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = WavFileLoader::new(dir.path()).load("nope.wav").unwrap_err();
        assert!(matches!(err, AudioError::Read { .. }));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode_wav(b"definitely not a wav file").unwrap_err();
        assert!(matches!(err, AudioError::Decode(_)));
    }

    #[test]
    fn test_empty_track_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&path, pcm16(1), &[]);
        let err = WavFileLoader::new(dir.path()).load("empty.wav").unwrap_err();
        assert!(matches!(err, AudioError::Unsupported(_)));
    }
}
