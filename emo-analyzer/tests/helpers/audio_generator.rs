//! Audio Test Fixture Generator
//!
//! In-memory WAV payloads with known characteristics

use std::io::Cursor;

/// Configuration for generated audio
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub frequency: f64,
    pub amplitude: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 2.0,
            sample_rate: 22050,
            channels: 1,
            frequency: 440.0,
            amplitude: 0.3,
        }
    }
}

/// Generate a 16-bit PCM WAV payload holding a sine tone
///
/// # Arguments
/// * `config` - Audio configuration
///
/// # Returns
/// Complete WAV file bytes
pub fn wav_bytes(config: &AudioConfig) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
        let total_frames = (config.duration_seconds * config.sample_rate as f64) as usize;

        for i in 0..total_frames {
            let t = i as f64 / config.sample_rate as f64;
            let value = config.amplitude * (2.0 * std::f64::consts::PI * config.frequency * t).sin();
            let sample = (value * i16::MAX as f64) as i16;
            for _ in 0..config.channels {
                writer.write_sample(sample).unwrap();
            }
        }

        writer.finalize().unwrap();
    }
    bytes
}

/// Generate a 32-bit float WAV payload holding a sine tone
///
/// Allows amplitudes far below 16-bit resolution, down to subnormal floats.
pub fn float_wav_bytes(config: &AudioConfig) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut bytes = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
        let total_frames = (config.duration_seconds * config.sample_rate as f64) as usize;

        for i in 0..total_frames {
            let t = i as f64 / config.sample_rate as f64;
            let value = config.amplitude * (2.0 * std::f64::consts::PI * config.frequency * t).sin();
            for _ in 0..config.channels {
                writer.write_sample(value as f32).unwrap();
            }
        }

        writer.finalize().unwrap();
    }
    bytes
}

/// Digital silence as a mono WAV payload
pub fn silent_wav_bytes(duration_seconds: f64, sample_rate: u32) -> Vec<u8> {
    wav_bytes(&AudioConfig {
        duration_seconds,
        sample_rate,
        channels: 1,
        frequency: 440.0,
        amplitude: 0.0,
    })
}

/// Non-empty bytes no container probe recognizes
///
/// Consecutive bytes step by 7 modulo 253, so no 0xFF sync byte and no
/// container magic appears anywhere.
pub fn garbage_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 7) % 253) as u8).collect()
}
