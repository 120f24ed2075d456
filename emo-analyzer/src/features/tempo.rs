//! Global tempo estimate from onset-strength autocorrelation
//!
//! # Algorithm
//! 1. Log-compress the magnitude spectrogram: `ln(1 + 100·m)`
//! 2. Onset envelope = half-wave rectified spectral flux, mean removed
//! 3. Autocorrelate the envelope over lags covering 40-240 BPM
//! 4. Weight each lag with a log-normal prior centered on 120 BPM
//!    (one-octave standard deviation) and pick the strongest lag

use super::fft::Spectrogram;
use crate::error::FeatureError;

pub const MIN_BPM: f64 = 40.0;
pub const MAX_BPM: f64 = 240.0;
pub const PRIOR_BPM: f64 = 120.0;

const LOG_COMPRESSION: f64 = 100.0;

/// Mean-removed onset strength envelope (one value per frame after the first)
pub fn onset_envelope(spec: &Spectrogram) -> Vec<f64> {
    let frames = spec.frames();
    if frames.len() < 2 {
        return Vec::new();
    }

    let compress = |m: f32| (1.0 + LOG_COMPRESSION * m as f64).ln();
    let mut envelope: Vec<f64> = frames
        .windows(2)
        .map(|pair| {
            pair[1]
                .iter()
                .zip(&pair[0])
                .map(|(&cur, &prev)| (compress(cur) - compress(prev)).max(0.0))
                .sum()
        })
        .collect();

    let mean = envelope.iter().sum::<f64>() / envelope.len() as f64;
    envelope.iter_mut().for_each(|v| *v -= mean);
    envelope
}

/// Estimate tempo in BPM
///
/// # Errors
/// Too few frames to cover the lag range, or a flat onset envelope.
pub fn estimate_tempo(spec: &Spectrogram) -> Result<f64, FeatureError> {
    let frame_rate = spec.frame_rate();
    let min_lag = ((60.0 * frame_rate / MAX_BPM).ceil() as usize).max(1);
    let max_lag = (60.0 * frame_rate / MIN_BPM).floor() as usize;

    let envelope = onset_envelope(spec);
    if envelope.len() <= min_lag + 1 || max_lag < min_lag {
        return Err(FeatureError::InsufficientSignal(format!(
            "{} onset frames, need more than {}",
            envelope.len(),
            min_lag + 1
        )));
    }

    let energy: f64 = envelope.iter().map(|v| v * v).sum();
    if energy <= f64::EPSILON {
        return Err(FeatureError::Degenerate("flat onset envelope".to_string()));
    }

    let max_lag = max_lag.min(envelope.len() - 1);
    let mut best: Option<(usize, f64)> = None;
    for lag in min_lag..=max_lag {
        let correlation: f64 = envelope[..envelope.len() - lag]
            .iter()
            .zip(&envelope[lag..])
            .map(|(a, b)| a * b)
            .sum();
        if correlation <= 0.0 {
            continue;
        }
        let bpm = 60.0 * frame_rate / lag as f64;
        let octaves = (bpm / PRIOR_BPM).log2();
        let score = correlation * (-0.5 * octaves * octaves).exp();
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((lag, score));
        }
    }

    best.map(|(lag, _)| 60.0 * frame_rate / lag as f64)
        .ok_or_else(|| FeatureError::Degenerate("no periodicity in onset envelope".to_string()))
}
