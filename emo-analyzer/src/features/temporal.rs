//! Time-domain features: zero-crossing rate, RMS energy and waveform level
//!
//! Zero-crossing rate and RMS use the STFT framing so they line up with the
//! spectral features.

use super::fft::frame_ranges;
use super::{mean, mean_std};
use crate::error::FeatureError;

/// Mean per-frame zero-crossing rate (crossings per sample)
pub fn zero_crossing_rate(samples: &[f32], n_fft: usize, hop: usize) -> Result<f64, FeatureError> {
    let per_frame = frame_ranges(samples.len(), n_fft, hop)
        .into_iter()
        .map(|(start, end)| {
            let frame = &samples[start..end];
            let crossings = frame
                .windows(2)
                .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
                .count();
            crossings as f64 / frame.len() as f64
        });
    mean(per_frame).ok_or_else(no_frames)
}

/// Mean per-frame root-mean-square amplitude
pub fn rms_energy(samples: &[f32], n_fft: usize, hop: usize) -> Result<f64, FeatureError> {
    let per_frame = frame_ranges(samples.len(), n_fft, hop)
        .into_iter()
        .map(|(start, end)| {
            let frame = &samples[start..end];
            let sum_squares: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
            (sum_squares / frame.len() as f64).sqrt()
        });
    mean(per_frame).ok_or_else(no_frames)
}

/// Waveform standard deviation and peak at the decoded level
///
/// `samples` are peak-normalized; `peak` is the amplitude they were divided by.
pub fn waveform_statistics(samples: &[f32], peak: f64) -> Result<(f64, f64), FeatureError> {
    let (_, std) = mean_std(samples.iter().map(|&s| f64::from(s)))
        .ok_or_else(|| FeatureError::InsufficientSignal("no samples".to_string()))?;
    Ok((std * peak, peak))
}

fn no_frames() -> FeatureError {
    FeatureError::InsufficientSignal("no analysis frames".to_string())
}
