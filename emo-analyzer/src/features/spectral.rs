//! Spectral shape features: centroid, rolloff, bandwidth, contrast
//!
//! Frames with no energy are skipped. A spectrogram with no energy at all is
//! degenerate and yields an error so the caller substitutes the default.

use super::fft::Spectrogram;
use super::mean;
use crate::error::FeatureError;

/// Fraction of spectral energy below the rolloff frequency
pub const ROLLOFF_PERCENT: f64 = 0.85;

/// Lower band edges (Hz) for spectral contrast; the last band ends at Nyquist
pub const CONTRAST_BAND_EDGES: [f64; 7] = [0.0, 200.0, 400.0, 800.0, 1600.0, 3200.0, 6400.0];

/// Fraction of a band's bins averaged for the peak and valley levels
pub const CONTRAST_QUANTILE: f64 = 0.02;

const LEVEL_FLOOR: f64 = 1e-10;

/// Mean per-frame spectral centroid, Hz
pub fn spectral_centroid(spec: &Spectrogram) -> Result<f64, FeatureError> {
    let freqs = spec.bin_frequencies();
    let per_frame = voiced_frames(spec).map(|frame| centroid_of(frame, &freqs));
    mean(per_frame).ok_or_else(silent)
}

/// Mean per-frame rolloff frequency, Hz
pub fn spectral_rolloff(spec: &Spectrogram) -> Result<f64, FeatureError> {
    let freqs = spec.bin_frequencies();
    let per_frame = voiced_frames(spec).map(|frame| {
        let total: f64 = frame.iter().map(|&m| m as f64).sum();
        let threshold = ROLLOFF_PERCENT * total;
        let mut cumulative = 0.0;
        for (k, &m) in frame.iter().enumerate() {
            cumulative += m as f64;
            if cumulative >= threshold {
                return freqs[k];
            }
        }
        freqs[freqs.len() - 1]
    });
    mean(per_frame).ok_or_else(silent)
}

/// Mean per-frame magnitude-weighted spread around the centroid, Hz
pub fn spectral_bandwidth(spec: &Spectrogram) -> Result<f64, FeatureError> {
    let freqs = spec.bin_frequencies();
    let per_frame = voiced_frames(spec).map(|frame| {
        let centroid = centroid_of(frame, &freqs);
        let total: f64 = frame.iter().map(|&m| m as f64).sum();
        let spread: f64 = frame
            .iter()
            .zip(&freqs)
            .map(|(&m, &f)| m as f64 * (f - centroid).powi(2))
            .sum();
        (spread / total).sqrt()
    });
    mean(per_frame).ok_or_else(silent)
}

/// Mean octave-band peak-to-valley contrast, dB
pub fn spectral_contrast(spec: &Spectrogram) -> Result<f64, FeatureError> {
    let nyquist = spec.sample_rate() as f64 / 2.0;
    let freqs = spec.bin_frequencies();

    // Bin index ranges per band, dropping bands above Nyquist
    let mut bands: Vec<(usize, usize)> = Vec::new();
    for (i, &low) in CONTRAST_BAND_EDGES.iter().enumerate() {
        if low >= nyquist {
            break;
        }
        let high = CONTRAST_BAND_EDGES.get(i + 1).copied().unwrap_or(nyquist).min(nyquist);
        let is_last = high >= nyquist;
        let start = freqs.iter().position(|&f| f >= low).unwrap_or(freqs.len());
        let end = freqs
            .iter()
            .position(|&f| if is_last { f > high } else { f >= high })
            .unwrap_or(freqs.len());
        if end > start {
            bands.push((start, end));
        }
    }
    if bands.is_empty() {
        return Err(FeatureError::InsufficientSignal(
            "no contrast bands below Nyquist".to_string(),
        ));
    }

    let mut sorted: Vec<f64> = Vec::with_capacity(spec.num_bins());
    let per_frame = voiced_frames(spec).map(|frame| {
        let total: f64 = bands
            .iter()
            .map(|&(start, end)| {
                sorted.clear();
                sorted.extend(frame[start..end].iter().map(|&m| m as f64));
                sorted.sort_by(|a, b| a.total_cmp(b));

                let k = ((sorted.len() as f64 * CONTRAST_QUANTILE).round() as usize).max(1);
                let valley = sorted[..k].iter().sum::<f64>() / k as f64;
                let peak = sorted[sorted.len() - k..].iter().sum::<f64>() / k as f64;
                10.0 * (peak.max(LEVEL_FLOOR) / valley.max(LEVEL_FLOOR)).log10()
            })
            .sum();
        total / bands.len() as f64
    });
    mean(per_frame).ok_or_else(silent)
}

fn voiced_frames(spec: &Spectrogram) -> impl Iterator<Item = &Vec<f32>> + '_ {
    spec.frames()
        .iter()
        .filter(|frame| frame.iter().any(|&m| m > 0.0))
}

fn centroid_of(frame: &[f32], freqs: &[f64]) -> f64 {
    let total: f64 = frame.iter().map(|&m| m as f64).sum();
    let weighted: f64 = frame.iter().zip(freqs).map(|(&m, &f)| m as f64 * f).sum();
    weighted / total
}

fn silent() -> FeatureError {
    FeatureError::Degenerate("no spectral energy".to_string())
}
