//! Pitch-class (chroma) profile

use super::fft::Spectrogram;
use super::mean_std;
use crate::error::FeatureError;

/// Lowest frequency folded into the chroma profile (C1)
pub const MIN_FREQUENCY: f64 = 32.7;

/// Number of pitch classes
pub const N_CHROMA: usize = 12;

/// Pitch class (0 = C) of a frequency
pub fn pitch_class(hz: f64) -> usize {
    let midi = (12.0 * (hz / 440.0).log2() + 69.0).round() as i64;
    midi.rem_euclid(N_CHROMA as i64) as usize
}

/// Per-frame chroma vectors, each normalized by its maximum
///
/// Frames without energy above [`MIN_FREQUENCY`] are dropped.
pub fn chromagram(spec: &Spectrogram) -> Vec<[f64; N_CHROMA]> {
    let classes: Vec<Option<usize>> = spec
        .bin_frequencies()
        .into_iter()
        .map(|f| (f >= MIN_FREQUENCY).then(|| pitch_class(f)))
        .collect();

    spec.frames()
        .iter()
        .filter_map(|frame| {
            let mut chroma = [0.0f64; N_CHROMA];
            for (&m, class) in frame.iter().zip(&classes) {
                if let Some(c) = class {
                    chroma[*c] += (m as f64) * (m as f64);
                }
            }
            let max = chroma.iter().copied().fold(0.0f64, f64::max);
            if max > 0.0 {
                chroma.iter_mut().for_each(|v| *v /= max);
                Some(chroma)
            } else {
                None
            }
        })
        .collect()
}

/// Mean and population standard deviation over all chroma values
pub fn chroma_statistics(spec: &Spectrogram) -> Result<(f64, f64), FeatureError> {
    let frames = chromagram(spec);
    mean_std(frames.iter().flat_map(|frame| frame.iter().copied()))
        .ok_or_else(|| FeatureError::Degenerate("no pitched energy".to_string()))
}
