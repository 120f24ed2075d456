//! Mel-frequency cepstral coefficients
//!
//! HTK-style triangular mel filterbank over the power spectrum, log
//! compression in dB, orthonormal DCT-II. The summary statistics exclude
//! coefficient 0, which only tracks overall loudness.

use super::fft::Spectrogram;
use super::mean_std;
use crate::error::FeatureError;

/// Number of mel filters
pub const N_MELS: usize = 40;

/// Number of cepstral coefficients kept per frame
pub const N_MFCC: usize = 13;

const POWER_FLOOR: f64 = 1e-10;

/// Triangular mel filterbank, stored sparsely as `(bin, weight)` pairs
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    filters: Vec<Vec<(usize, f64)>>,
}

impl MelFilterbank {
    /// Build `n_mels` filters spanning 0 Hz to Nyquist
    pub fn new(n_mels: usize, bin_frequencies: &[f64], sample_rate: u32) -> Self {
        let max_mel = hz_to_mel(sample_rate as f64 / 2.0);
        let points: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(max_mel * i as f64 / (n_mels + 1) as f64))
            .collect();

        let filters = (0..n_mels)
            .map(|m| {
                let (lower, center, upper) = (points[m], points[m + 1], points[m + 2]);
                bin_frequencies
                    .iter()
                    .enumerate()
                    .filter_map(|(k, &f)| {
                        let weight = if f > lower && f <= center {
                            (f - lower) / (center - lower)
                        } else if f > center && f < upper {
                            (upper - f) / (upper - center)
                        } else {
                            0.0
                        };
                        (weight > 0.0).then_some((k, weight))
                    })
                    .collect()
            })
            .collect();

        Self { filters }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filter energies of one power spectrum
    pub fn apply(&self, power: &[f64]) -> Vec<f64> {
        self.filters
            .iter()
            .map(|filter| filter.iter().map(|&(k, w)| power[k] * w).sum())
            .collect()
    }
}

/// HTK mel scale
pub fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10f64.powf(mel / 2595.0) - 1.0)
}

/// Orthonormal DCT-II, first `n_out` coefficients
pub fn dct_ortho(input: &[f64], n_out: usize) -> Vec<f64> {
    let n = input.len() as f64;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            let sum: f64 = input
                .iter()
                .enumerate()
                .map(|(i, &x)| {
                    x * (std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos()
                })
                .sum();
            scale * sum
        })
        .collect()
}

/// Per-frame MFCC matrix (`N_MFCC` coefficients per frame)
pub fn mfcc(spec: &Spectrogram) -> Vec<Vec<f64>> {
    let filterbank = MelFilterbank::new(N_MELS, &spec.bin_frequencies(), spec.sample_rate());
    spec.frames()
        .iter()
        .map(|frame| {
            let power: Vec<f64> = frame.iter().map(|&m| (m as f64) * (m as f64)).collect();
            let log_mel: Vec<f64> = filterbank
                .apply(&power)
                .into_iter()
                .map(|e| 10.0 * e.max(POWER_FLOOR).log10())
                .collect();
            dct_ortho(&log_mel, N_MFCC)
        })
        .collect()
}

/// Mean and population standard deviation of coefficients 1..=12
pub fn mfcc_statistics(spec: &Spectrogram) -> Result<(f64, f64), FeatureError> {
    if spec.frames().iter().all(|frame| frame.iter().all(|&m| m == 0.0)) {
        return Err(FeatureError::Degenerate("no spectral energy".to_string()));
    }
    let coefficients = mfcc(spec);
    mean_std(coefficients.iter().flat_map(|frame| frame[1..].iter().copied()))
        .ok_or_else(|| FeatureError::InsufficientSignal("no MFCC frames".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::fft::{HOP_LENGTH, N_FFT};

    #[test]
    fn test_mel_scale_round_trip() {
        for hz in [0.0, 440.0, 1000.0, 8000.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
        assert!((hz_to_mel(1000.0) - 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_dct_of_constant_has_only_dc() {
        let out = dct_ortho(&[3.0; 40], N_MFCC);
        assert!((out[0] - 3.0 * 40f64.sqrt()).abs() < 1e-9);
        assert!(out[1..].iter().all(|c| c.abs() < 1e-9));
    }

    #[test]
    fn test_filterbank_has_no_empty_filters() {
        let freqs: Vec<f64> = (0..=N_FFT / 2)
            .map(|k| k as f64 * 22050.0 / N_FFT as f64)
            .collect();
        let bank = MelFilterbank::new(N_MELS, &freqs, 22050);
        assert_eq!(bank.len(), N_MELS);
        assert!(bank.filters.iter().all(|f| !f.is_empty()));
    }

    #[test]
    fn test_statistics_are_finite_for_noise() {
        // Deterministic pseudo-noise
        let mut state = 12345u32;
        let samples: Vec<f32> = (0..22050)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
                ((state >> 16) as f32 / 32768.0) - 1.0
            })
            .collect();
        let spec = Spectrogram::compute(&samples, 22050, N_FFT, HOP_LENGTH);
        let (mean, std) = mfcc_statistics(&spec).unwrap();
        assert!(mean.is_finite());
        assert!(std.is_finite() && std >= 0.0);
    }

    #[test]
    fn test_silence_is_degenerate() {
        let spec = Spectrogram::compute(&[0.0; 4096], 22050, N_FFT, HOP_LENGTH);
        assert!(mfcc_statistics(&spec).is_err());
    }
}
