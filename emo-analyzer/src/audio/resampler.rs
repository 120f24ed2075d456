//! Mono resampling using rubato
//!
//! Two qualities: a windowed-sinc resampler for the primary decode path and a
//! polynomial resampler for the lenient fallback path.

use crate::error::{DecodeError, DecodeResult};
use rubato::{
    FastFixedIn, PolynomialDegree, Resampler as RubatoResampler, SincFixedIn,
    SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use serde::{Deserialize, Serialize};

/// Resampler quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleQuality {
    /// Sinc interpolation, BlackmanHarris2 window
    Sinc,
    /// Cubic polynomial interpolation
    Fast,
}

/// Mono sample-rate converter
pub struct Resampler;

impl Resampler {
    /// Resample mono audio to `output_rate`
    ///
    /// # Arguments
    /// - `input`: Mono samples
    /// - `input_rate`: Input sample rate
    /// - `output_rate`: Target sample rate
    /// - `quality`: Interpolation quality
    ///
    /// # Notes
    /// If the rates match or the input is empty, returns a copy without
    /// resampling.
    pub fn resample(
        input: &[f32],
        input_rate: u32,
        output_rate: u32,
        quality: ResampleQuality,
    ) -> DecodeResult<Vec<f32>> {
        if input_rate == 0 || output_rate == 0 {
            return Err(DecodeError::Resample(format!(
                "invalid rates {} -> {}",
                input_rate, output_rate
            )));
        }
        if input_rate == output_rate || input.is_empty() {
            return Ok(input.to_vec());
        }

        let ratio = output_rate as f64 / input_rate as f64;
        let planar_input = vec![input.to_vec()];

        let mut planar_output = match quality {
            ResampleQuality::Sinc => {
                let mut resampler = Self::create_sinc_resampler(ratio, input.len())?;
                resampler
                    .process(&planar_input, None)
                    .map_err(|e| DecodeError::Resample(e.to_string()))?
            }
            ResampleQuality::Fast => {
                let mut resampler = Self::create_fast_resampler(ratio, input.len())?;
                resampler
                    .process(&planar_input, None)
                    .map_err(|e| DecodeError::Resample(e.to_string()))?
            }
        };

        Ok(planar_output.pop().unwrap_or_default())
    }

    fn create_sinc_resampler(ratio: f64, chunk_size: usize) -> DecodeResult<SincFixedIn<f32>> {
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        SincFixedIn::<f32>::new(ratio, 1.0, params, chunk_size, 1)
            .map_err(|e| DecodeError::Resample(format!("Failed to create sinc resampler: {}", e)))
    }

    fn create_fast_resampler(ratio: f64, chunk_size: usize) -> DecodeResult<FastFixedIn<f32>> {
        FastFixedIn::<f32>::new(ratio, 1.0, PolynomialDegree::Cubic, chunk_size, 1)
            .map_err(|e| DecodeError::Resample(format!("Failed to create resampler: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(rate: u32, seconds: f32, freq: f32) -> Vec<f32> {
        let n = (rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_same_rate_is_copy() {
        let input = vec![0.1, 0.2, 0.3];
        let output = Resampler::resample(&input, 22050, 22050, ResampleQuality::Sinc).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_sinc_downsample_length() {
        let input = sine(44100, 1.0, 440.0);
        let output = Resampler::resample(&input, 44100, 22050, ResampleQuality::Sinc).unwrap();
        // Expect ~half the samples (allow for filter delay)
        assert!(output.len() > 10_000 && output.len() <= 11_100, "len {}", output.len());
        assert!(output.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_fast_upsample_length() {
        let input = sine(16000, 0.5, 220.0);
        let output = Resampler::resample(&input, 16000, 22050, ResampleQuality::Fast).unwrap();
        assert!(output.len() > 10_000 && output.len() <= 11_100, "len {}", output.len());
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(Resampler::resample(&[0.1], 0, 22050, ResampleQuality::Fast).is_err());
    }
}
