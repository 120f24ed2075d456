//! Normalized mono PCM buffer

use crate::error::{DecodeError, DecodeResult};

/// Mono PCM at the analysis sample rate
///
/// Invariants: non-empty, every sample finite, peak amplitude 1.0 unless the
/// source was silent.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    /// Peak amplitude before normalization
    peak: f64,
}

impl AudioBuffer {
    /// Validate and peak-normalize decoded samples
    ///
    /// # Errors
    /// `DecodeError::Unusable` for an empty buffer, a zero sample rate, or
    /// any non-finite sample.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32) -> DecodeResult<Self> {
        if sample_rate == 0 {
            return Err(DecodeError::Unusable("sample rate is zero".to_string()));
        }
        if samples.is_empty() {
            return Err(DecodeError::Unusable("zero samples decoded".to_string()));
        }
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(DecodeError::Unusable(format!(
                "non-finite sample at index {}",
                pos
            )));
        }

        // Divide in f64: a subnormal f32 peak has no finite f32 reciprocal
        let peak = samples.iter().fold(0.0f64, |acc, &s| acc.max(f64::from(s).abs()));
        if peak > 0.0 {
            for s in samples.iter_mut() {
                *s = (f64::from(*s) / peak) as f32;
            }
            if samples.iter().any(|s| !s.is_finite()) {
                return Err(DecodeError::Unusable(format!(
                    "normalization by peak {:e} produced non-finite samples",
                    peak
                )));
            }
        }

        Ok(Self {
            samples,
            sample_rate,
            peak,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Full-scale peak amplitude of the decoded audio (0.0 for silence)
    pub fn peak(&self) -> f64 {
        self.peak
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed buffer
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_normalization() {
        let buffer = AudioBuffer::new(vec![0.1, -0.25, 0.05], 22050).unwrap();
        let peak = buffer.samples().iter().fold(0.0f32, |a, s| a.max(s.abs()));
        assert!((peak - 1.0).abs() < 1e-6);
        assert!((buffer.samples()[0] - 0.4).abs() < 1e-6);
        assert_eq!(buffer.peak(), 0.25);
    }

    #[test]
    fn test_silence_is_kept_unscaled() {
        let buffer = AudioBuffer::new(vec![0.0; 100], 22050).unwrap();
        assert!(buffer.samples().iter().all(|&s| s == 0.0));
        assert_eq!(buffer.peak(), 0.0);
        assert_eq!(buffer.len(), 100);
    }

    #[test]
    fn test_rejects_unusable_input() {
        assert!(AudioBuffer::new(Vec::new(), 22050).is_err());
        assert!(AudioBuffer::new(vec![0.1, f32::NAN], 22050).is_err());
        assert!(AudioBuffer::new(vec![0.1], 0).is_err());
    }

    #[test]
    fn test_subnormal_peak_normalizes_to_finite_samples() {
        let buffer = AudioBuffer::new(vec![1e-40, 0.0, -1e-40, 5e-41], 22050).unwrap();
        let samples = buffer.samples();

        assert!(samples.iter().all(|s| s.is_finite()));
        assert_eq!(samples[1], 0.0);
        assert!((samples[0] - 1.0).abs() < 1e-3);
        assert!((samples[2] + 1.0).abs() < 1e-3);
        assert!((samples[3] - 0.5).abs() < 1e-2);
    }

    #[test]
    fn test_smallest_subnormal_peak() {
        let tiny = f32::from_bits(1);
        let buffer = AudioBuffer::new(vec![tiny, -tiny, 0.0], 22050).unwrap();
        assert_eq!(buffer.samples(), &[1.0, -1.0, 0.0]);
    }

    #[test]
    fn test_duration() {
        let buffer = AudioBuffer::new(vec![0.5; 44100], 22050).unwrap();
        assert_eq!(buffer.duration(), 2.0);
    }
}
