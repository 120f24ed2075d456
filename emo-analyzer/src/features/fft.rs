//! Short-time Fourier transform
//!
//! Frames the signal with a Hann window and keeps the magnitude spectrum of
//! the positive frequencies. All spectral features share one spectrogram.

use rustfft::{num_complex::Complex, FftPlanner};

/// FFT window size
pub const N_FFT: usize = 2048;

/// Hop between successive frames
pub const HOP_LENGTH: usize = 512;

/// Sample ranges `[start, end)` of each analysis frame
///
/// A signal shorter than one window yields a single (short) frame.
pub fn frame_ranges(len: usize, n_fft: usize, hop: usize) -> Vec<(usize, usize)> {
    if len == 0 || n_fft == 0 || hop == 0 {
        return Vec::new();
    }
    if len <= n_fft {
        return vec![(0, len)];
    }
    let count = 1 + (len - n_fft) / hop;
    (0..count).map(|i| (i * hop, i * hop + n_fft)).collect()
}

/// Magnitude spectrogram
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// One magnitude spectrum (`n_fft / 2 + 1` bins) per frame
    frames: Vec<Vec<f32>>,
    n_fft: usize,
    hop_length: usize,
    sample_rate: u32,
}

impl Spectrogram {
    /// Compute the spectrogram of a mono signal
    ///
    /// Short frames are zero-padded to `n_fft`.
    pub fn compute(samples: &[f32], sample_rate: u32, n_fft: usize, hop_length: usize) -> Self {
        let window = hann_window(n_fft);
        let fft = FftPlanner::<f32>::new().plan_fft_forward(n_fft);
        let bins = n_fft / 2 + 1;

        let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); n_fft];
        let frames: Vec<Vec<f32>> = frame_ranges(samples.len(), n_fft, hop_length)
            .into_iter()
            .map(|(start, end)| {
                for (i, slot) in buffer.iter_mut().enumerate() {
                    let sample = if start + i < end { samples[start + i] } else { 0.0 };
                    *slot = Complex::new(sample * window[i], 0.0);
                }
                fft.process(&mut buffer);
                buffer[..bins].iter().map(|c| c.norm()).collect::<Vec<f32>>()
            })
            .collect();

        Self {
            frames,
            n_fft,
            hop_length,
            sample_rate,
        }
    }

    pub fn frames(&self) -> &[Vec<f32>] {
        &self.frames
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn num_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f64 {
        self.sample_rate as f64 / self.hop_length as f64
    }

    /// Center frequency of bin `k` in Hz
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.sample_rate as f64 / self.n_fft as f64
    }

    /// Center frequencies of every bin
    pub fn bin_frequencies(&self) -> Vec<f64> {
        (0..self.num_bins()).map(|k| self.bin_frequency(k)).collect()
    }
}

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 * (1.0 - ((2.0 * std::f32::consts::PI * i as f32) / size as f32).cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_ranges() {
        assert!(frame_ranges(0, 2048, 512).is_empty());
        assert_eq!(frame_ranges(100, 2048, 512), vec![(0, 100)]);
        assert_eq!(frame_ranges(2048, 2048, 512), vec![(0, 2048)]);

        let ranges = frame_ranges(4096, 2048, 512);
        assert_eq!(ranges.len(), 5);
        assert_eq!(ranges[4], (2048, 4096));
    }

    #[test]
    fn test_sine_peak_bin() {
        let sr = 22050;
        let freq = 1000.0f64;
        let samples: Vec<f32> = (0..sr)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sr as f64).sin() as f32)
            .collect();

        let spec = Spectrogram::compute(&samples, sr as u32, N_FFT, HOP_LENGTH);
        assert_eq!(spec.num_bins(), 1025);

        let frame = &spec.frames()[spec.num_frames() / 2];
        let peak_bin = frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(k, _)| k)
            .unwrap();
        let peak_freq = spec.bin_frequency(peak_bin);
        assert!((peak_freq - 1000.0).abs() < 15.0, "peak at {}", peak_freq);
    }

    #[test]
    fn test_short_signal_single_frame() {
        let spec = Spectrogram::compute(&[0.5; 300], 22050, N_FFT, HOP_LENGTH);
        assert_eq!(spec.num_frames(), 1);
        assert!(spec.frames()[0].iter().all(|m| m.is_finite()));
    }

    #[test]
    fn test_hann_window_endpoints() {
        let window = hann_window(8);
        assert_eq!(window[0], 0.0);
        assert!((window[4] - 1.0).abs() < 1e-6);
    }
}
