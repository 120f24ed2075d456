//! Byte-heuristic feature synthesis
//!
//! Last-resort feature vector built only from the payload size and the
//! distinct byte values in its header. Deterministic: identical bytes always
//! give an identical vector. No audio is decoded.

use emo_common::{ExtractionMethod, FeatureDefaults, FeatureName, FeatureVector};

/// Bytes per second assumed when estimating duration (22.05 kHz, 16-bit mono ×2)
pub const BYTES_PER_SECOND: f64 = 88_200.0;

/// Summary of the raw payload the synthesis is based on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ByteProfile {
    /// Payload size in bytes
    pub size: usize,
    /// `(distinct header byte values − 1) / 256`, in `[0, 1)`
    pub diversity: f64,
}

impl ByteProfile {
    /// Profile a non-empty payload using its first `header_window` bytes
    pub fn of(bytes: &[u8], header_window: usize) -> Self {
        let header = &bytes[..bytes.len().min(header_window.max(1))];
        let mut seen = [false; 256];
        for &b in header {
            seen[b as usize] = true;
        }
        let distinct = seen.iter().filter(|&&s| s).count();

        Self {
            size: bytes.len(),
            diversity: distinct.saturating_sub(1) as f64 / 256.0,
        }
    }
}

/// Synthesize a complete feature vector from a byte profile
///
/// # Arguments
/// * `profile` - Size and header diversity of the payload
/// * `max_duration_secs` - Duration cap applied to the size-based estimate
/// * `defaults` - Substitution table (only used if arithmetic is non-finite)
pub fn synthesize(
    profile: &ByteProfile,
    max_duration_secs: f64,
    defaults: &FeatureDefaults,
) -> FeatureVector {
    let n = profile.size as f64;
    let diversity = profile.diversity;
    let complexity = n / 1024.0;

    FeatureVector::from_fn(ExtractionMethod::ByteHeuristic, defaults, |name| match name {
        FeatureName::MfccMean => (diversity - 0.5) * 20.0,
        FeatureName::MfccStd => diversity * 15.0,
        FeatureName::SpectralCentroid => 1000.0 + complexity % 1000.0,
        FeatureName::SpectralRolloff => 1500.0 + complexity % 1500.0,
        FeatureName::SpectralBandwidth => 800.0 + complexity % 700.0,
        FeatureName::SpectralContrast => 10.0 + diversity * 10.0,
        FeatureName::ZeroCrossingRate => 0.03 + diversity * 0.05,
        FeatureName::RmsEnergy => 0.05 + (complexity % 100.0) / 1000.0,
        FeatureName::Tempo => 80.0 + (profile.size % 80) as f64,
        FeatureName::ChromaMean => 0.3 + diversity * 0.4,
        FeatureName::ChromaStd => 0.1 + diversity * 0.1,
        FeatureName::AudioStd => 0.05 + diversity * 0.1,
        FeatureName::AudioMax => 0.5 + diversity * 0.5,
        FeatureName::Duration => (n / BYTES_PER_SECOND).min(max_duration_secs),
    })
}
