//! Feature vector types
//!
//! A [`FeatureVector`] always carries a value for every [`FeatureName`]: the
//! storage is a fixed array indexed by the closed name set, so a missing key is
//! unrepresentable. Failed computations are replaced from [`FeatureDefaults`].

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Which step of the extraction chain produced a feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Decoded straight from the submitted bytes
    DirectDecode,
    /// Decoded after transcoding through the external format converter
    ConvertedDecode,
    /// Decoded with lenient probing and fast resampling
    AlternateDecode,
    /// Synthesized from file size and header bytes, no audio decoded
    ByteHeuristic,
}

impl ExtractionMethod {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::DirectDecode => "direct_decode",
            ExtractionMethod::ConvertedDecode => "converted_decode",
            ExtractionMethod::AlternateDecode => "alternate_decode",
            ExtractionMethod::ByteHeuristic => "byte_heuristic",
        }
    }

    /// True when the vector was computed from decoded PCM audio
    pub fn is_acoustic(&self) -> bool {
        !matches!(self, ExtractionMethod::ByteHeuristic)
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of feature names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    MfccMean,
    MfccStd,
    SpectralCentroid,
    SpectralRolloff,
    SpectralBandwidth,
    SpectralContrast,
    ZeroCrossingRate,
    RmsEnergy,
    Tempo,
    ChromaMean,
    ChromaStd,
    AudioStd,
    AudioMax,
    Duration,
}

impl FeatureName {
    /// Number of features in the closed set
    pub const COUNT: usize = 14;

    /// All feature names in storage order
    pub const ALL: [FeatureName; FeatureName::COUNT] = [
        FeatureName::MfccMean,
        FeatureName::MfccStd,
        FeatureName::SpectralCentroid,
        FeatureName::SpectralRolloff,
        FeatureName::SpectralBandwidth,
        FeatureName::SpectralContrast,
        FeatureName::ZeroCrossingRate,
        FeatureName::RmsEnergy,
        FeatureName::Tempo,
        FeatureName::ChromaMean,
        FeatureName::ChromaStd,
        FeatureName::AudioStd,
        FeatureName::AudioMax,
        FeatureName::Duration,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::MfccMean => "mfcc_mean",
            FeatureName::MfccStd => "mfcc_std",
            FeatureName::SpectralCentroid => "spectral_centroid",
            FeatureName::SpectralRolloff => "spectral_rolloff",
            FeatureName::SpectralBandwidth => "spectral_bandwidth",
            FeatureName::SpectralContrast => "spectral_contrast",
            FeatureName::ZeroCrossingRate => "zero_crossing_rate",
            FeatureName::RmsEnergy => "rms_energy",
            FeatureName::Tempo => "tempo",
            FeatureName::ChromaMean => "chroma_mean",
            FeatureName::ChromaStd => "chroma_std",
            FeatureName::AudioStd => "audio_std",
            FeatureName::AudioMax => "audio_max",
            FeatureName::Duration => "duration",
        }
    }

    /// Storage index
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substitution table: the value used when a feature cannot be computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureDefaults {
    values: [f64; FeatureName::COUNT],
}

impl Default for FeatureDefaults {
    fn default() -> Self {
        let mut values = [0.0; FeatureName::COUNT];
        for name in FeatureName::ALL {
            values[name.index()] = match name {
                FeatureName::MfccMean => 0.0,
                FeatureName::MfccStd => 1.0,
                FeatureName::SpectralCentroid => 1500.0,
                FeatureName::SpectralRolloff => 2000.0,
                FeatureName::SpectralBandwidth => 1000.0,
                FeatureName::SpectralContrast => 10.0,
                FeatureName::ZeroCrossingRate => 0.05,
                FeatureName::RmsEnergy => 0.1,
                FeatureName::Tempo => 120.0,
                FeatureName::ChromaMean => 0.5,
                FeatureName::ChromaStd => 0.1,
                FeatureName::AudioStd => 0.1,
                FeatureName::AudioMax => 1.0,
                FeatureName::Duration => 0.0,
            };
        }
        Self { values }
    }
}

impl FeatureDefaults {
    /// Default value for one feature
    pub fn get(&self, name: FeatureName) -> f64 {
        self.values[name.index()]
    }

    /// Override one default (non-finite overrides are ignored)
    pub fn with(mut self, name: FeatureName, value: f64) -> Self {
        if value.is_finite() {
            self.values[name.index()] = value;
        }
        self
    }
}

/// Complete, immutable feature vector with provenance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FeatureName::COUNT],
    method: ExtractionMethod,
}

impl FeatureVector {
    /// Build a vector by asking `value_of` for every feature name
    ///
    /// Non-finite values are replaced from `defaults`, so the result always
    /// satisfies the "every key present and finite" invariant.
    pub fn from_fn<F>(method: ExtractionMethod, defaults: &FeatureDefaults, mut value_of: F) -> Self
    where
        F: FnMut(FeatureName) -> f64,
    {
        let mut values = [0.0; FeatureName::COUNT];
        for name in FeatureName::ALL {
            let value = value_of(name);
            values[name.index()] = if value.is_finite() {
                value
            } else {
                defaults.get(name)
            };
        }
        Self { values, method }
    }

    /// Vector holding only default values
    pub fn defaults(method: ExtractionMethod, defaults: &FeatureDefaults) -> Self {
        Self::from_fn(method, defaults, |name| defaults.get(name))
    }

    /// Value of one feature
    pub fn get(&self, name: FeatureName) -> f64 {
        self.values[name.index()]
    }

    /// Which extraction step produced this vector
    pub fn extraction_method(&self) -> ExtractionMethod {
        self.method
    }

    /// Analysed duration in seconds
    pub fn duration(&self) -> f64 {
        self.get(FeatureName::Duration)
    }

    /// Number of features carried (always the full closed set)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(name, value)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, f64)> + '_ {
        FeatureName::ALL.iter().map(move |&n| (n, self.get(n)))
    }

    /// True when every value is finite
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Copy of this vector with one value replaced (non-finite values ignored)
    pub fn with(mut self, name: FeatureName, value: f64) -> Self {
        if value.is_finite() {
            self.values[name.index()] = value;
        }
        self
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FeatureName::COUNT + 1))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name.as_str(), &value)?;
        }
        map.serialize_entry("extraction_method", &self.method)?;
        map.end()
    }
}
