//! Decoder strategy descriptors
//!
//! The extraction chain is data: an ordered list of strategies taken from
//! configuration. The byte heuristic is not a strategy; it always runs last.

use crate::audio::{DecodeMode, ResampleQuality};
use emo_common::ExtractionMethod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One decoding attempt in the extraction chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStrategy {
    /// Declared extension as probe hint, strict decoding, sinc resampling
    Direct,
    /// External conversion to WAV, for streaming containers only
    Converted,
    /// Sniffed extension as probe hint, lenient decoding, fast resampling
    Alternate,
}

impl DecodeStrategy {
    /// Default chain order
    pub const DEFAULT_CHAIN: [DecodeStrategy; 3] = [
        DecodeStrategy::Direct,
        DecodeStrategy::Converted,
        DecodeStrategy::Alternate,
    ];

    /// Provenance tag for vectors produced by this strategy
    pub fn method(&self) -> ExtractionMethod {
        match self {
            DecodeStrategy::Direct => ExtractionMethod::DirectDecode,
            DecodeStrategy::Converted => ExtractionMethod::ConvertedDecode,
            DecodeStrategy::Alternate => ExtractionMethod::AlternateDecode,
        }
    }

    /// Packet error handling used by this strategy
    pub fn decode_mode(&self) -> DecodeMode {
        match self {
            DecodeStrategy::Direct | DecodeStrategy::Converted => DecodeMode::Strict,
            DecodeStrategy::Alternate => DecodeMode::Lenient,
        }
    }

    pub fn resample_quality(&self) -> ResampleQuality {
        match self {
            DecodeStrategy::Direct | DecodeStrategy::Converted => ResampleQuality::Sinc,
            DecodeStrategy::Alternate => ResampleQuality::Fast,
        }
    }
}

impl fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method().as_str())
    }
}

/// Lower-cased extension of a declared filename (untrusted)
///
/// `"clip.WEBM"` → `webm`, `".ogg"` → `ogg`, `"recording"` → `None`.
pub fn declared_extension(filename: &str) -> Option<String> {
    let name = Path::new(filename).file_name()?.to_str()?;
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_extension() {
        assert_eq!(declared_extension("clip.WEBM").as_deref(), Some("webm"));
        assert_eq!(declared_extension("/uploads/a.b.mp3").as_deref(), Some("mp3"));
        assert_eq!(declared_extension(".ogg").as_deref(), Some("ogg"));
        assert_eq!(declared_extension("recording"), None);
        assert_eq!(declared_extension("trailing."), None);
        assert_eq!(declared_extension(""), None);
    }

    #[test]
    fn test_strategy_properties() {
        assert_eq!(DecodeStrategy::Direct.method(), ExtractionMethod::DirectDecode);
        assert_eq!(DecodeStrategy::Alternate.decode_mode(), DecodeMode::Lenient);
        assert_eq!(DecodeStrategy::Converted.resample_quality(), ResampleQuality::Sinc);
        assert_eq!(DecodeStrategy::Converted.to_string(), "converted_decode");
    }

    #[test]
    fn test_chain_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Chain {
            strategies: Vec<DecodeStrategy>,
        }
        let chain: Chain = toml::from_str("strategies = [\"alternate\", \"direct\"]").unwrap();
        assert_eq!(
            chain.strategies,
            vec![DecodeStrategy::Alternate, DecodeStrategy::Direct]
        );
    }
}
