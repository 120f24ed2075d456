//! Error types for emo-analyzer
//!
//! Only [`AnalysisError`] crosses the public boundary. Decoder, converter and
//! per-feature errors are absorbed inside the extraction chain.

use thiserror::Error;

/// Fatal analysis failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The submitted payload has zero length
    #[error("Empty input: no audio bytes submitted")]
    EmptyInput,
}

/// Decoder strategy failure
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Container probing failed (unknown or corrupt format)
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// No decodable audio track in the container
    #[error("No audio track found")]
    NoAudioTrack,

    /// Codec could not be instantiated or failed on a packet
    #[error("Decode failed: {0}")]
    Codec(String),

    /// Decoding succeeded but produced nothing usable
    #[error("Unusable PCM: {0}")]
    Unusable(String),

    /// Resampler construction or processing failed
    #[error("Resampling failed: {0}")]
    Resample(String),

    /// Blocking decode task panicked or was cancelled
    #[error("Decode task aborted: {0}")]
    Aborted(String),
}

/// Per-feature computation failure (absorbed, default substituted)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// Not enough frames or samples for this feature
    #[error("Insufficient signal: {0}")]
    InsufficientSignal(String),

    /// The signal carries no information for this feature (e.g. silence)
    #[error("Degenerate signal: {0}")]
    Degenerate(String),
}

/// Why one strategy in the extraction chain failed
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transcode(#[from] crate::transcoder::TranscodeError),

    /// Scoped working directory or intermediate file I/O
    #[error("Working file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for decoder strategies
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
