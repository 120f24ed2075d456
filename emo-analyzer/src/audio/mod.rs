//! Audio decoding, downmixing and resampling

pub mod buffer;
pub mod decoder;
pub mod resampler;

pub use buffer::AudioBuffer;
pub use decoder::{decode, DecodeMode, DecodeOptions};
pub use resampler::{ResampleQuality, Resampler};
