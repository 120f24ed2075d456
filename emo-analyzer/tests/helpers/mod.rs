//! Test Helper Utilities
//!
//! Shared utilities for testing emo-analyzer

#![allow(dead_code)]

pub mod audio_generator;
pub mod fakes;

pub use audio_generator::{
    float_wav_bytes, garbage_bytes, silent_wav_bytes, wav_bytes, AudioConfig,
};
pub use fakes::{FailingTranscoder, RecordingObserver, WavTranscoder};
