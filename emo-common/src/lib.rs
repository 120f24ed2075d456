//! # EMO Common Library
//!
//! Shared code for the emo workspace:
//! - Emotion labels and score tables
//! - Feature vector and extraction provenance types
//! - Analysis result type returned at the external boundary
//! - Analysis event types and the broadcast EventBus
//! - Configuration file resolution and logging configuration

pub mod analysis;
pub mod config;
pub mod emotion;
pub mod error;
pub mod events;
pub mod features;

pub use analysis::AnalysisResult;
pub use emotion::{Emotion, EmotionScoreTable};
pub use error::{Error, Result};
pub use features::{ExtractionMethod, FeatureDefaults, FeatureName, FeatureVector};
