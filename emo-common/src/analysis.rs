//! Analysis result returned at the external boundary

use crate::emotion::{Emotion, EmotionScoreTable};
use crate::features::ExtractionMethod;
use serde::{Deserialize, Serialize};

/// Outcome of one emotion analysis request
///
/// Created once per request and never mutated. The transport layer serializes
/// it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Dominant emotion
    pub emotion: Emotion,
    /// Calibrated confidence, integer percent
    pub confidence: u8,
    /// Score for every emotion
    pub scores: EmotionScoreTable,
    /// Number of features the scorer saw
    pub features_analyzed: usize,
    /// Analysed duration in seconds
    pub duration: f64,
    /// Which extraction step produced the features
    pub extraction_method: ExtractionMethod,
}
