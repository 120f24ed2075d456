//! Analysis result assembly

use crate::scoring::ScoreOutcome;
use emo_common::{AnalysisResult, FeatureName, FeatureVector};

/// Combine a feature vector and its score outcome into the boundary result
pub fn assemble(features: &FeatureVector, outcome: ScoreOutcome) -> AnalysisResult {
    AnalysisResult {
        emotion: outcome.emotion,
        confidence: outcome.confidence,
        scores: outcome.scores,
        features_analyzed: FeatureName::COUNT,
        duration: features.duration(),
        extraction_method: features.extraction_method(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::EmotionScorer;
    use emo_common::{Emotion, ExtractionMethod, FeatureDefaults};

    #[test]
    fn test_copies_provenance_and_duration() {
        let features = FeatureVector::defaults(
            ExtractionMethod::AlternateDecode,
            &FeatureDefaults::default(),
        )
        .with(FeatureName::Duration, 7.5);
        let outcome = EmotionScorer::default().score(&features);
        let result = assemble(&features, outcome.clone());

        assert_eq!(result.features_analyzed, 14);
        assert_eq!(result.duration, 7.5);
        assert_eq!(result.extraction_method, ExtractionMethod::AlternateDecode);
        assert_eq!(result.emotion, outcome.emotion);
        assert_eq!(result.scores.iter().count(), Emotion::ALL.len());
    }
}
