//! Emotion scorer
//!
//! Pure function of a [`FeatureVector`]: no hidden state, no randomness. The
//! same vector always yields the same scores, label and confidence.

pub mod confidence;
pub mod rules;

pub use confidence::{CalibrationBand, ConfidenceCalibration};
pub use rules::{Direction, NeutralBand, RuleTable, ScoringRule};

use emo_common::{Emotion, EmotionScoreTable, FeatureVector};

/// Result of scoring one feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub emotion: Emotion,
    pub confidence: u8,
    pub scores: EmotionScoreTable,
}

/// Rule-based emotion scorer
#[derive(Debug, Clone, Default)]
pub struct EmotionScorer {
    rules: RuleTable,
    calibration: ConfidenceCalibration,
}

impl EmotionScorer {
    pub fn new(rules: RuleTable, calibration: ConfidenceCalibration) -> Self {
        Self { rules, calibration }
    }

    /// Per-emotion scores, before selection
    ///
    /// Non-Neutral scores are damped linearly for clips shorter than the
    /// damping window; Neutral is never damped.
    pub fn score_table(&self, features: &FeatureVector) -> EmotionScoreTable {
        let mut scores = EmotionScoreTable::zeroed();
        scores.set(Emotion::Neutral, self.rules.neutral_base);

        for rule in &self.rules.rules {
            scores.add(rule.emotion, rule.contribution(features.get(rule.feature)));
        }

        for band in &self.rules.neutral_bands {
            if band.contains(features.get(band.feature)) {
                scores.add(Emotion::Neutral, band.bonus);
            }
        }

        let factor = (features.duration() / self.rules.damping_window_secs).clamp(0.0, 1.0);
        for emotion in Emotion::ALL {
            if emotion != Emotion::Neutral {
                scores.scale(emotion, factor);
            }
        }

        scores
    }

    /// Score a feature vector: table, dominant label, calibrated confidence
    pub fn score(&self, features: &FeatureVector) -> ScoreOutcome {
        let scores = self.score_table(features);
        ScoreOutcome {
            emotion: scores.dominant(),
            confidence: self
                .calibration
                .confidence(&scores, features.extraction_method()),
            scores,
        }
    }
}
