//! Confidence calibration
//!
//! Confidence grows with the margin between the two best scores and is
//! clamped to a per-provenance range: vectors synthesized from raw bytes never
//! claim the confidence of decoded audio.

use emo_common::{EmotionScoreTable, ExtractionMethod};
use serde::{Deserialize, Serialize};

/// Base value and clamp range for one provenance class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBand {
    pub base: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl CalibrationBand {
    pub fn new(base: f64, floor: f64, ceiling: f64) -> Self {
        Self {
            base,
            floor,
            ceiling,
        }
    }
}

/// Confidence calibration constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceCalibration {
    /// Vectors computed from decoded PCM
    pub acoustic: CalibrationBand,
    /// Vectors synthesized by the byte heuristic
    pub heuristic: CalibrationBand,
    /// Multiplier on the top-two score margin
    pub margin_weight: f64,
}

impl Default for ConfidenceCalibration {
    fn default() -> Self {
        Self {
            acoustic: CalibrationBand::new(70.0, 65.0, 95.0),
            heuristic: CalibrationBand::new(60.0, 60.0, 85.0),
            margin_weight: 2.0,
        }
    }
}

impl ConfidenceCalibration {
    /// Band applying to a provenance tag
    pub fn band_for(&self, method: ExtractionMethod) -> CalibrationBand {
        if method.is_acoustic() {
            self.acoustic
        } else {
            self.heuristic
        }
    }

    /// Integer confidence percentage for a score table
    ///
    /// `raw = base + margin_weight · (top1 − top2)` when the runner-up scored,
    /// otherwise `base + top1`; clamped to the band and floored.
    pub fn confidence(&self, scores: &EmotionScoreTable, method: ExtractionMethod) -> u8 {
        let band = self.band_for(method);
        let (top1, top2) = scores.top_two();

        let raw = if top2 > 0.0 {
            band.base + self.margin_weight * (top1 - top2)
        } else {
            band.base + top1
        };

        let clamped = if raw.is_finite() {
            raw.clamp(band.floor, band.ceiling)
        } else {
            band.floor
        };
        clamped.floor().clamp(0.0, 100.0) as u8
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, band) in [("acoustic", self.acoustic), ("heuristic", self.heuristic)] {
            let finite = band.base.is_finite() && band.floor.is_finite() && band.ceiling.is_finite();
            if !finite || band.floor > band.ceiling || band.floor < 0.0 || band.ceiling > 100.0 {
                return Err(format!(
                    "{} calibration needs 0 <= floor <= ceiling <= 100",
                    name
                ));
            }
        }
        if !self.margin_weight.is_finite() || self.margin_weight < 0.0 {
            return Err("margin_weight must be non-negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emo_common::Emotion;

    fn table(values: &[(Emotion, f64)]) -> EmotionScoreTable {
        let mut table = EmotionScoreTable::zeroed();
        for &(emotion, score) in values {
            table.set(emotion, score);
        }
        table
    }

    #[test]
    fn test_margin_formula() {
        let calibration = ConfidenceCalibration::default();
        let scores = table(&[(Emotion::Joy, 14.0), (Emotion::Neutral, 10.0)]);
        assert_eq!(calibration.confidence(&scores, ExtractionMethod::DirectDecode), 78);
    }

    #[test]
    fn test_lone_score_formula() {
        let calibration = ConfidenceCalibration::default();
        let scores = table(&[(Emotion::Neutral, 10.0)]);
        assert_eq!(calibration.confidence(&scores, ExtractionMethod::DirectDecode), 80);
        assert_eq!(calibration.confidence(&scores, ExtractionMethod::ByteHeuristic), 70);
    }

    #[test]
    fn test_clamped_to_band() {
        let calibration = ConfidenceCalibration::default();
        let big = table(&[(Emotion::Anger, 500.0), (Emotion::Neutral, 10.0)]);
        assert_eq!(calibration.confidence(&big, ExtractionMethod::AlternateDecode), 95);
        assert_eq!(calibration.confidence(&big, ExtractionMethod::ByteHeuristic), 85);

        let tie = table(&[(Emotion::Joy, 10.0), (Emotion::Neutral, 10.0)]);
        assert_eq!(calibration.confidence(&tie, ExtractionMethod::ByteHeuristic), 60);
        assert_eq!(calibration.confidence(&tie, ExtractionMethod::DirectDecode), 70);
    }

    #[test]
    fn test_floor_above_ceiling_rejected() {
        let mut calibration = ConfidenceCalibration::default();
        calibration.heuristic.floor = 90.0;
        assert!(calibration.validate().is_err());
    }
}
