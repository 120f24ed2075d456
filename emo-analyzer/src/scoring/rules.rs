//! Scoring rule table
//!
//! Every coefficient the scorer uses lives here as data, so the table can be
//! loaded from configuration and inspected in tests.

use emo_common::{Emotion, FeatureName};
use serde::{Deserialize, Serialize};

/// Which side of the threshold a rule rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Above,
    Below,
}

/// Linear threshold rule: `slope · distance past threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub emotion: Emotion,
    pub feature: FeatureName,
    pub direction: Direction,
    pub threshold: f64,
    pub slope: f64,
}

impl ScoringRule {
    pub fn new(
        emotion: Emotion,
        feature: FeatureName,
        direction: Direction,
        threshold: f64,
        slope: f64,
    ) -> Self {
        Self {
            emotion,
            feature,
            direction,
            threshold,
            slope,
        }
    }

    /// Contribution of a feature value (zero on the wrong side of the threshold)
    pub fn contribution(&self, value: f64) -> f64 {
        let distance = match self.direction {
            Direction::Above => value - self.threshold,
            Direction::Below => self.threshold - value,
        };
        if distance > 0.0 {
            self.slope * distance
        } else {
            0.0
        }
    }
}

/// Fixed Neutral bonus for a feature inside `[low, high]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralBand {
    pub feature: FeatureName,
    pub low: f64,
    pub high: f64,
    pub bonus: f64,
}

impl NeutralBand {
    pub fn new(feature: FeatureName, low: f64, high: f64, bonus: f64) -> Self {
        Self {
            feature,
            low,
            high,
            bonus,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Complete rule table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTable {
    /// Neutral score before any rule fires (strictly positive)
    pub neutral_base: f64,

    /// Clip length (seconds) at which non-Neutral scores reach full weight
    pub damping_window_secs: f64,

    pub rules: Vec<ScoringRule>,

    pub neutral_bands: Vec<NeutralBand>,
}

impl Default for RuleTable {
    fn default() -> Self {
        use Direction::{Above, Below};
        use Emotion::{Anger, Anxiety, Joy, Sadness};
        use FeatureName::*;

        Self {
            neutral_base: 10.0,
            damping_window_secs: 10.0,
            rules: vec![
                ScoringRule::new(Joy, Tempo, Above, 120.0, 0.5),
                ScoringRule::new(Joy, SpectralCentroid, Above, 2000.0, 0.01),
                ScoringRule::new(Joy, RmsEnergy, Above, 0.15, 100.0),
                ScoringRule::new(Joy, ChromaMean, Above, 0.6, 50.0),
                ScoringRule::new(Sadness, Tempo, Below, 90.0, 0.5),
                ScoringRule::new(Sadness, SpectralCentroid, Below, 1200.0, 0.02),
                ScoringRule::new(Sadness, RmsEnergy, Below, 0.08, 200.0),
                ScoringRule::new(Sadness, MfccMean, Below, -10.0, 1.0),
                ScoringRule::new(Anxiety, ZeroCrossingRate, Above, 0.08, 500.0),
                ScoringRule::new(Anxiety, MfccStd, Above, 15.0, 0.5),
                ScoringRule::new(Anxiety, SpectralRolloff, Above, 3000.0, 0.01),
                ScoringRule::new(Anxiety, Tempo, Above, 130.0, 0.25),
                ScoringRule::new(Anger, Tempo, Above, 140.0, 1.0 / 3.0),
                ScoringRule::new(Anger, RmsEnergy, Above, 0.2, 150.0),
                ScoringRule::new(Anger, SpectralContrast, Above, 20.0, 1.0),
                ScoringRule::new(Anger, ZeroCrossingRate, Above, 0.1, 300.0),
                ScoringRule::new(Anger, AudioStd, Above, 0.15, 50.0),
                ScoringRule::new(Anxiety, AudioStd, Above, 0.15, 40.0),
                ScoringRule::new(Sadness, AudioStd, Below, 0.05, 160.0),
            ],
            neutral_bands: vec![
                NeutralBand::new(Tempo, 90.0, 130.0, 15.0),
                NeutralBand::new(RmsEnergy, 0.08, 0.15, 10.0),
                NeutralBand::new(SpectralCentroid, 1200.0, 2000.0, 8.0),
                NeutralBand::new(ZeroCrossingRate, 0.04, 0.08, 5.0),
                NeutralBand::new(AudioStd, 0.0, 0.05, 6.0),
            ],
        }
    }
}

impl RuleTable {
    /// Check that the table can only ever yield finite, non-negative scores
    pub fn validate(&self) -> Result<(), String> {
        if !(self.neutral_base.is_finite() && self.neutral_base > 0.0) {
            return Err(format!(
                "neutral_base must be positive, got {}",
                self.neutral_base
            ));
        }
        if !(self.damping_window_secs.is_finite() && self.damping_window_secs > 0.0) {
            return Err(format!(
                "damping_window_secs must be positive, got {}",
                self.damping_window_secs
            ));
        }
        for rule in &self.rules {
            if !rule.threshold.is_finite() || !rule.slope.is_finite() || rule.slope < 0.0 {
                return Err(format!(
                    "rule {}/{} needs a finite threshold and a non-negative slope",
                    rule.emotion, rule.feature
                ));
            }
        }
        for band in &self.neutral_bands {
            if !(band.low.is_finite() && band.high.is_finite() && band.low <= band.high) {
                return Err(format!("neutral band on {} has invalid bounds", band.feature));
            }
            if !band.bonus.is_finite() || band.bonus < 0.0 {
                return Err(format!(
                    "neutral band on {} needs a non-negative bonus",
                    band.feature
                ));
            }
        }
        Ok(())
    }
}
