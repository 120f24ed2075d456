//! Emotion labels and per-emotion score tables
//!
//! The label set is closed. Declaration order doubles as tie-break precedence:
//! when two emotions share the top score, the one declared first wins.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Emotion label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    Joy,
    Sadness,
    Anxiety,
    Anger,
    Neutral,
}

impl Emotion {
    /// Number of labels in the closed set
    pub const COUNT: usize = 5;

    /// All labels in precedence order
    pub const ALL: [Emotion; Emotion::COUNT] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anxiety,
        Emotion::Anger,
        Emotion::Neutral,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "Joy",
            Emotion::Sadness => "Sadness",
            Emotion::Anxiety => "Anxiety",
            Emotion::Anger => "Anger",
            Emotion::Neutral => "Neutral",
        }
    }

    /// Position in the precedence order (0 = highest precedence)
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-emotion score table
///
/// Every label always has a score. Serializes as a map in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "HashMap<Emotion, f64>")]
pub struct EmotionScoreTable {
    scores: [f64; Emotion::COUNT],
}

impl EmotionScoreTable {
    /// Table with every score set to zero
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Score for one emotion
    pub fn get(&self, emotion: Emotion) -> f64 {
        self.scores[emotion.index()]
    }

    /// Replace the score for one emotion
    pub fn set(&mut self, emotion: Emotion, score: f64) {
        self.scores[emotion.index()] = score;
    }

    /// Add to the score for one emotion
    pub fn add(&mut self, emotion: Emotion, amount: f64) {
        self.scores[emotion.index()] += amount;
    }

    /// Multiply the score for one emotion
    pub fn scale(&mut self, emotion: Emotion, factor: f64) {
        self.scores[emotion.index()] *= factor;
    }

    /// Iterate `(emotion, score)` pairs in precedence order
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.iter().map(move |&e| (e, self.get(e)))
    }

    /// Emotion with the highest score
    ///
    /// Ties resolve to the emotion declared first (Joy, Sadness, Anxiety,
    /// Anger, Neutral).
    pub fn dominant(&self) -> Emotion {
        let mut best = Emotion::ALL[0];
        for emotion in Emotion::ALL.iter().skip(1) {
            if self.get(*emotion) > self.get(best) {
                best = *emotion;
            }
        }
        best
    }

    /// Highest and second-highest scores
    pub fn top_two(&self) -> (f64, f64) {
        let mut sorted = self.scores;
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        (sorted[0], sorted[1])
    }
}

impl Serialize for EmotionScoreTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Emotion::COUNT))?;
        for (emotion, score) in self.iter() {
            map.serialize_entry(emotion.as_str(), &score)?;
        }
        map.end()
    }
}

impl TryFrom<HashMap<Emotion, f64>> for EmotionScoreTable {
    type Error = String;

    fn try_from(map: HashMap<Emotion, f64>) -> Result<Self, Self::Error> {
        let mut table = Self::zeroed();
        for emotion in Emotion::ALL {
            let score = map
                .get(&emotion)
                .copied()
                .ok_or_else(|| format!("missing score for {}", emotion))?;
            table.set(emotion, score);
        }
        Ok(table)
    }
}
