//! # emo-analyzer
//!
//! Emotion inference for short, untrusted audio clips.
//!
//! **Pipeline:** raw bytes → [`extraction::FeatureExtractor`] (decoder chain,
//! byte-heuristic fallback) → [`scoring::EmotionScorer`] (rule table,
//! calibrated confidence) → [`AnalysisResult`].
//!
//! The pipeline never logs directly. Events go to an injected
//! [`observer::AnalysisObserver`]; the default maps them onto `tracing`.

pub mod assembler;
pub mod audio;
pub mod config;
pub mod error;
pub mod extraction;
pub mod features;
pub mod observer;
pub mod scoring;
pub mod transcoder;

pub use config::AnalyzerConfig;
pub use emo_common::{AnalysisResult, Emotion, ExtractionMethod, FeatureName, FeatureVector};
pub use error::AnalysisError;

use emo_common::events::AnalysisEvent;
use extraction::strategy::DecodeStrategy;
use extraction::FeatureExtractor;
use observer::{AnalysisObserver, TracingObserver};
use scoring::EmotionScorer;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info_span, Instrument};
use transcoder::{FfmpegTranscoder, Transcoder};
use uuid::Uuid;

/// Result plus the feature vector it was scored from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedAnalysis {
    pub result: AnalysisResult,
    pub features: FeatureVector,
}

/// Converter status in the capability report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConverterStatus {
    pub enabled: bool,
    pub name: Option<String>,
    pub available: bool,
}

/// What this analyzer can do on this host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityReport {
    pub status: String,
    pub module: String,
    pub version: String,
    pub strategies: Vec<DecodeStrategy>,
    pub target_sample_rate: u32,
    pub max_duration_secs: f64,
    pub converter: ConverterStatus,
}

/// Emotion analysis facade
///
/// Cheap to share behind an `Arc`; `analyze` takes `&self` and keeps no state
/// between requests.
pub struct EmotionAnalyzer {
    extractor: FeatureExtractor,
    scorer: EmotionScorer,
    observer: Arc<dyn AnalysisObserver>,
}

impl EmotionAnalyzer {
    /// Analyzer with the configured ffmpeg converter and tracing observer
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::builder(config.clone()).build()
    }

    pub fn builder(config: AnalyzerConfig) -> EmotionAnalyzerBuilder {
        EmotionAnalyzerBuilder {
            config,
            transcoder: None,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Analyze one clip
    ///
    /// # Arguments
    /// * `bytes` - Raw payload
    /// * `filename` - Declared filename (only the extension is used, as a hint)
    ///
    /// # Errors
    /// [`AnalysisError::EmptyInput`] for a zero-length payload. Every other
    /// failure is absorbed and reflected in `extraction_method`.
    pub async fn analyze(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_detailed(bytes, filename)
            .await
            .map(|detailed| detailed.result)
    }

    /// Analyze one clip and keep the feature vector
    pub async fn analyze_detailed(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<DetailedAnalysis, AnalysisError> {
        let span = info_span!(
            "analyze",
            request_id = %Uuid::new_v4(),
            input_bytes = bytes.len()
        );

        async move {
            let features = self.extractor.extract(bytes, filename).await?;
            let outcome = self.scorer.score(&features);

            self.observer.observe(&AnalysisEvent::ScoringCompleted {
                emotion: outcome.emotion,
                confidence: outcome.confidence,
                extraction_method: features.extraction_method(),
            });

            Ok::<_, AnalysisError>(DetailedAnalysis {
                result: assembler::assemble(&features, outcome),
                features,
            })
        }
        .instrument(span)
        .await
    }

    /// Capability report (probes converter availability)
    pub async fn capabilities(&self) -> CapabilityReport {
        let settings = self.extractor.settings();
        let converter = match self.extractor.transcoder() {
            Some(transcoder) => ConverterStatus {
                enabled: true,
                name: Some(transcoder.name().to_string()),
                available: transcoder.is_available().await,
            },
            None => ConverterStatus {
                enabled: false,
                name: None,
                available: false,
            },
        };

        CapabilityReport {
            status: "healthy".to_string(),
            module: "emo-analyzer".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            strategies: settings.strategies.clone(),
            target_sample_rate: settings.target_sample_rate,
            max_duration_secs: settings.max_duration_secs,
            converter,
        }
    }
}

/// Builder for [`EmotionAnalyzer`] with injectable converter and observer
pub struct EmotionAnalyzerBuilder {
    config: AnalyzerConfig,
    transcoder: Option<Arc<dyn Transcoder>>,
    observer: Arc<dyn AnalysisObserver>,
}

impl EmotionAnalyzerBuilder {
    /// Replace the configured ffmpeg converter
    pub fn transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    /// Replace the default tracing observer
    pub fn observer(mut self, observer: Arc<dyn AnalysisObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn build(self) -> EmotionAnalyzer {
        let AnalyzerConfig {
            extraction,
            converter,
            scoring,
            ..
        } = self.config;

        let transcoder = if converter.enabled {
            Some(self.transcoder.unwrap_or_else(|| {
                Arc::new(FfmpegTranscoder::new(
                    converter.program.clone(),
                    converter.timeout(),
                )) as Arc<dyn Transcoder>
            }))
        } else {
            None
        };

        EmotionAnalyzer {
            extractor: FeatureExtractor::new(extraction, transcoder, self.observer.clone()),
            scorer: EmotionScorer::new(scoring.rules, scoring.calibration),
            observer: self.observer,
        }
    }
}
