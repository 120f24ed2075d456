//! Feature extraction chain
//!
//! Turns an untrusted payload into a complete [`FeatureVector`]. Decoder
//! strategies run in configured order until one yields usable PCM; if all of
//! them fail the byte heuristic synthesizes a vector from the raw bytes. The
//! only fatal outcome is an empty payload.
//!
//! **Flow:**
//! 1. Reject empty input
//! 2. For each strategy: skip, fail (advance) or succeed (stop)
//! 3. Compute acoustic features with per-feature defaults
//! 4. Otherwise synthesize from the byte profile

pub mod strategy;
pub mod synthesizer;

use crate::audio::decoder::{is_matroska_family, sniff_extension};
use crate::audio::{decode, AudioBuffer, DecodeMode, DecodeOptions, ResampleQuality};
use crate::config::ExtractionConfig;
use crate::error::{AnalysisError, DecodeError, DecodeResult, StrategyError};
use crate::features::{assemble_report, compute_features, FeatureReport, StepOutcome};
use crate::observer::AnalysisObserver;
use crate::transcoder::{TranscodeRequest, Transcoder};
use emo_common::events::AnalysisEvent;
use emo_common::{ExtractionMethod, FeatureDefaults, FeatureName, FeatureVector};
use std::sync::Arc;
use strategy::{declared_extension, DecodeStrategy};
use synthesizer::{synthesize, ByteProfile};

/// Runs the decoder chain and feature computation for one payload at a time
///
/// Holds no per-request state; one extractor serves concurrent requests.
pub struct FeatureExtractor {
    settings: ExtractionConfig,
    defaults: FeatureDefaults,
    transcoder: Option<Arc<dyn Transcoder>>,
    observer: Arc<dyn AnalysisObserver>,
}

impl FeatureExtractor {
    /// Create an extractor
    ///
    /// # Arguments
    /// * `settings` - Strategy chain, target rate, duration cap, defaults
    /// * `transcoder` - Format converter; `None` skips converted decoding
    /// * `observer` - Receives every extraction event
    pub fn new(
        settings: ExtractionConfig,
        transcoder: Option<Arc<dyn Transcoder>>,
        observer: Arc<dyn AnalysisObserver>,
    ) -> Self {
        let defaults = settings.feature_defaults();
        Self {
            settings,
            defaults,
            transcoder,
            observer,
        }
    }

    pub fn settings(&self) -> &ExtractionConfig {
        &self.settings
    }

    pub fn transcoder(&self) -> Option<&Arc<dyn Transcoder>> {
        self.transcoder.as_ref()
    }

    /// Extract a complete feature vector
    ///
    /// # Arguments
    /// * `bytes` - Raw payload (untrusted)
    /// * `filename` - Declared filename; only its extension is used, as a hint
    ///
    /// # Returns
    /// A vector with every feature present and finite, or
    /// [`AnalysisError::EmptyInput`]
    pub async fn extract(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<FeatureVector, AnalysisError> {
        if bytes.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let declared = declared_extension(filename);
        self.observer.observe(&AnalysisEvent::ExtractionStarted {
            input_bytes: bytes.len(),
            declared_extension: declared.clone(),
        });

        let payload: Arc<[u8]> = Arc::from(bytes);

        for &strategy in &self.settings.strategies {
            let attempt = match strategy {
                DecodeStrategy::Direct => {
                    self.decode_in_process(payload.clone(), strategy, declared.clone())
                        .await
                        .map_err(StrategyError::from)
                }
                DecodeStrategy::Converted => {
                    let transcoder = match self.converted_applies(&payload, declared.as_deref()) {
                        Err(reason) => {
                            self.skip(strategy, reason);
                            continue;
                        }
                        Ok(transcoder) => transcoder,
                    };
                    self.decode_converted(&payload, declared.as_deref(), transcoder.as_ref())
                        .await
                }
                DecodeStrategy::Alternate => {
                    let sniffed = sniff_extension(&payload).map(str::to_string);
                    self.decode_in_process(payload.clone(), strategy, sniffed)
                        .await
                        .map_err(StrategyError::from)
                }
            };

            match attempt {
                Ok(buffer) => {
                    self.observer.observe(&AnalysisEvent::StrategySucceeded {
                        strategy: strategy.method(),
                        sample_count: buffer.len(),
                        sample_rate: buffer.sample_rate(),
                    });
                    let report = self.compute(buffer, strategy.method()).await;
                    return Ok(self.report_defaults(report));
                }
                Err(e) => self.observer.observe(&AnalysisEvent::StrategyFailed {
                    strategy: strategy.method(),
                    reason: e.to_string(),
                }),
            }
        }

        Ok(self.synthesize(bytes))
    }

    /// Transcoder to use, or the reason converted decoding does not apply
    fn converted_applies(
        &self,
        payload: &[u8],
        declared: Option<&str>,
    ) -> Result<Arc<dyn Transcoder>, String> {
        let hostile = declared.is_some_and(|ext| self.settings.is_hostile_extension(ext))
            || is_matroska_family(payload);
        if !hostile {
            return Err("not a streaming container".to_string());
        }
        self.transcoder
            .clone()
            .ok_or_else(|| "format conversion disabled".to_string())
    }

    fn skip(&self, strategy: DecodeStrategy, reason: String) {
        self.observer.observe(&AnalysisEvent::StrategySkipped {
            strategy: strategy.method(),
            reason,
        });
    }

    fn decode_options(
        &self,
        hint: Option<String>,
        mode: DecodeMode,
        quality: ResampleQuality,
    ) -> DecodeOptions {
        DecodeOptions {
            hint_extension: hint,
            mode,
            target_sample_rate: self.settings.target_sample_rate,
            max_duration_secs: self.settings.max_duration_secs,
            resample_quality: quality,
        }
    }

    async fn decode_in_process(
        &self,
        payload: Arc<[u8]>,
        strategy: DecodeStrategy,
        hint: Option<String>,
    ) -> DecodeResult<AudioBuffer> {
        let options = self.decode_options(hint, strategy.decode_mode(), strategy.resample_quality());
        decode_blocking(payload, options).await
    }

    /// Write the payload to a scoped directory, convert, decode the WAV
    ///
    /// The directory is removed when `workdir` drops, on every return path.
    async fn decode_converted(
        &self,
        payload: &[u8],
        declared: Option<&str>,
        transcoder: &dyn Transcoder,
    ) -> Result<AudioBuffer, StrategyError> {
        let workdir = tempfile::Builder::new().prefix("emo-convert-").tempdir()?;

        let input_ext = declared
            .or_else(|| sniff_extension(payload))
            .unwrap_or("bin");
        let input = workdir.path().join(format!("input.{}", input_ext));
        let output = workdir.path().join("converted.wav");

        tokio::fs::write(&input, payload).await?;

        transcoder
            .transcode(&TranscodeRequest {
                input: &input,
                output: &output,
                sample_rate: self.settings.target_sample_rate,
                channels: 1,
            })
            .await?;

        let wav: Arc<[u8]> = tokio::fs::read(&output).await?.into();
        let options = self.decode_options(
            Some("wav".to_string()),
            DecodeStrategy::Converted.decode_mode(),
            DecodeStrategy::Converted.resample_quality(),
        );
        let buffer = decode_blocking(wav, options).await?;

        drop(workdir);
        Ok(buffer)
    }

    /// Run feature computation on the blocking pool
    async fn compute(&self, buffer: AudioBuffer, method: ExtractionMethod) -> FeatureReport {
        let defaults = self.defaults;
        let duration = buffer.duration();

        match tokio::task::spawn_blocking(move || compute_features(&buffer, method, &defaults))
            .await
        {
            Ok(report) => report,
            Err(e) => {
                // Only duration survives a lost computation task
                let reason = format!("feature computation aborted: {}", e);
                let outcome: StepOutcome = FeatureName::ALL
                    .iter()
                    .map(|&name| match name {
                        FeatureName::Duration => (name, Ok(duration)),
                        _ => (name, Err(reason.clone())),
                    })
                    .collect();
                assemble_report([outcome], method, &defaults)
            }
        }
    }

    fn report_defaults(&self, report: FeatureReport) -> FeatureVector {
        for defaulted in &report.defaulted {
            self.observer.observe(&AnalysisEvent::FeatureDefaulted {
                feature: defaulted.feature,
                default_value: defaulted.default_value,
                reason: defaulted.reason.clone(),
            });
        }
        report.vector
    }

    fn synthesize(&self, bytes: &[u8]) -> FeatureVector {
        let profile = ByteProfile::of(bytes, self.settings.header_window_bytes);
        self.observer.observe(&AnalysisEvent::HeuristicSynthesized {
            input_bytes: profile.size,
            header_diversity: profile.diversity,
        });
        synthesize(&profile, self.settings.max_duration_secs, &self.defaults)
    }
}

async fn decode_blocking(payload: Arc<[u8]>, options: DecodeOptions) -> DecodeResult<AudioBuffer> {
    tokio::task::spawn_blocking(move || decode(payload, &options))
        .await
        .map_err(|e| DecodeError::Aborted(e.to_string()))?
}
