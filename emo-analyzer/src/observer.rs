//! Analysis observers
//!
//! The extraction and scoring pipeline never logs on its own. Everything it
//! wants to report goes through an injected [`AnalysisObserver`].

use emo_common::events::{AnalysisEvent, EventBus};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives pipeline events
pub trait AnalysisObserver: Send + Sync {
    fn observe(&self, event: &AnalysisEvent);
}

impl<T: AnalysisObserver + ?Sized> AnalysisObserver for Arc<T> {
    fn observe(&self, event: &AnalysisEvent) {
        (**self).observe(event)
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl AnalysisObserver for NullObserver {
    fn observe(&self, _event: &AnalysisEvent) {}
}

/// Forwards events to subscribers of an [`EventBus`]
impl AnalysisObserver for EventBus {
    fn observe(&self, event: &AnalysisEvent) {
        self.emit_lossy(event.clone());
    }
}

/// Maps events onto structured `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl AnalysisObserver for TracingObserver {
    fn observe(&self, event: &AnalysisEvent) {
        match event {
            AnalysisEvent::ExtractionStarted {
                input_bytes,
                declared_extension,
            } => debug!(
                input_bytes = input_bytes,
                declared_extension = ?declared_extension,
                "Feature extraction started"
            ),
            AnalysisEvent::StrategySkipped { strategy, reason } => debug!(
                strategy = %strategy,
                reason = %reason,
                "Decode strategy skipped"
            ),
            AnalysisEvent::StrategyFailed { strategy, reason } => warn!(
                strategy = %strategy,
                reason = %reason,
                "Decode strategy failed"
            ),
            AnalysisEvent::StrategySucceeded {
                strategy,
                sample_count,
                sample_rate,
            } => debug!(
                strategy = %strategy,
                sample_count = sample_count,
                sample_rate = sample_rate,
                "Decode strategy succeeded"
            ),
            AnalysisEvent::FeatureDefaulted {
                feature,
                default_value,
                reason,
            } => debug!(
                feature = %feature,
                default_value = default_value,
                reason = %reason,
                "Feature replaced by default"
            ),
            AnalysisEvent::HeuristicSynthesized {
                input_bytes,
                header_diversity,
            } => warn!(
                input_bytes = input_bytes,
                header_diversity = header_diversity,
                "No decoder succeeded, features synthesized from raw bytes"
            ),
            AnalysisEvent::ScoringCompleted {
                emotion,
                confidence,
                extraction_method,
            } => info!(
                emotion = %emotion,
                confidence = confidence,
                extraction_method = %extraction_method,
                "Emotion analysis complete"
            ),
        }
    }
}
