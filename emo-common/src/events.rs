//! Analysis events and the EventBus
//!
//! The extraction and scoring pipeline reports what it did through
//! [`AnalysisEvent`]s instead of logging directly. Events are side-channel
//! only: they never feed back into a result.

use crate::emotion::Emotion;
use crate::features::{ExtractionMethod, FeatureName};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event emitted while analysing one clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisEvent {
    /// Extraction began for a submitted clip
    ExtractionStarted {
        /// Size of the submitted payload
        input_bytes: usize,
        /// Declared extension, lower-cased (untrusted)
        declared_extension: Option<String>,
    },

    /// A strategy was not attempted for this input
    StrategySkipped {
        strategy: ExtractionMethod,
        reason: String,
    },

    /// A strategy was attempted and failed; the chain advances
    StrategyFailed {
        strategy: ExtractionMethod,
        reason: String,
    },

    /// A strategy produced a usable PCM buffer
    StrategySucceeded {
        strategy: ExtractionMethod,
        sample_count: usize,
        sample_rate: u32,
    },

    /// One feature could not be computed and was replaced by its default
    FeatureDefaulted {
        feature: FeatureName,
        default_value: f64,
        reason: String,
    },

    /// No decoder succeeded; features were synthesized from the raw bytes
    HeuristicSynthesized {
        input_bytes: usize,
        header_diversity: f64,
    },

    /// Scoring finished
    ScoringCompleted {
        emotion: Emotion,
        confidence: u8,
        extraction_method: ExtractionMethod,
    },
}

/// Broadcast channel for analysis events
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block the pipeline)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use emo_common::events::{AnalysisEvent, EventBus};
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(AnalysisEvent::ExtractionStarted {
///     input_bytes: 1024,
///     declared_extension: Some("wav".to_string()),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AnalysisEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: AnalysisEvent,
    ) -> Result<usize, broadcast::error::SendError<AnalysisEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: AnalysisEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
