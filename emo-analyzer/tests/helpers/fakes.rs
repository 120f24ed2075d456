//! Fake converters and a recording observer

use async_trait::async_trait;
use emo_analyzer::observer::AnalysisObserver;
use emo_analyzer::transcoder::{TranscodeError, TranscodeRequest, Transcoder};
use emo_common::events::AnalysisEvent;
use std::path::PathBuf;
use std::sync::Mutex;

/// Converter that "converts" by writing a prepared WAV payload
pub struct WavTranscoder {
    wav: Vec<u8>,
    inputs: Mutex<Vec<PathBuf>>,
}

impl WavTranscoder {
    pub fn new(wav: Vec<u8>) -> Self {
        Self {
            wav,
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Input paths seen so far
    pub fn inputs(&self) -> Vec<PathBuf> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for WavTranscoder {
    fn name(&self) -> &str {
        "fake-wav"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn transcode(&self, request: &TranscodeRequest<'_>) -> Result<(), TranscodeError> {
        assert!(request.input.exists(), "input not written before conversion");
        assert_eq!(request.channels, 1);
        self.inputs.lock().unwrap().push(request.input.to_path_buf());
        tokio::fs::write(request.output, &self.wav).await?;
        Ok(())
    }
}

/// Converter that always exits with an error
#[derive(Default)]
pub struct FailingTranscoder {
    inputs: Mutex<Vec<PathBuf>>,
}

impl FailingTranscoder {
    pub fn inputs(&self) -> Vec<PathBuf> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for FailingTranscoder {
    fn name(&self) -> &str {
        "fake-failing"
    }

    async fn is_available(&self) -> bool {
        false
    }

    async fn transcode(&self, request: &TranscodeRequest<'_>) -> Result<(), TranscodeError> {
        self.inputs.lock().unwrap().push(request.input.to_path_buf());
        Err(TranscodeError::Failed {
            code: Some(1),
            stderr: "Invalid data found when processing input".to_string(),
        })
    }
}

/// Observer that keeps every event
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AnalysisEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<AnalysisEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AnalysisObserver for RecordingObserver {
    fn observe(&self, event: &AnalysisEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
