//! Format converter adapter
//!
//! Runs an out-of-process transcoder to turn streaming containers (WebM,
//! Matroska) into a plain mono WAV that the in-process decoder handles.
//!
//! # Requirements
//! - `ffmpeg` on `PATH` (or a configured program path)
//!
//! # Installation
//! ```bash
//! # Ubuntu/Debian
//! sudo apt-get install ffmpeg
//!
//! # macOS
//! brew install ffmpeg
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::OnceCell;

/// Default converter program
pub const DEFAULT_PROGRAM: &str = "ffmpeg";

/// One transcoding job
#[derive(Debug, Clone)]
pub struct TranscodeRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Converter failure (never fatal to an analysis)
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// Converter program missing or disabled
    #[error("Converter unavailable: {0}")]
    Unavailable(String),

    /// Converter exited unsuccessfully
    #[error("Converter failed (exit code {code:?}): {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    /// Converter exceeded its time limit and was killed
    #[error("Converter timed out after {0:?}")]
    TimedOut(Duration),

    /// Converter reported success but wrote nothing
    #[error("Converter produced no output")]
    EmptyOutput,

    #[error("Converter I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Out-of-process format converter
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Converter name for logs and health reports
    fn name(&self) -> &str;

    /// Whether the converter can run on this host
    async fn is_available(&self) -> bool;

    /// Transcode `request.input` into a WAV file at `request.output`
    async fn transcode(&self, request: &TranscodeRequest<'_>) -> Result<(), TranscodeError>;
}

/// ffmpeg-backed converter
pub struct FfmpegTranscoder {
    program: PathBuf,
    timeout: Duration,
    /// Cached availability probe
    available: OnceCell<bool>,
}

impl FfmpegTranscoder {
    /// Create a converter running `program` with a hard time limit
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            available: OnceCell::new(),
        }
    }

    /// Build the command line for a request
    fn command(&self, request: &TranscodeRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-nostdin", "-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(request.input)
            .arg("-ar")
            .arg(request.sample_rate.to_string())
            .arg("-ac")
            .arg(request.channels.to_string())
            .args(["-f", "wav"])
            .arg(request.output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, Duration::from_secs(30))
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn is_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| async {
                Command::new(&self.program)
                    .arg("-version")
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .status()
                    .await
                    .map(|status| status.success())
                    .unwrap_or(false)
            })
            .await
    }

    async fn transcode(&self, request: &TranscodeRequest<'_>) -> Result<(), TranscodeError> {
        let child = self.command(request).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TranscodeError::Unavailable(format!("{} not found", self.program.display()))
            } else {
                TranscodeError::Io(e)
            }
        })?;

        // Dropping the child on timeout kills it (kill_on_drop)
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| TranscodeError::TimedOut(self.timeout))??;

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        match tokio::fs::metadata(request.output).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(TranscodeError::EmptyOutput),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let transcoder = FfmpegTranscoder::new("/usr/bin/ffmpeg", Duration::from_secs(5));
        let request = TranscodeRequest {
            input: Path::new("/tmp/in.webm"),
            output: Path::new("/tmp/out.wav"),
            sample_rate: 22050,
            channels: 1,
        };
        let cmd = transcoder.command(&request);
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "/usr/bin/ffmpeg");
        let args: Vec<String> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec![
                "-nostdin", "-hide_banner", "-loglevel", "error", "-y", "-i", "/tmp/in.webm",
                "-ar", "22050", "-ac", "1", "-f", "wav", "/tmp/out.wav"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let transcoder =
            FfmpegTranscoder::new("/nonexistent/emo-test-converter", Duration::from_secs(1));
        assert!(!transcoder.is_available().await);

        let dir = tempfile::tempdir().unwrap();
        let request = TranscodeRequest {
            input: &dir.path().join("in.webm"),
            output: &dir.path().join("out.wav"),
            sample_rate: 22050,
            channels: 1,
        };
        let result = transcoder.transcode(&request).await;
        assert!(matches!(result, Err(TranscodeError::Unavailable(_))));
    }

    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("converter.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_converter_is_killed_on_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let program = script(
            dir.path(),
            &format!("sleep 2\ntouch '{}'", marker.display()),
        );
        let transcoder = FfmpegTranscoder::new(program, Duration::from_millis(400));
        let request = TranscodeRequest {
            input: &dir.path().join("in.webm"),
            output: &dir.path().join("out.wav"),
            sample_rate: 22050,
            channels: 1,
        };

        let started = std::time::Instant::now();
        let result = transcoder.transcode(&request).await;
        assert!(matches!(result, Err(TranscodeError::TimedOut(t)) if t == Duration::from_millis(400)));
        assert!(started.elapsed() < Duration::from_secs(2));

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert!(!marker.exists(), "converter kept running after timeout");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "echo 'bad input' >&2\nexit 1");
        let transcoder = FfmpegTranscoder::new(program, Duration::from_secs(5));
        let request = TranscodeRequest {
            input: &dir.path().join("in.webm"),
            output: &dir.path().join("out.wav"),
            sample_rate: 22050,
            channels: 1,
        };

        match transcoder.transcode(&request).await {
            Err(TranscodeError::Failed { code, stderr }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "bad input");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_without_output_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "exit 0");
        let transcoder = FfmpegTranscoder::new(program, Duration::from_secs(5));
        let request = TranscodeRequest {
            input: &dir.path().join("in.webm"),
            output: &dir.path().join("out.wav"),
            sample_rate: 22050,
            channels: 1,
        };

        let result = transcoder.transcode(&request).await;
        assert!(matches!(result, Err(TranscodeError::EmptyOutput)));
    }
}
