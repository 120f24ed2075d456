//! In-memory audio decoding with symphonia
//!
//! Decodes a byte payload into a normalized mono [`AudioBuffer`] at the
//! analysis sample rate. Decoding stops once the configured maximum analysis
//! window has been read, so oversized clips cost no more than the window.

use super::buffer::AudioBuffer;
use super::resampler::{ResampleQuality, Resampler};
use crate::error::{DecodeError, DecodeResult};
use std::io::Cursor;
use std::sync::Arc;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// How packet-level errors are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Any corrupt packet or container read error fails the decode
    Strict,
    /// Corrupt packets are skipped; a container read error ends the stream
    Lenient,
}

/// Parameters for one decode attempt
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Extension passed to the format probe as a hint
    pub hint_extension: Option<String>,
    pub mode: DecodeMode,
    pub target_sample_rate: u32,
    /// Maximum analysis window in seconds
    pub max_duration_secs: f64,
    pub resample_quality: ResampleQuality,
}

/// Decode a payload to mono PCM at `options.target_sample_rate`
///
/// # Errors
/// Probe failure, missing audio track, codec failure (strict mode), or an
/// unusable result (no samples, non-finite samples).
pub fn decode(bytes: Arc<[u8]>, options: &DecodeOptions) -> DecodeResult<AudioBuffer> {
    let (mono, native_rate) = decode_mono(bytes, options)?;

    let resampled = Resampler::resample(
        &mono,
        native_rate,
        options.target_sample_rate,
        options.resample_quality,
    )?;

    let mut samples = resampled;
    let max_samples = max_frames(options.max_duration_secs, options.target_sample_rate);
    samples.truncate(max_samples);

    AudioBuffer::new(samples, options.target_sample_rate)
}

/// Decode and downmix at the native rate, stopping at the duration cap
fn decode_mono(bytes: Arc<[u8]>, options: &DecodeOptions) -> DecodeResult<(Vec<f32>, u32)> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = options.hint_extension.as_deref() {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let mut native_rate = codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Codec(format!("Failed to create decoder: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();
    let mut frame_limit = native_rate.map(|rate| max_frames(options.max_duration_secs, rate));

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => match options.mode {
                DecodeMode::Strict => {
                    return Err(DecodeError::Codec(format!("Failed to read packet: {}", e)))
                }
                DecodeMode::Lenient => break,
            },
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => match options.mode {
                DecodeMode::Strict => return Err(DecodeError::Codec(msg.to_string())),
                DecodeMode::Lenient => continue,
            },
            Err(e) => return Err(DecodeError::Codec(e.to_string())),
        };

        let spec = *decoded.spec();
        if native_rate.is_none() {
            native_rate = Some(spec.rate);
            frame_limit = Some(max_frames(options.max_duration_secs, spec.rate));
        }

        let channels = spec.channels.count().max(1);
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        downmix_into(sample_buf.samples(), channels, &mut mono);

        if let Some(limit) = frame_limit {
            if mono.len() >= limit {
                mono.truncate(limit);
                break;
            }
        }
    }

    let rate = native_rate
        .filter(|&r| r > 0)
        .ok_or_else(|| DecodeError::Unusable("sample rate unknown".to_string()))?;

    if mono.is_empty() {
        return Err(DecodeError::Unusable("zero samples decoded".to_string()));
    }

    Ok((mono, rate))
}

/// Average interleaved channels into mono
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels == 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    let scale = 1.0 / channels as f32;
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale),
    );
}

fn max_frames(max_duration_secs: f64, rate: u32) -> usize {
    (max_duration_secs * rate as f64).ceil().max(0.0) as usize
}

/// Extension of the detected container type, from magic bytes
pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.extension())
}

/// True when the magic bytes identify a WebM or Matroska container
pub fn is_matroska_family(bytes: &[u8]) -> bool {
    matches!(sniff_extension(bytes), Some("webm" | "mkv" | "mka"))
}
