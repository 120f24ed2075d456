//! Acoustic feature computation
//!
//! Each [`FeatureStep`] produces one or more named features. Steps run
//! independently through [`guarded`]: a returned error, a panic, or a
//! non-finite output replaces that step's output with the configured default
//! and records why. One failing step never affects another.

pub mod chroma;
pub mod fft;
pub mod mfcc;
pub mod spectral;
pub mod tempo;
pub mod temporal;

use crate::audio::AudioBuffer;
use crate::error::FeatureError;
use emo_common::{ExtractionMethod, FeatureDefaults, FeatureName, FeatureVector};
use fft::{Spectrogram, HOP_LENGTH, N_FFT};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// One independently guarded feature computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStep {
    Mfcc,
    SpectralCentroid,
    SpectralRolloff,
    SpectralBandwidth,
    SpectralContrast,
    ZeroCrossingRate,
    RmsEnergy,
    Tempo,
    Chroma,
    Waveform,
    Duration,
}

impl FeatureStep {
    /// All steps in execution order
    pub const ALL: [FeatureStep; 11] = [
        FeatureStep::Mfcc,
        FeatureStep::SpectralCentroid,
        FeatureStep::SpectralRolloff,
        FeatureStep::SpectralBandwidth,
        FeatureStep::SpectralContrast,
        FeatureStep::ZeroCrossingRate,
        FeatureStep::RmsEnergy,
        FeatureStep::Tempo,
        FeatureStep::Chroma,
        FeatureStep::Waveform,
        FeatureStep::Duration,
    ];

    /// Features this step produces, in output order
    pub fn outputs(&self) -> &'static [FeatureName] {
        match self {
            FeatureStep::Mfcc => &[FeatureName::MfccMean, FeatureName::MfccStd],
            FeatureStep::SpectralCentroid => &[FeatureName::SpectralCentroid],
            FeatureStep::SpectralRolloff => &[FeatureName::SpectralRolloff],
            FeatureStep::SpectralBandwidth => &[FeatureName::SpectralBandwidth],
            FeatureStep::SpectralContrast => &[FeatureName::SpectralContrast],
            FeatureStep::ZeroCrossingRate => &[FeatureName::ZeroCrossingRate],
            FeatureStep::RmsEnergy => &[FeatureName::RmsEnergy],
            FeatureStep::Tempo => &[FeatureName::Tempo],
            FeatureStep::Chroma => &[FeatureName::ChromaMean, FeatureName::ChromaStd],
            FeatureStep::Waveform => &[FeatureName::AudioStd, FeatureName::AudioMax],
            FeatureStep::Duration => &[FeatureName::Duration],
        }
    }

    fn compute(&self, buffer: &AudioBuffer, spec: &Spectrogram) -> Result<Vec<f64>, FeatureError> {
        let samples = buffer.samples();
        match self {
            FeatureStep::Mfcc => mfcc::mfcc_statistics(spec).map(|(m, s)| vec![m, s]),
            FeatureStep::SpectralCentroid => spectral::spectral_centroid(spec).map(|v| vec![v]),
            FeatureStep::SpectralRolloff => spectral::spectral_rolloff(spec).map(|v| vec![v]),
            FeatureStep::SpectralBandwidth => spectral::spectral_bandwidth(spec).map(|v| vec![v]),
            FeatureStep::SpectralContrast => spectral::spectral_contrast(spec).map(|v| vec![v]),
            FeatureStep::ZeroCrossingRate => {
                temporal::zero_crossing_rate(samples, N_FFT, HOP_LENGTH).map(|v| vec![v])
            }
            FeatureStep::RmsEnergy => {
                temporal::rms_energy(samples, N_FFT, HOP_LENGTH).map(|v| vec![v])
            }
            FeatureStep::Tempo => tempo::estimate_tempo(spec).map(|v| vec![v]),
            FeatureStep::Chroma => chroma::chroma_statistics(spec).map(|(m, s)| vec![m, s]),
            FeatureStep::Waveform => {
                temporal::waveform_statistics(samples, buffer.peak()).map(|(s, m)| vec![s, m])
            }
            FeatureStep::Duration => Ok(vec![buffer.duration()]),
        }
    }
}

/// A feature replaced by its default
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultedFeature {
    pub feature: FeatureName,
    pub default_value: f64,
    pub reason: String,
}

/// Computed vector plus the features that fell back to defaults
#[derive(Debug, Clone)]
pub struct FeatureReport {
    pub vector: FeatureVector,
    pub defaulted: Vec<DefaultedFeature>,
}

/// Per-output outcome of a guarded step
pub type StepOutcome = Vec<(FeatureName, Result<f64, String>)>;

/// Run one step with failure isolation
///
/// Errors and panics fail every output of the step; a non-finite value fails
/// only its own output.
pub fn guarded<F>(outputs: &[FeatureName], compute: F) -> StepOutcome
where
    F: FnOnce() -> Result<Vec<f64>, FeatureError>,
{
    let fail_all = |reason: String| -> StepOutcome {
        outputs.iter().map(|&name| (name, Err(reason.clone()))).collect()
    };

    match panic::catch_unwind(AssertUnwindSafe(compute)) {
        Ok(Ok(values)) if values.len() == outputs.len() => outputs
            .iter()
            .zip(values)
            .map(|(&name, value)| {
                if value.is_finite() {
                    (name, Ok(value))
                } else {
                    (name, Err(format!("non-finite value {}", value)))
                }
            })
            .collect(),
        Ok(Ok(values)) => fail_all(format!(
            "expected {} values, got {}",
            outputs.len(),
            values.len()
        )),
        Ok(Err(e)) => fail_all(e.to_string()),
        Err(payload) => fail_all(format!(
            "computation panicked: {}",
            panic_message(payload.as_ref())
        )),
    }
}

/// Merge step outcomes into a complete vector
pub fn assemble_report<I>(
    outcomes: I,
    method: ExtractionMethod,
    defaults: &FeatureDefaults,
) -> FeatureReport
where
    I: IntoIterator<Item = StepOutcome>,
{
    let mut values = [f64::NAN; FeatureName::COUNT];
    let mut defaulted = Vec::new();

    for outcome in outcomes {
        for (name, result) in outcome {
            match result {
                Ok(value) => values[name.index()] = value,
                Err(reason) => defaulted.push(DefaultedFeature {
                    feature: name,
                    default_value: defaults.get(name),
                    reason,
                }),
            }
        }
    }

    // Features no step produced
    for name in FeatureName::ALL {
        if values[name.index()].is_nan() && !defaulted.iter().any(|d| d.feature == name) {
            defaulted.push(DefaultedFeature {
                feature: name,
                default_value: defaults.get(name),
                reason: "not computed".to_string(),
            });
        }
    }

    let vector = FeatureVector::from_fn(method, defaults, |name| values[name.index()]);
    FeatureReport { vector, defaulted }
}

/// Compute the full feature set of a decoded buffer
pub fn compute_features(
    buffer: &AudioBuffer,
    method: ExtractionMethod,
    defaults: &FeatureDefaults,
) -> FeatureReport {
    let spectrogram =
        Spectrogram::compute(buffer.samples(), buffer.sample_rate(), N_FFT, HOP_LENGTH);

    let outcomes = FeatureStep::ALL
        .iter()
        .map(|step| guarded(step.outputs(), || step.compute(buffer, &spectrogram)));

    assemble_report(outcomes, method, defaults)
}

/// Arithmetic mean, `None` for an empty sequence
pub(crate) fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean and population standard deviation, `None` for an empty sequence
pub(crate) fn mean_std<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    let values: Vec<f64> = values.into_iter().collect();
    let m = mean(values.iter().copied())?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some((m, variance.sqrt()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
