//! Pipeline configuration.
//!
//! Every constant the pipeline depends on (sample rate, channel lists,
//! trial duration, band boundaries, ratio and difference selections) is an
//! explicit field here, threaded into each component entry point.

use serde::{Deserialize, Serialize};

use crate::bands::{self, FrequencyBand};
use crate::error::{EpochError, Result};

/// Trial segmentation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochingConfig {
    /// Window length after each event onset, in seconds
    pub trial_duration_s: f64,
}

impl Default for EpochingConfig {
    fn default() -> Self {
        Self {
            trial_duration_s: 4.0,
        }
    }
}

/// Power-spectral-density estimator selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PsdMethod {
    /// Single Hann-windowed periodogram over the whole epoch
    Periodogram,
    /// Averaged periodograms over overlapping Hann-windowed segments
    Welch { segment_len: usize, overlap: usize },
}

impl Default for PsdMethod {
    fn default() -> Self {
        Self::Periodogram
    }
}

/// Spectral estimation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Ordered band boundaries in Hz; `[b0..bn]` yields intervals `(bi, bi+1]`
    pub band_boundaries_hz: Vec<f64>,
    /// Optional interval names; canonical names are inferred when omitted
    pub band_names: Option<Vec<String>>,
    /// Upper edge of the analyzed bandwidth; total power is taken over
    /// `(0, max_freq_hz]`
    pub max_freq_hz: f64,
    pub method: PsdMethod,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            band_boundaries_hz: bands::CANONICAL_BOUNDARIES.to_vec(),
            band_names: None,
            max_freq_hz: 30.0,
            method: PsdMethod::default(),
        }
    }
}

impl SpectralConfig {
    /// Materialize the configured band set.
    pub fn bands(&self) -> Result<Vec<FrequencyBand>> {
        bands::bands_from_boundaries(&self.band_boundaries_hz, self.band_names.as_deref())
    }
}

/// What to do when a band-ratio denominator is zero or nearly zero
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisionPolicy {
    /// Error with epoch/channel/band context when `|denominator|` falls
    /// below the threshold
    Reject { min_denominator: f64 },
    /// Emit the IEEE result (inf or NaN) and keep going
    Propagate,
}

impl Default for DivisionPolicy {
    fn default() -> Self {
        Self::Reject {
            min_denominator: 1e-12,
        }
    }
}

/// Derived-feature selections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Band-ratio features as (numerator, denominator) band names, computed
    /// per EEG channel
    pub ratio_pairs: Vec<(String, String)>,
    /// Channel pair for lateralization differences, `power(a) - power(b)`
    /// per band
    pub difference_pair: Option<(String, String)>,
    pub division: DivisionPolicy,
    /// Also emit mean instantaneous amplitude/frequency per EEG channel
    pub instantaneous: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            ratio_pairs: vec![("theta".to_string(), "beta".to_string())],
            difference_pair: Some(("C3".to_string(), "C4".to_string())),
            division: DivisionPolicy::default(),
            instantaneous: false,
        }
    }
}

/// Complete pipeline configuration.
///
/// Defaults follow the BCI Competition IV 2b recording setup: 250 Hz,
/// three EEG electrodes over sensorimotor cortex, three EOG channels kept
/// out of the spectral features, left/right motor-imagery classes, 4 s
/// trials, and the canonical delta/theta/alpha/beta partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub sample_rate_hz: f64,
    pub eeg_channels: Vec<String>,
    pub artifact_channels: Vec<String>,
    pub class_labels: Vec<String>,
    pub epoching: EpochingConfig,
    pub spectral: SpectralConfig,
    pub features: FeatureConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 250.0,
            eeg_channels: vec!["C3".to_string(), "Cz".to_string(), "C4".to_string()],
            artifact_channels: vec![
                "EOG:ch01".to_string(),
                "EOG:ch02".to_string(),
                "EOG:ch03".to_string(),
            ],
            class_labels: vec!["left".to_string(), "right".to_string()],
            epoching: EpochingConfig::default(),
            spectral: SpectralConfig::default(),
            features: FeatureConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Nominal samples per epoch, `round(trial_duration x sample_rate)`.
    pub fn samples_per_epoch(&self) -> usize {
        (self.epoching.trial_duration_s * self.sample_rate_hz).round() as usize
    }

    /// All channels that get sliced into epochs (EEG first, then artifact).
    pub fn epoch_channels(&self) -> Vec<String> {
        let mut out = self.eeg_channels.clone();
        out.extend(self.artifact_channels.iter().cloned());
        out
    }

    /// Fail fast on any inconsistent setting, naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate_hz <= 0.0 {
            return Err(EpochError::InvalidConfig(format!(
                "sample_rate_hz must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if self.epoching.trial_duration_s <= 0.0 {
            return Err(EpochError::InvalidConfig(format!(
                "trial_duration_s must be positive, got {}",
                self.epoching.trial_duration_s
            )));
        }
        if self.eeg_channels.is_empty() {
            return Err(EpochError::InvalidConfig(
                "eeg_channels must not be empty".to_string(),
            ));
        }
        if self.class_labels.is_empty() {
            return Err(EpochError::InvalidConfig(
                "class_labels must not be empty".to_string(),
            ));
        }
        for ch in &self.eeg_channels {
            if self.artifact_channels.contains(ch) {
                return Err(EpochError::InvalidConfig(format!(
                    "channel '{}' is listed as both EEG and artifact",
                    ch
                )));
            }
        }

        let bands = self.spectral.bands()?;
        // bands() already enforced >= 2 boundaries
        let last_boundary = self.spectral.band_boundaries_hz.last().copied().unwrap_or(0.0);
        if self.spectral.max_freq_hz < last_boundary {
            return Err(EpochError::InvalidConfig(format!(
                "max_freq_hz ({}) is below the top band boundary ({})",
                self.spectral.max_freq_hz, last_boundary
            )));
        }
        let nyquist = self.sample_rate_hz / 2.0;
        if self.spectral.max_freq_hz > nyquist {
            return Err(EpochError::InvalidConfig(format!(
                "max_freq_hz ({}) exceeds the Nyquist frequency ({})",
                self.spectral.max_freq_hz, nyquist
            )));
        }
        if let PsdMethod::Welch {
            segment_len,
            overlap,
        } = self.spectral.method
        {
            if segment_len < 2 {
                return Err(EpochError::InvalidConfig(format!(
                    "Welch segment_len must be >= 2, got {}",
                    segment_len
                )));
            }
            if overlap >= segment_len {
                return Err(EpochError::InvalidConfig(format!(
                    "Welch overlap ({}) must be smaller than segment_len ({})",
                    overlap, segment_len
                )));
            }
        }

        for (num, den) in &self.features.ratio_pairs {
            bands::band_by_name(&bands, num)?;
            bands::band_by_name(&bands, den)?;
        }
        if let Some((a, b)) = &self.features.difference_pair {
            for ch in [a, b] {
                if !self.eeg_channels.contains(ch) {
                    return Err(EpochError::InvalidConfig(format!(
                        "difference_pair channel '{}' is not an EEG channel",
                        ch
                    )));
                }
            }
        }
        if let DivisionPolicy::Reject { min_denominator } = self.features.division {
            if min_denominator < 0.0 {
                return Err(EpochError::InvalidConfig(format!(
                    "min_denominator must be >= 0, got {}",
                    min_denominator
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_samples_per_epoch() {
        let config = PipelineConfig::default();
        assert_eq!(config.samples_per_epoch(), 1000);
    }

    #[test]
    fn test_rejects_overlapping_channel_lists() {
        let mut config = PipelineConfig::default();
        config.artifact_channels.push("C3".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("C3"));
    }

    #[test]
    fn test_rejects_unknown_ratio_band() {
        let mut config = PipelineConfig::default();
        config.features.ratio_pairs = vec![("gamma".to_string(), "beta".to_string())];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, EpochError::UnknownBand(name) if name == "gamma"));
    }

    #[test]
    fn test_rejects_difference_pair_outside_eeg_set() {
        let mut config = PipelineConfig::default();
        config.features.difference_pair = Some(("C3".to_string(), "EOG:ch01".to_string()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_cutoff_above_nyquist() {
        let mut config = PipelineConfig::default();
        config.sample_rate_hz = 50.0; // Nyquist 25 < top boundary 30
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_welch_overlap() {
        let mut config = PipelineConfig::default();
        config.spectral.method = PsdMethod::Welch {
            segment_len: 128,
            overlap: 128,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_epoch_channels_order() {
        let config = PipelineConfig::default();
        let chans = config.epoch_channels();
        assert_eq!(chans[0], "C3");
        assert!(chans.contains(&"EOG:ch01".to_string()));
    }
}
