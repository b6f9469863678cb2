//! Feature aggregation: epoch table -> flat numeric feature table.
//!
//! Columns are declared once as a typed schema; every row fills the schema
//! positionally, so there is no ad-hoc string key construction anywhere in
//! the pipeline.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analytic;
use crate::bands::{self, FrequencyBand};
use crate::config::{DivisionPolicy, PipelineConfig};
use crate::error::{EpochError, Result};
use crate::profile_scope;
use crate::spectral::{self, PowerSpectrum};
use crate::types::{Epoch, EpochCollection};

/// Typed composite column key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKey {
    /// Relative spectral power of one channel in one band
    BandPower {
        channel: String,
        band: FrequencyBand,
    },
    /// Ratio of two bands' relative power on one channel
    BandRatio {
        channel: String,
        numerator: String,
        denominator: String,
    },
    /// Lateralization: `power(channel_a) - power(channel_b)` in one band
    ChannelDifference {
        channel_a: String,
        channel_b: String,
        band: FrequencyBand,
    },
    /// Mean instantaneous amplitude of one channel
    InstAmplitudeMean { channel: String },
    /// Mean instantaneous frequency of one channel
    InstFrequencyMean { channel: String },
}

impl FeatureKey {
    /// Deterministic column name for tabular output.
    pub fn column_name(&self) -> String {
        match self {
            Self::BandPower { channel, band } => {
                format!("{}:{}", channel, band.interval_label())
            }
            Self::BandRatio {
                channel,
                numerator,
                denominator,
            } => format!("{}:{}/{}", channel, numerator, denominator),
            Self::ChannelDifference {
                channel_a,
                channel_b,
                band,
            } => format!("{}-{}:{}", channel_a, channel_b, band.interval_label()),
            Self::InstAmplitudeMean { channel } => format!("{}:inst_amp_mean", channel),
            Self::InstFrequencyMean { channel } => format!("{}:inst_freq_mean", channel),
        }
    }
}

/// One table row: the original epoch index, its class label `y`, and one
/// value per schema column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub epoch: usize,
    pub y: String,
    pub values: Vec<f64>,
}

/// The feature table: typed schema + one row per epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTable {
    pub schema: Vec<FeatureKey>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn column_index(&self, key: &FeatureKey) -> Option<usize> {
        self.schema.iter().position(|k| k == key)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.iter().map(|k| k.column_name()).collect()
    }

    /// Values of one column in row order.
    pub fn column(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |row| row.values[index])
    }
}

/// Build the column schema for a configuration.
fn build_schema(config: &PipelineConfig, band_set: &[FrequencyBand]) -> Vec<FeatureKey> {
    let mut schema = Vec::new();
    for channel in &config.eeg_channels {
        for band in band_set {
            schema.push(FeatureKey::BandPower {
                channel: channel.clone(),
                band: band.clone(),
            });
        }
    }
    for (numerator, denominator) in &config.features.ratio_pairs {
        for channel in &config.eeg_channels {
            schema.push(FeatureKey::BandRatio {
                channel: channel.clone(),
                numerator: numerator.clone(),
                denominator: denominator.clone(),
            });
        }
    }
    if let Some((a, b)) = &config.features.difference_pair {
        for band in band_set {
            schema.push(FeatureKey::ChannelDifference {
                channel_a: a.clone(),
                channel_b: b.clone(),
                band: band.clone(),
            });
        }
    }
    if config.features.instantaneous {
        for channel in &config.eeg_channels {
            schema.push(FeatureKey::InstAmplitudeMean {
                channel: channel.clone(),
            });
            schema.push(FeatureKey::InstFrequencyMean {
                channel: channel.clone(),
            });
        }
    }
    schema
}

/// Per-epoch scratch: one spectrum per EEG channel.
struct EpochSpectra {
    /// Parallel to `config.eeg_channels`
    spectra: Vec<PowerSpectrum>,
}

impl EpochSpectra {
    fn compute(epoch: &Epoch, config: &PipelineConfig) -> Result<Self> {
        let mut spectra = Vec::with_capacity(config.eeg_channels.len());
        for label in &config.eeg_channels {
            let channel = epoch
                .channel(label)
                .ok_or_else(|| EpochError::MissingChannel(label.clone()))?;
            spectra.push(spectral::estimate(
                &channel.samples,
                config.sample_rate_hz,
                &config.spectral.method,
            ));
        }
        Ok(Self { spectra })
    }

    fn spectrum(&self, config: &PipelineConfig, channel: &str) -> Result<&PowerSpectrum> {
        let idx = config
            .eeg_channels
            .iter()
            .position(|c| c == channel)
            .ok_or_else(|| EpochError::MissingChannel(channel.to_string()))?;
        Ok(&self.spectra[idx])
    }

    fn relative_power(
        &self,
        config: &PipelineConfig,
        channel: &str,
        band: &FrequencyBand,
    ) -> Result<f64> {
        let spectrum = self.spectrum(config, channel)?;
        Ok(spectral::relative_band_power(
            spectrum,
            band,
            config.spectral.max_freq_hz,
        ))
    }
}

fn divide(
    numerator: f64,
    denominator: f64,
    policy: &DivisionPolicy,
    epoch: usize,
    channel: &str,
    num_name: &str,
    den_name: &str,
) -> Result<f64> {
    match *policy {
        DivisionPolicy::Propagate => Ok(numerator / denominator),
        DivisionPolicy::Reject { min_denominator } => {
            if denominator.abs() < min_denominator {
                Err(EpochError::ZeroDenominator {
                    epoch,
                    channel: channel.to_string(),
                    numerator: num_name.to_string(),
                    denominator: den_name.to_string(),
                    value: denominator,
                })
            } else {
                Ok(numerator / denominator)
            }
        }
    }
}

fn compute_row(
    epoch: &Epoch,
    config: &PipelineConfig,
    band_set: &[FrequencyBand],
    schema: &[FeatureKey],
) -> Result<FeatureRow> {
    let spectra = EpochSpectra::compute(epoch, config)?;

    let mut values = Vec::with_capacity(schema.len());
    for key in schema {
        let value = match key {
            FeatureKey::BandPower { channel, band } => {
                spectra.relative_power(config, channel, band)?
            }
            FeatureKey::BandRatio {
                channel,
                numerator,
                denominator,
            } => {
                let num_band = bands::band_by_name(band_set, numerator)?;
                let den_band = bands::band_by_name(band_set, denominator)?;
                let num = spectra.relative_power(config, channel, num_band)?;
                let den = spectra.relative_power(config, channel, den_band)?;
                divide(
                    num,
                    den,
                    &config.features.division,
                    epoch.index,
                    channel,
                    numerator,
                    denominator,
                )?
            }
            FeatureKey::ChannelDifference {
                channel_a,
                channel_b,
                band,
            } => {
                let a = spectra.relative_power(config, channel_a, band)?;
                let b = spectra.relative_power(config, channel_b, band)?;
                a - b
            }
            FeatureKey::InstAmplitudeMean { channel } => {
                let samples = &epoch
                    .channel(channel)
                    .ok_or_else(|| EpochError::MissingChannel(channel.clone()))?
                    .samples;
                mean(&analytic::instantaneous_amplitude(samples))
            }
            FeatureKey::InstFrequencyMean { channel } => {
                let samples = &epoch
                    .channel(channel)
                    .ok_or_else(|| EpochError::MissingChannel(channel.clone()))?
                    .samples;
                mean(&analytic::instantaneous_frequency(
                    samples,
                    config.sample_rate_hz,
                ))
            }
        };
        values.push(value);
    }

    Ok(FeatureRow {
        epoch: epoch.index,
        y: epoch.label.clone(),
        values,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Aggregate an epoch collection into a feature table.
///
/// Refuses truncated epochs up front: a short window must be dealt with
/// (re-recorded or dropped by the caller) before it can reach any statistic.
pub fn aggregate(collection: &EpochCollection, config: &PipelineConfig) -> Result<FeatureTable> {
    profile_scope!("features::aggregate");
    config.validate()?;
    collection.check_integrity()?;

    let band_set = config.spectral.bands()?;
    let schema = build_schema(config, &band_set);

    // Fail on a missing channel before spawning any spectral work
    if let Some(first) = collection.epochs.first() {
        for label in &config.eeg_channels {
            if first.channel(label).is_none() {
                return Err(EpochError::MissingChannel(label.clone()));
            }
        }
    }

    let rows: Vec<FeatureRow> = collection
        .epochs
        .par_iter()
        .map(|epoch| compute_row(epoch, config, &band_set, &schema))
        .collect::<Result<Vec<_>>>()?;

    log::info!(
        "aggregated {} epochs into {} feature columns",
        rows.len(),
        schema.len()
    );

    Ok(FeatureTable { schema, rows })
}
