//! Trial segmentation: continuous recording + event list -> epoch table.

use crate::config::PipelineConfig;
use crate::error::{EpochError, Result};
use crate::profile_scope;
use crate::types::{Epoch, EpochChannel, EpochCollection, EventList, Recording};

/// Cut one fixed-duration epoch per event.
///
/// The window for event i covers the samples strictly after the onset:
/// indices `floor(onset * fs) + 1 ..= floor(onset * fs) + L` with
/// `L = round(trial_duration * fs)`. Events outside the recording are
/// rejected; windows running past the end of the recording produce short
/// epochs that the collection's integrity report surfaces.
pub fn extract(
    recording: &Recording,
    events: &EventList,
    config: &PipelineConfig,
) -> Result<EpochCollection> {
    profile_scope!("epoching::extract");
    config.validate()?;

    let sample_rate = config.sample_rate_hz;
    let samples_per_epoch = config.samples_per_epoch();
    let n_samples = recording.n_samples();
    let duration_s = recording.duration_s();

    // Resolve configured channels up front so a typo fails before any
    // epoch is built
    let channel_labels = config.epoch_channels();
    let mut series = Vec::with_capacity(channel_labels.len());
    for label in &channel_labels {
        let ch = recording
            .channel(label)
            .ok_or_else(|| EpochError::MissingChannel(label.clone()))?;
        series.push(ch);
    }

    let mut epochs = Vec::with_capacity(events.len());
    for (index, event) in events.events().iter().enumerate() {
        if event.onset_s < 0.0 || event.onset_s >= duration_s {
            return Err(EpochError::EventOutOfRange {
                index,
                onset: event.onset_s,
                duration: duration_s,
            });
        }

        let first = (event.onset_s * sample_rate).floor() as usize + 1;
        let end = (first + samples_per_epoch).min(n_samples);
        let start = first.min(end);

        if end - start < samples_per_epoch {
            log::warn!(
                "epoch {} at {:.3}s is truncated: {} of {} samples",
                index,
                event.onset_s,
                end - start,
                samples_per_epoch
            );
        }

        let channels = series
            .iter()
            .map(|ch| EpochChannel {
                label: ch.label.clone(),
                samples: ch.samples[start..end].to_vec(),
            })
            .collect();

        epochs.push(Epoch {
            index,
            label: event.label.clone(),
            onset_s: event.onset_s,
            channels,
        });
    }

    log::info!(
        "extracted {} epochs of {} nominal samples from '{}'",
        epochs.len(),
        samples_per_epoch,
        recording.metadata.source_file
    );

    Ok(EpochCollection {
        epochs,
        sample_rate_hz: sample_rate,
        samples_per_epoch,
    })
}
