use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::{EpochError, Result};
use crate::features::FeatureTable;
use crate::stats::ClassStat;

/// Electrode/sensor category of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Eeg,
    Eog,
    Other,
}

/// One channel of a recording: an ordered sample sequence at the shared
/// sample rate, in physical units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSeries {
    pub label: String,
    pub kind: ChannelKind,
    pub unit: String,
    pub samples: Vec<f64>,
}

/// Metadata about a continuous recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub source_file: String,
    pub sample_rate_hz: f64,
    pub duration_s: f64,
    pub start_time: Option<String>,
    pub subject_id: Option<String>,
}

/// A continuous multi-channel recording on one uniform time axis.
///
/// Sample k of every channel sits at `k / sample_rate_hz` seconds, so the
/// time index is monotonic by construction. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub metadata: RecordingMetadata,
    channels: Vec<ChannelSeries>,
}

impl Recording {
    /// Build a recording, checking that every channel carries the same
    /// number of samples and that there is at least one sample.
    pub fn new(metadata: RecordingMetadata, channels: Vec<ChannelSeries>) -> Result<Self> {
        let n = channels.first().map(|c| c.samples.len()).unwrap_or(0);
        if n == 0 {
            return Err(EpochError::EmptyRecording);
        }
        for ch in &channels {
            if ch.samples.len() != n {
                return Err(EpochError::ChannelLengthMismatch {
                    channel: ch.label.clone(),
                    expected: n,
                    actual: ch.samples.len(),
                });
            }
        }
        Ok(Self { metadata, channels })
    }

    pub fn channels(&self) -> &[ChannelSeries] {
        &self.channels
    }

    pub fn channel(&self, label: &str) -> Option<&ChannelSeries> {
        self.channels.iter().find(|c| c.label == label)
    }

    pub fn n_samples(&self) -> usize {
        self.channels.first().map(|c| c.samples.len()).unwrap_or(0)
    }

    /// Recording length in seconds, derived from the sample count.
    pub fn duration_s(&self) -> f64 {
        self.n_samples() as f64 / self.metadata.sample_rate_hz
    }
}

/// A trial-onset marker: when it happened and which class it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub onset_s: f64,
    pub label: String,
}

/// An ordered event list.
///
/// Construction validates ordering, so downstream code never re-checks it.
/// The paired-sequence constructor replaces positional index matching
/// between two independent collections with a checked zip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventList {
    events: Vec<Event>,
}

impl EventList {
    pub fn new(events: Vec<Event>) -> Result<Self> {
        let mut previous = f64::NEG_INFINITY;
        for (index, ev) in events.iter().enumerate() {
            if ev.label.trim().is_empty() {
                return Err(EpochError::InvalidConfig(format!(
                    "event {} has an empty label",
                    index
                )));
            }
            if ev.onset_s <= previous {
                return Err(EpochError::UnorderedEvents {
                    index,
                    onset: ev.onset_s,
                    previous,
                });
            }
            previous = ev.onset_s;
        }
        Ok(Self { events })
    }

    /// Pair onsets with labels positionally, failing when the counts differ.
    pub fn from_pairs(onsets: &[f64], labels: &[String]) -> Result<Self> {
        if onsets.len() != labels.len() {
            return Err(EpochError::MisalignedEvents {
                onsets: onsets.len(),
                labels: labels.len(),
            });
        }
        let events = onsets
            .iter()
            .zip(labels.iter())
            .map(|(&onset_s, label)| Event {
                onset_s,
                label: label.clone(),
            })
            .collect();
        Self::new(events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// One channel's slice inside an epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochChannel {
    pub label: String,
    pub samples: Vec<f64>,
}

/// A fixed-duration, labeled window cut from the recording after one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Epoch {
    pub index: usize,
    pub label: String,
    pub onset_s: f64,
    pub channels: Vec<EpochChannel>,
}

impl Epoch {
    pub fn channel(&self, label: &str) -> Option<&EpochChannel> {
        self.channels.iter().find(|c| c.label == label)
    }

    /// Whether every channel slice reached the nominal length.
    pub fn is_complete(&self, expected_samples: usize) -> bool {
        self.channels
            .iter()
            .all(|c| c.samples.len() == expected_samples)
    }
}

/// A short channel slice found by the integrity check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochDefect {
    pub epoch: usize,
    pub channel: String,
    pub expected: usize,
    pub actual: usize,
}

/// The epoch table produced by extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochCollection {
    pub epochs: Vec<Epoch>,
    pub sample_rate_hz: f64,
    /// Nominal samples per epoch (`trial_duration x sample_rate`)
    pub samples_per_epoch: usize,
}

impl EpochCollection {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Every channel slice that fell short of the nominal length.
    ///
    /// Epochs whose window ran past the end of the recording show up here;
    /// the extractor produces them without padding, and consumers decide
    /// what to do with the defect.
    pub fn integrity_report(&self) -> Vec<EpochDefect> {
        let mut defects = Vec::new();
        for epoch in &self.epochs {
            for ch in &epoch.channels {
                if ch.samples.len() != self.samples_per_epoch {
                    defects.push(EpochDefect {
                        epoch: epoch.index,
                        channel: ch.label.clone(),
                        expected: self.samples_per_epoch,
                        actual: ch.samples.len(),
                    });
                }
            }
        }
        defects
    }

    /// Fail on the first short epoch, with its location in the error.
    pub fn check_integrity(&self) -> Result<()> {
        match self.integrity_report().into_iter().next() {
            None => Ok(()),
            Some(defect) => Err(EpochError::TruncatedEpoch {
                epoch: defect.epoch,
                channel: defect.channel,
                expected: defect.expected,
                actual: defect.actual,
            }),
        }
    }
}

/// Full pipeline output: feature table plus per-class statistics, wrapped
/// with identifiers so results can be stored or compared across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: String,
    pub source_file: String,
    pub created_at: String,
    pub config: PipelineConfig,
    pub n_epochs: usize,
    pub features: FeatureTable,
    pub class_stats: Vec<ClassStat>,
}

impl AnalysisResult {
    pub fn new(
        source_file: String,
        config: PipelineConfig,
        n_epochs: usize,
        features: FeatureTable,
        class_stats: Vec<ClassStat>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_file,
            created_at: chrono::Utc::now().to_rfc3339(),
            config,
            n_epochs,
            features,
            class_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(label: &str, n: usize) -> ChannelSeries {
        ChannelSeries {
            label: label.to_string(),
            kind: ChannelKind::Eeg,
            unit: "uV".to_string(),
            samples: vec![0.0; n],
        }
    }

    fn metadata() -> RecordingMetadata {
        RecordingMetadata {
            source_file: "test.csv".to_string(),
            sample_rate_hz: 250.0,
            duration_s: 4.0,
            start_time: None,
            subject_id: None,
        }
    }

    #[test]
    fn test_recording_rejects_mismatched_channels() {
        let err = Recording::new(metadata(), vec![channel("C3", 100), channel("C4", 99)])
            .unwrap_err();
        assert!(err.to_string().contains("C4"));
    }

    #[test]
    fn test_recording_rejects_empty() {
        assert!(Recording::new(metadata(), vec![]).is_err());
        assert!(Recording::new(metadata(), vec![channel("C3", 0)]).is_err());
    }

    #[test]
    fn test_recording_duration() {
        let rec = Recording::new(metadata(), vec![channel("C3", 500)]).unwrap();
        assert!((rec.duration_s() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_event_list_rejects_unordered() {
        let events = vec![
            Event {
                onset_s: 4.0,
                label: "left".to_string(),
            },
            Event {
                onset_s: 2.0,
                label: "right".to_string(),
            },
        ];
        let err = EventList::new(events).unwrap_err();
        assert!(matches!(err, EpochError::UnorderedEvents { index: 1, .. }));
    }

    #[test]
    fn test_event_list_from_pairs_checks_counts() {
        let onsets = vec![0.0, 4.0, 8.0];
        let labels = vec!["left".to_string(), "right".to_string()];
        let err = EventList::from_pairs(&onsets, &labels).unwrap_err();
        assert!(matches!(
            err,
            EpochError::MisalignedEvents {
                onsets: 3,
                labels: 2
            }
        ));
    }

    #[test]
    fn test_event_list_from_pairs() {
        let onsets = vec![0.0, 4.0];
        let labels = vec!["left".to_string(), "right".to_string()];
        let events = EventList::from_pairs(&onsets, &labels).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events.events()[1].label, "right");
    }

    #[test]
    fn test_integrity_report_flags_short_epochs() {
        let collection = EpochCollection {
            epochs: vec![Epoch {
                index: 0,
                label: "left".to_string(),
                onset_s: 0.0,
                channels: vec![
                    EpochChannel {
                        label: "C3".to_string(),
                        samples: vec![0.0; 1000],
                    },
                    EpochChannel {
                        label: "C4".to_string(),
                        samples: vec![0.0; 700],
                    },
                ],
            }],
            sample_rate_hz: 250.0,
            samples_per_epoch: 1000,
        };
        let report = collection.integrity_report();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].channel, "C4");
        assert_eq!(report[0].actual, 700);
        assert!(collection.check_integrity().is_err());
    }
}
