use crate::config::PipelineConfig;
use crate::epoching;
use crate::error::Result;
use crate::features;
use crate::stats;
use crate::types::{AnalysisResult, EpochCollection, EventList, Recording};

/// Pipeline Runner
///
/// Holds a validated configuration and runs the extraction, aggregation and
/// statistics stages over in-memory recordings.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline from a configuration.
    ///
    /// Validation happens here so every later stage can assume a coherent
    /// configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extraction stage only.
    pub fn extract(&self, recording: &Recording, events: &EventList) -> Result<EpochCollection> {
        epoching::extract(recording, events, &self.config)
    }

    /// Full pipeline: epochs -> feature table -> per-class statistics.
    pub fn run(&self, recording: &Recording, events: &EventList) -> Result<AnalysisResult> {
        log::info!(
            "running pipeline on '{}': {} events, {} EEG channels",
            recording.metadata.source_file,
            events.len(),
            self.config.eeg_channels.len()
        );

        let epochs = self.extract(recording, events)?;
        let table = features::aggregate(&epochs, &self.config)?;
        let class_stats = stats::class_statistics(&table, &self.config.class_labels)?;

        Ok(AnalysisResult::new(
            recording.metadata.source_file.clone(),
            self.config.clone(),
            epochs.len(),
            table,
            class_stats,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EpochError;

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut config = PipelineConfig::default();
        config.eeg_channels.clear();
        let err = Pipeline::new(config).unwrap_err();
        assert!(matches!(err, EpochError::InvalidConfig(_)));
    }
}
