pub mod analytic;
pub mod bands;
pub mod config;
pub mod epoching;
pub mod error;
pub mod features;
pub mod profiling;
pub mod runner;
pub mod spectral;
pub mod stats;
pub mod types;

pub use bands::{bands_from_boundaries, BandMetadata, FrequencyBand, BAND_REGISTRY};
pub use config::{
    DivisionPolicy, EpochingConfig, FeatureConfig, PipelineConfig, PsdMethod, SpectralConfig,
};
pub use error::{EpochError, Result};
pub use features::{FeatureKey, FeatureRow, FeatureTable};
pub use runner::Pipeline;
pub use stats::ClassStat;
pub use types::*;
