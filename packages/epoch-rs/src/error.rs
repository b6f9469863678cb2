use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpochError {
    #[error("Channel '{0}' not found in input data")]
    MissingChannel(String),

    #[error("Unknown band '{0}' referenced by the feature configuration")]
    UnknownBand(String),

    #[error("Invalid band boundaries: {0}")]
    InvalidBoundaries(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Recording contains no samples")]
    EmptyRecording,

    #[error("Channel '{channel}' has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: String,
        expected: usize,
        actual: usize,
    },

    #[error("Event {index} at {onset:.3}s lies outside the recording ({duration:.3}s)")]
    EventOutOfRange {
        index: usize,
        onset: f64,
        duration: f64,
    },

    #[error("Event/label misalignment: {onsets} onsets paired with {labels} labels")]
    MisalignedEvents { onsets: usize, labels: usize },

    #[error("Events are not ordered: event {index} at {onset:.3}s does not follow {previous:.3}s")]
    UnorderedEvents {
        index: usize,
        onset: f64,
        previous: f64,
    },

    #[error("Epoch {epoch} channel '{channel}' is truncated: {actual} of {expected} samples")]
    TruncatedEpoch {
        epoch: usize,
        channel: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Band ratio {numerator}/{denominator} undefined for epoch {epoch} channel '{channel}': \
         denominator {value:e} below threshold"
    )]
    ZeroDenominator {
        epoch: usize,
        channel: String,
        numerator: String,
        denominator: String,
        value: f64,
    },

    #[error("Class '{0}' has no epochs; mean and standard error are undefined")]
    EmptyClass(String),

    #[error("Label '{0}' appears in the data but is not a declared class")]
    UndeclaredClass(String),
}

pub type Result<T> = std::result::Result<T, EpochError>;
