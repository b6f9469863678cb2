use epoch_rs::EpochError;

pub const SUCCESS: i32 = 0;
pub const EXECUTION_ERROR: i32 = 1;
pub const INPUT_ERROR: i32 = 2;
pub const DATA_ERROR: i32 = 3;
pub const PARTIAL_FAILURE: i32 = 4;

/// Map an engine error to a process exit code: configuration mistakes are
/// input errors, everything the data did wrong is a data error.
pub fn for_error(err: &EpochError) -> i32 {
    match err {
        EpochError::MissingChannel(_)
        | EpochError::UnknownBand(_)
        | EpochError::InvalidBoundaries(_)
        | EpochError::InvalidConfig(_)
        | EpochError::UndeclaredClass(_) => INPUT_ERROR,
        EpochError::EmptyRecording
        | EpochError::ChannelLengthMismatch { .. }
        | EpochError::EventOutOfRange { .. }
        | EpochError::MisalignedEvents { .. }
        | EpochError::UnorderedEvents { .. }
        | EpochError::TruncatedEpoch { .. }
        | EpochError::ZeroDenominator { .. }
        | EpochError::EmptyClass(_) => DATA_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_input_errors() {
        let err = EpochError::MissingChannel("C3".to_string());
        assert_eq!(for_error(&err), INPUT_ERROR);
    }

    #[test]
    fn test_data_defects_are_data_errors() {
        let err = EpochError::TruncatedEpoch {
            epoch: 3,
            channel: "C4".to_string(),
            expected: 1000,
            actual: 700,
        };
        assert_eq!(for_error(&err), DATA_ERROR);
    }
}
