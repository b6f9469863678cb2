use epoch_rs::{DivisionPolicy, PipelineConfig, PsdMethod};

use crate::cli::PipelineArgs;

/// Parse a band-ratio selector "numerator/denominator".
pub fn parse_ratio(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 2 || parts[0].trim().is_empty() || parts[1].trim().is_empty() {
        return Err(format!(
            "Invalid ratio '{}': expected 'numerator/denominator' band names",
            s
        ));
    }
    Ok((parts[0].trim().to_string(), parts[1].trim().to_string()))
}

/// Parse a channel pair "a,b"; "none" disables the feature.
pub fn parse_channel_pair(s: &str) -> Result<Option<(String, String)>, String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 || parts[0].trim().is_empty() || parts[1].trim().is_empty() {
        return Err(format!(
            "Invalid channel pair '{}': expected 'a,b' channel names",
            s
        ));
    }
    Ok(Some((
        parts[0].trim().to_string(),
        parts[1].trim().to_string(),
    )))
}

/// Parse a label map "1=left,2=right" into (code, label) pairs.
pub fn parse_label_map(s: &str) -> Result<Vec<(String, String)>, String> {
    s.split(',')
        .map(|entry| {
            let parts: Vec<&str> = entry.split('=').collect();
            if parts.len() != 2 || parts[0].trim().is_empty() || parts[1].trim().is_empty() {
                return Err(format!(
                    "Invalid label map entry '{}': expected 'code=label'",
                    entry
                ));
            }
            Ok((parts[0].trim().to_string(), parts[1].trim().to_string()))
        })
        .collect()
}

/// Assemble the engine configuration from command-line flags.
pub fn build_config(args: &PipelineArgs) -> Result<PipelineConfig, String> {
    let ratio_pairs = args
        .ratios
        .iter()
        .map(|s| parse_ratio(s))
        .collect::<Result<Vec<_>, String>>()?;
    let difference_pair = parse_channel_pair(&args.diff_pair)?;

    let method = match (args.welch_segment, args.welch_overlap) {
        (Some(segment_len), overlap) => PsdMethod::Welch {
            segment_len,
            overlap: overlap.unwrap_or(segment_len / 2),
        },
        (None, Some(_)) => {
            return Err("--welch-overlap requires --welch-segment".to_string());
        }
        (None, None) => PsdMethod::Periodogram,
    };

    let division = if args.propagate_division {
        DivisionPolicy::Propagate
    } else {
        DivisionPolicy::Reject {
            min_denominator: args.min_denominator,
        }
    };

    let max_freq_hz = match args.max_freq {
        Some(f) => f,
        None => args
            .bands
            .last()
            .copied()
            .ok_or_else(|| "At least two band boundaries are required".to_string())?,
    };

    let mut config = PipelineConfig::default();
    config.sample_rate_hz = args.sr;
    config.eeg_channels = args.eeg_channels.clone();
    config.artifact_channels = args.artifact_channels.clone();
    config.class_labels = args.classes.clone();
    config.epoching.trial_duration_s = args.trial_duration;
    config.spectral.band_boundaries_hz = args.bands.clone();
    config.spectral.band_names = args.band_names.clone();
    config.spectral.max_freq_hz = max_freq_hz;
    config.spectral.method = method;
    config.features.ratio_pairs = ratio_pairs;
    config.features.difference_pair = difference_pair;
    config.features.division = division;
    config.features.instantaneous = args.instantaneous;

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}
