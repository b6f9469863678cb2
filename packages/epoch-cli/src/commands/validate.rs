use serde::Serialize;
use std::path::Path;

use crate::cli::ValidateArgs;
use crate::exit_codes;
use crate::loader;
use crate::output;
use crate::params;

#[derive(Serialize)]
struct ValidateOutput {
    file: String,
    events_file: Option<String>,
    exists: bool,
    readable: bool,
    n_channels: Option<usize>,
    n_samples: Option<usize>,
    n_markers: Option<usize>,
    n_events: Option<usize>,
    missing_channels: Vec<String>,
    errors: Vec<String>,
}

pub fn execute(args: ValidateArgs) -> i32 {
    let mut errors: Vec<String> = Vec::new();

    let path = Path::new(&args.file);
    let exists = path.exists();
    let readable = path.is_file() && std::fs::File::open(path).is_ok();
    if !exists {
        errors.push(format!("File not found: {}", args.file));
    } else if !readable {
        errors.push(format!("File is not readable: {}", args.file));
    }

    let config = match params::build_config(&args.pipeline) {
        Ok(c) => Some(c),
        Err(msg) => {
            errors.push(msg);
            None
        }
    };

    let mut n_channels = None;
    let mut n_samples = None;
    let mut n_markers = None;
    let mut n_events = None;
    let mut missing_channels = Vec::new();

    let loaded = if readable {
        match loader::load_recording(
            &args.file,
            &args.pipeline.eeg_channels,
            &args.pipeline.artifact_channels,
            args.pipeline.sr,
        ) {
            Ok(loaded) => {
                n_channels = Some(loaded.recording.channels().len());
                n_samples = Some(loaded.recording.n_samples());
                n_markers = Some(loaded.marker_onsets.len());
                if let Some(ref config) = config {
                    for label in config.epoch_channels() {
                        if loaded.recording.channel(&label).is_none() {
                            missing_channels.push(label.clone());
                            errors.push(format!("Channel '{}' not found in recording", label));
                        }
                    }
                }
                Some(loaded)
            }
            Err(msg) => {
                errors.push(msg);
                None
            }
        }
    } else {
        None
    };

    if let (Some(events_path), Some(loaded)) = (args.events.as_deref(), loaded.as_ref()) {
        let label_map = args
            .pipeline
            .label_map
            .as_deref()
            .map(params::parse_label_map)
            .transpose()
            .unwrap_or_else(|msg| {
                errors.push(msg);
                None
            })
            .unwrap_or_default();

        match loader::load_events(events_path, &loaded.marker_onsets, &label_map) {
            Ok(events) => {
                n_events = Some(events.len());
                let duration = loaded.recording.duration_s();
                for (index, event) in events.events().iter().enumerate() {
                    if event.onset_s < 0.0 || event.onset_s >= duration {
                        errors.push(format!(
                            "Event {} at {:.3}s lies outside the recording ({:.3}s)",
                            index, event.onset_s, duration
                        ));
                    }
                }
            }
            Err(msg) => errors.push(msg),
        }
    }

    let report = ValidateOutput {
        file: args.file.clone(),
        events_file: args.events.clone(),
        exists,
        readable,
        n_channels,
        n_samples,
        n_markers,
        n_events,
        missing_channels,
        errors: errors.clone(),
    };

    if args.json {
        match output::to_json(&report, false) {
            Ok(json) => {
                if let Err(e) = output::write_output(&json, None) {
                    eprintln!("Error: {}", e);
                    return exit_codes::EXECUTION_ERROR;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    } else if errors.is_empty() {
        println!(
            "'{}' is valid ({} channels, {} samples, {} events)",
            args.file,
            n_channels.unwrap_or(0),
            n_samples.unwrap_or(0),
            n_events.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string())
        );
    } else {
        for err in &errors {
            eprintln!("Error: {}", err);
        }
    }

    if errors.is_empty() {
        exit_codes::SUCCESS
    } else if !exists || !readable {
        exit_codes::INPUT_ERROR
    } else {
        exit_codes::DATA_ERROR
    }
}
