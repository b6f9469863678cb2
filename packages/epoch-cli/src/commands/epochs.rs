use epoch_rs::{EpochCollection, EpochDefect, Pipeline};
use serde::Serialize;

use crate::cli::EpochsArgs;
use crate::exit_codes;
use crate::loader;
use crate::output;
use crate::params;

#[derive(Serialize)]
struct EpochsOutput {
    source_file: String,
    n_epochs: usize,
    sample_rate_hz: f64,
    samples_per_epoch: usize,
    defects: Vec<EpochDefect>,
    epochs: EpochCollection,
}

pub fn execute(args: EpochsArgs) -> i32 {
    let config = match params::build_config(&args.pipeline) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let pipeline = match Pipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    let label_map = match args
        .pipeline
        .label_map
        .as_deref()
        .map(params::parse_label_map)
        .transpose()
    {
        Ok(map) => map.unwrap_or_default(),
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let loaded = match loader::load_recording(
        &args.file,
        &args.pipeline.eeg_channels,
        &args.pipeline.artifact_channels,
        args.pipeline.sr,
    ) {
        Ok(l) => l,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let events = match loader::load_events(&args.events, &loaded.marker_onsets, &label_map) {
        Ok(e) => e,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::DATA_ERROR;
        }
    };

    let collection = match pipeline.extract(&loaded.recording, &events) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Extraction failed: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    let defects = collection.integrity_report();
    if !defects.is_empty() {
        eprintln!(
            "Warning: {} truncated channel slice(s); see the defects field",
            defects.len()
        );
    }

    let report = EpochsOutput {
        source_file: args.file.clone(),
        n_epochs: collection.len(),
        sample_rate_hz: collection.sample_rate_hz,
        samples_per_epoch: collection.samples_per_epoch,
        defects,
        epochs: collection,
    };

    match output::to_json(&report, args.compact) {
        Ok(json) => {
            if let Err(e) = output::write_output(&json, args.output.as_deref()) {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing epochs: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}
