use epoch_rs::Pipeline;

use crate::cli::{OutputFormat, RunArgs};
use crate::exit_codes;
use crate::loader;
use crate::output;
use crate::params;

pub fn execute(args: RunArgs) -> i32 {
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

    if !args.quiet {
        eprintln!("Running pipeline on {}...", args.file);
        eprintln!("  Events: {}", events.len());
        eprintln!("  EEG channels: {:?}", args.pipeline.eeg_channels);
        eprintln!(
            "  Trial: {}s at {} Hz",
            args.pipeline.trial_duration, args.pipeline.sr
        );
    }

    let result = match pipeline.run(&loaded.recording, &events) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Pipeline failed: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    let rendered = match args.format {
        OutputFormat::Json => output::to_json(&result, args.compact),
        OutputFormat::Csv => output::feature_table_to_csv(&result.features),
    };

    match rendered {
        Ok(text) => {
            if let Err(e) = output::write_output(&text, args.output.as_deref()) {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
            if !args.quiet {
                if let Some(ref path) = args.output {
                    eprintln!("Results written to {}", path);
                }
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing result: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}
