use std::path::Path;
use std::time::Instant;

use epoch_rs::{AnalysisResult, Pipeline, PipelineConfig};
use rayon::prelude::*;

use crate::cli::BatchArgs;
use crate::exit_codes;
use crate::loader;
use crate::output;
use crate::params;

pub fn execute(args: BatchArgs) -> i32 {
    let files = match resolve_files(&args) {
        Ok(f) => f,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    if files.is_empty() {
        eprintln!("Error: No matching files found");
        return exit_codes::INPUT_ERROR;
    }

    if args.dry_run {
        for f in &files {
            println!("{}", f);
        }
        if !args.quiet {
            eprintln!("Found {} file(s)", files.len());
        }
        return exit_codes::SUCCESS;
    }

    let config = match params::build_config(&args.pipeline) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
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

    if let Some(ref dir) = args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Error: Failed to create output directory '{}': {}", dir, e);
            return exit_codes::EXECUTION_ERROR;
        }
    }

    let total = files.len();
    let start_time = Instant::now();

    // Sequential with an early stop by default; parallel when failures are
    // tolerated (per-file results stay independent either way)
    let outcomes: Vec<(String, Result<AnalysisResult, String>)> = if args.continue_on_error {
        files
            .par_iter()
            .map(|file| (file.clone(), process_file(file, &args, &config, &label_map)))
            .collect()
    } else {
        let mut out = Vec::with_capacity(total);
        for file in &files {
            let result = process_file(file, &args, &config, &label_map);
            let failed = result.is_err();
            out.push((file.clone(), result));
            if failed {
                break;
            }
        }
        out
    };

    let mut succeeded = 0usize;
    let mut failed = 0usize;
    for (i, (file, outcome)) in outcomes.iter().enumerate() {
        if !args.quiet {
            eprintln!("[{}/{}] {}...", i + 1, total, file);
        }
        match outcome {
            Ok(result) => match emit_result(file, result, &args) {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    eprintln!("  Error writing output: {}", e);
                    failed += 1;
                }
            },
            Err(e) => {
                eprintln!("  Error: {}", e);
                failed += 1;
            }
        }
    }

    if !args.quiet {
        eprintln!(
            "Batch complete: {}/{} succeeded, {}/{} failed, {:.1}s",
            succeeded,
            total,
            failed,
            total,
            start_time.elapsed().as_secs_f64()
        );
    }

    if failed == 0 {
        exit_codes::SUCCESS
    } else if succeeded > 0 {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::EXECUTION_ERROR
    }
}

fn process_file(
    file: &str,
    args: &BatchArgs,
    config: &PipelineConfig,
    label_map: &[(String, String)],
) -> Result<AnalysisResult, String> {
    let events_path = resolve_events_path(file, args)?;

    let loaded = loader::load_recording(
        file,
        &args.pipeline.eeg_channels,
        &args.pipeline.artifact_channels,
        args.pipeline.sr,
    )?;
    let events = loader::load_events(&events_path, &loaded.marker_onsets, label_map)?;

    let pipeline = Pipeline::new(config.clone()).map_err(|e| e.to_string())?;
    pipeline
        .run(&loaded.recording, &events)
        .map_err(|e| e.to_string())
}

fn resolve_events_path(file: &str, args: &BatchArgs) -> Result<String, String> {
    if let Some(ref shared) = args.events {
        return Ok(shared.clone());
    }
    let path = Path::new(file);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("Cannot derive events file for '{}'", file))?;
    let candidate = path.with_file_name(format!("{}_events.csv", stem));
    if !candidate.exists() {
        return Err(format!(
            "Events file '{}' not found (use --events for a shared file)",
            candidate.display()
        ));
    }
    Ok(candidate.to_string_lossy().to_string())
}

fn emit_result(file: &str, result: &AnalysisResult, args: &BatchArgs) -> Result<(), String> {
    if let Some(ref dir) = args.output_dir {
        let stem = Path::new(file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        let out_path = Path::new(dir).join(format!("{}_features.json", stem));
        let json = output::to_json(result, args.compact)?;
        output::write_output(&json, out_path.to_str())
    } else {
        // JSONL to stdout
        let json = output::to_json(result, true)?;
        output::write_output(&json, None)
    }
}

fn resolve_files(args: &BatchArgs) -> Result<Vec<String>, String> {
    if let Some(ref pattern) = args.glob {
        resolve_glob(pattern)
    } else if let Some(ref files) = args.files {
        Ok(files.clone())
    } else {
        Err("One of --glob or --files must be specified".to_string())
    }
}

fn resolve_glob(pattern: &str) -> Result<Vec<String>, String> {
    let paths =
        glob::glob(pattern).map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;

    let mut files: Vec<String> = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    if let Some(s) = path.to_str() {
                        files.push(s.to_string());
                    }
                }
            }
            Err(e) => {
                eprintln!("Warning: glob error: {}", e);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PipelineArgs;
    use std::fs;

    fn make_batch_args() -> BatchArgs {
        BatchArgs {
            glob: None,
            files: None,
            events: None,
            pipeline: PipelineArgs {
                eeg_channels: vec!["C3".to_string(), "C4".to_string()],
                artifact_channels: vec![],
                classes: vec!["left".to_string(), "right".to_string()],
                sr: 250.0,
                trial_duration: 4.0,
                bands: vec![0.5, 4.0, 7.0, 12.0, 30.0],
                band_names: None,
                max_freq: None,
                welch_segment: None,
                welch_overlap: None,
                ratios: vec!["theta/beta".to_string()],
                diff_pair: "C3,C4".to_string(),
                propagate_division: false,
                min_denominator: 1e-12,
                instantaneous: false,
                label_map: None,
            },
            output_dir: None,
            continue_on_error: false,
            dry_run: false,
            compact: false,
            quiet: true,
        }
    }

    #[test]
    fn test_resolve_files_requires_an_input_mode() {
        let args = make_batch_args();
        let result = resolve_files(&args);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("must be specified"));
    }

    #[test]
    fn test_resolve_files_explicit_list() {
        let mut args = make_batch_args();
        args.files = Some(vec!["/tmp/a.csv".to_string(), "/tmp/b.csv".to_string()]);
        let result = resolve_files(&args).unwrap();
        assert_eq!(result, vec!["/tmp/a.csv", "/tmp/b.csv"]);
    }

    #[test]
    fn test_resolve_glob_no_matches() {
        let result = resolve_glob("/nonexistent_dir_12345/*.csv").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_resolve_glob_with_temp_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.csv"), "").unwrap();
        fs::write(tmp.path().join("b.csv"), "").unwrap();
        fs::write(tmp.path().join("c.txt"), "").unwrap();

        let pattern = format!("{}/*.csv", tmp.path().to_str().unwrap());
        let result = resolve_glob(&pattern).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_events_path_convention() {
        let tmp = tempfile::tempdir().unwrap();
        let rec = tmp.path().join("sub01.csv");
        let ev = tmp.path().join("sub01_events.csv");
        fs::write(&rec, "").unwrap();
        fs::write(&ev, "").unwrap();

        let args = make_batch_args();
        let resolved = resolve_events_path(rec.to_str().unwrap(), &args).unwrap();
        assert!(resolved.ends_with("sub01_events.csv"));
    }

    #[test]
    fn test_missing_events_file_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let rec = tmp.path().join("sub01.csv");
        fs::write(&rec, "").unwrap();

        let args = make_batch_args();
        let err = resolve_events_path(rec.to_str().unwrap(), &args).unwrap_err();
        assert!(err.contains("sub01_events.csv"));
    }

    #[test]
    fn test_shared_events_file_wins() {
        let mut args = make_batch_args();
        args.events = Some("/tmp/shared_events.csv".to_string());
        let resolved = resolve_events_path("/tmp/sub01.csv", &args).unwrap();
        assert_eq!(resolved, "/tmp/shared_events.csv");
    }
}
