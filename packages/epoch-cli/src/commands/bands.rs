use epoch_rs::bands::{self, BandMetadata, CANONICAL_BOUNDARIES};
use serde::Serialize;

use crate::cli::BandsArgs;
use crate::exit_codes;
use crate::output;

#[derive(Serialize)]
struct BandRow {
    name: String,
    interval: String,
    low_hz: f64,
    high_hz: f64,
    documentation: Option<&'static str>,
}

pub fn execute(args: BandsArgs) -> i32 {
    let boundaries = args
        .bands
        .clone()
        .unwrap_or_else(|| CANONICAL_BOUNDARIES.to_vec());

    let band_set = match bands::bands_from_boundaries(&boundaries, args.band_names.as_deref()) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let rows: Vec<BandRow> = band_set
        .iter()
        .map(|band| BandRow {
            name: band.name.clone(),
            interval: band.interval_label(),
            low_hz: band.low_hz,
            high_hz: band.high_hz,
            documentation: BandMetadata::from_interval(band.low_hz, band.high_hz)
                .map(|m| m.documentation),
        })
        .collect();

    if args.json {
        match output::to_json(&rows, false) {
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
    } else {
        println!("{:<10} {:<12} {}", "NAME", "INTERVAL", "NOTES");
        for row in &rows {
            println!(
                "{:<10} {:<12} {}",
                row.name,
                row.interval,
                row.documentation.unwrap_or("")
            );
        }
    }

    exit_codes::SUCCESS
}
