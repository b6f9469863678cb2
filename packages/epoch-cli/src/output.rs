use std::io::Write;
use std::path::Path;

use epoch_rs::FeatureTable;

/// Write a string to stdout or a file.
pub fn write_output(text: &str, output_path: Option<&str>) -> Result<(), String> {
    match output_path {
        Some(path) => std::fs::write(Path::new(path), text)
            .map_err(|e| format!("Failed to write output file '{}': {}", path, e)),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .and_then(|_| handle.write_all(b"\n"))
                .map_err(|e| format!("Failed to write to stdout: {}", e))
        }
    }
}

/// Serialize a value to JSON (pretty or compact).
pub fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String, String> {
    if compact {
        serde_json::to_string(value).map_err(|e| format!("JSON serialization failed: {}", e))
    } else {
        serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {}", e))
    }
}

/// Render a feature table as CSV: epoch index, label column `y`, then one
/// column per feature key.
pub fn feature_table_to_csv(table: &FeatureTable) -> Result<String, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["epoch".to_string(), "y".to_string()];
    header.extend(table.column_names());
    writer
        .write_record(&header)
        .map_err(|e| format!("CSV write failed: {}", e))?;

    for row in &table.rows {
        let mut record = vec![row.epoch.to_string(), row.y.clone()];
        record.extend(row.values.iter().map(|v| format!("{:.6e}", v)));
        writer
            .write_record(&record)
            .map_err(|e| format!("CSV write failed: {}", e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| format!("CSV write failed: {}", e))?;
    String::from_utf8(bytes).map_err(|e| format!("CSV output was not UTF-8: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use epoch_rs::{FeatureKey, FeatureRow, FrequencyBand};

    #[test]
    fn test_feature_table_csv_layout() {
        let table = FeatureTable {
            schema: vec![FeatureKey::BandPower {
                channel: "C3".to_string(),
                band: FrequencyBand::new("alpha", 7.0, 12.0),
            }],
            rows: vec![FeatureRow {
                epoch: 0,
                y: "left".to_string(),
                values: vec![0.75],
            }],
        };
        let csv_text = feature_table_to_csv(&table).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(lines.next().unwrap(), "epoch,y,\"C3:(7, 12]\"");
        let row = lines.next().unwrap();
        assert!(row.starts_with("0,left,"));
        assert!(row.contains("7.5"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_output("{}", path.to_str()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
