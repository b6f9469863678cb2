//! CSV collaborators: continuous recordings and event lists.
//!
//! Recording CSV: a header row of column names; every column is a channel
//! except an optional `time` column (seconds, validated monotonic and
//! consistent with the sample rate) and an optional `start` column whose
//! nonzero rows mark trial onsets.
//!
//! Events CSV: either explicit `onset,label` rows, or a single label column
//! whose rows pair positionally with the recording's start markers. The
//! pairing is validated at load time; mismatched counts never get past the
//! loader.

use epoch_rs::{ChannelKind, ChannelSeries, EventList, Recording, RecordingMetadata};

#[derive(Debug)]
pub struct LoadedRecording {
    pub recording: Recording,
    /// Onsets (seconds) of rows flagged by the `start` marker column
    pub marker_onsets: Vec<f64>,
}

fn is_time_column(name: &str) -> bool {
    name.eq_ignore_ascii_case("time") || name.eq_ignore_ascii_case("t")
}

fn is_marker_column(name: &str) -> bool {
    name.eq_ignore_ascii_case("start")
}

fn channel_kind(label: &str, eeg_channels: &[String], artifact_channels: &[String]) -> ChannelKind {
    if artifact_channels.iter().any(|c| c == label) {
        ChannelKind::Eog
    } else if eeg_channels.iter().any(|c| c == label) {
        ChannelKind::Eeg
    } else {
        ChannelKind::Other
    }
}

/// Load a recording CSV.
///
/// `sample_rate_hz` is authoritative; a `time` column, when present, is
/// cross-checked against it (1% tolerance) and used for marker onsets.
pub fn load_recording(
    path: &str,
    eeg_channels: &[String],
    artifact_channels: &[String],
    sample_rate_hz: f64,
) -> Result<LoadedRecording, String> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| format!("Failed to open recording '{}': {}", path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| format!("Failed to read header of '{}': {}", path, e))?
        .clone();

    let mut time_col: Option<usize> = None;
    let mut marker_col: Option<usize> = None;
    let mut channel_cols: Vec<(usize, String)> = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        let name = name.trim();
        if is_time_column(name) && time_col.is_none() {
            time_col = Some(idx);
        } else if is_marker_column(name) && marker_col.is_none() {
            marker_col = Some(idx);
        } else {
            channel_cols.push((idx, name.to_string()));
        }
    }
    if channel_cols.is_empty() {
        return Err(format!("'{}' contains no channel columns", path));
    }

    let mut times: Vec<f64> = Vec::new();
    let mut marker_rows: Vec<usize> = Vec::new();
    let mut samples: Vec<Vec<f64>> = vec![Vec::new(); channel_cols.len()];

    for (row_idx, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| format!("Failed to read '{}' row {}: {}", path, row_idx + 1, e))?;

        let parse = |col: usize, what: &str| -> Result<f64, String> {
            record
                .get(col)
                .ok_or_else(|| format!("'{}' row {}: missing column {}", path, row_idx + 1, what))?
                .trim()
                .parse::<f64>()
                .map_err(|_| {
                    format!(
                        "'{}' row {}: column '{}' is not numeric: '{}'",
                        path,
                        row_idx + 1,
                        what,
                        record.get(col).unwrap_or("")
                    )
                })
        };

        if let Some(col) = time_col {
            let t = parse(col, "time")?;
            if let Some(&previous) = times.last() {
                if t <= previous {
                    return Err(format!(
                        "'{}' row {}: time column is not strictly increasing ({} after {})",
                        path,
                        row_idx + 1,
                        t,
                        previous
                    ));
                }
            }
            times.push(t);
        }
        if let Some(col) = marker_col {
            if parse(col, "start")? != 0.0 {
                marker_rows.push(row_idx);
            }
        }
        for (slot, (col, name)) in channel_cols.iter().enumerate() {
            samples[slot].push(parse(*col, name)?);
        }
    }

    let n_samples = samples[0].len();
    if n_samples == 0 {
        return Err(format!("'{}' contains no data rows", path));
    }

    // Cross-check the declared rate against the time axis
    if n_samples > 1 && !times.is_empty() {
        let span = times[n_samples - 1] - times[0];
        if span > 0.0 {
            let inferred = (n_samples - 1) as f64 / span;
            if ((inferred - sample_rate_hz) / sample_rate_hz).abs() > 0.01 {
                return Err(format!(
                    "'{}': time column implies {:.2} Hz but --sr is {:.2} Hz",
                    path, inferred, sample_rate_hz
                ));
            }
        }
    }

    let marker_onsets: Vec<f64> = marker_rows
        .iter()
        .map(|&row| {
            if times.is_empty() {
                row as f64 / sample_rate_hz
            } else {
                times[row]
            }
        })
        .collect();

    let channels = channel_cols
        .iter()
        .zip(samples)
        .map(|((_, label), samples)| ChannelSeries {
            label: label.clone(),
            kind: channel_kind(label, eeg_channels, artifact_channels),
            unit: "uV".to_string(),
            samples,
        })
        .collect();

    let recording = Recording::new(
        RecordingMetadata {
            source_file: path.to_string(),
            sample_rate_hz,
            duration_s: n_samples as f64 / sample_rate_hz,
            start_time: None,
            subject_id: None,
        },
        channels,
    )
    .map_err(|e| e.to_string())?;

    log::info!(
        "loaded '{}': {} channels x {} samples, {} start markers",
        path,
        recording.channels().len(),
        n_samples,
        marker_onsets.len()
    );

    Ok(LoadedRecording {
        recording,
        marker_onsets,
    })
}

fn map_label(raw: &str, label_map: &[(String, String)]) -> String {
    let raw = raw.trim();
    label_map
        .iter()
        .find(|(code, _)| code == raw)
        .map(|(_, label)| label.clone())
        .unwrap_or_else(|| raw.to_string())
}

/// Load an events CSV, pairing label-only files with the recording's start
/// markers.
pub fn load_events(
    path: &str,
    marker_onsets: &[f64],
    label_map: &[(String, String)],
) -> Result<EventList, String> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| format!("Failed to open events '{}': {}", path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| format!("Failed to read header of '{}': {}", path, e))?
        .clone();

    let lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let onset_col = lower.iter().position(|h| h == "onset");
    let label_col = lower.iter().position(|h| h == "label" || h == "y");

    let result = match (onset_col, label_col) {
        (Some(onset_col), Some(label_col)) => {
            let mut onsets = Vec::new();
            let mut labels = Vec::new();
            for (row_idx, record) in reader.records().enumerate() {
                let record = record
                    .map_err(|e| format!("Failed to read '{}' row {}: {}", path, row_idx + 1, e))?;
                let onset = record
                    .get(onset_col)
                    .unwrap_or("")
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| {
                        format!("'{}' row {}: onset is not numeric", path, row_idx + 1)
                    })?;
                onsets.push(onset);
                labels.push(map_label(record.get(label_col).unwrap_or(""), label_map));
            }
            EventList::from_pairs(&onsets, &labels)
        }
        (None, Some(label_col)) => {
            let mut labels = Vec::new();
            for (row_idx, record) in reader.records().enumerate() {
                let record = record
                    .map_err(|e| format!("Failed to read '{}' row {}: {}", path, row_idx + 1, e))?;
                labels.push(map_label(record.get(label_col).unwrap_or(""), label_map));
            }
            EventList::from_pairs(marker_onsets, &labels)
        }
        _ => {
            return Err(format!(
                "'{}' must have 'onset,label' columns or a single 'label' column",
                path
            ))
        }
    };

    result.map_err(|e| format!("'{}': {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn eeg() -> Vec<String> {
        vec!["C3".to_string(), "C4".to_string()]
    }

    #[test]
    fn test_load_recording_with_time_and_markers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "rec.csv",
            "time,C3,C4,start\n0.000,1.0,2.0,1\n0.004,1.1,2.1,0\n0.008,1.2,2.2,1\n0.012,1.3,2.3,0\n",
        );
        let loaded = load_recording(&path, &eeg(), &[], 250.0).unwrap();
        assert_eq!(loaded.recording.n_samples(), 4);
        assert_eq!(loaded.recording.channels().len(), 2);
        assert_eq!(loaded.marker_onsets, vec![0.0, 0.008]);
        assert_eq!(
            loaded.recording.channel("C3").unwrap().kind,
            ChannelKind::Eeg
        );
    }

    #[test]
    fn test_load_recording_without_time_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "rec.csv", "C3,start\n1.0,0\n2.0,1\n3.0,0\n4.0,0\n");
        let loaded = load_recording(&path, &eeg(), &[], 250.0).unwrap();
        // Marker at row 1 -> 1/250 s
        assert!((loaded.marker_onsets[0] - 0.004).abs() < 1e-12);
    }

    #[test]
    fn test_artifact_channels_get_eog_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "rec.csv", "C3,EOG:ch01\n1.0,5.0\n2.0,6.0\n");
        let loaded =
            load_recording(&path, &eeg(), &["EOG:ch01".to_string()], 250.0).unwrap();
        assert_eq!(
            loaded.recording.channel("EOG:ch01").unwrap().kind,
            ChannelKind::Eog
        );
    }

    #[test]
    fn test_non_numeric_cell_reports_row_and_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "rec.csv", "C3,C4\n1.0,2.0\n1.1,oops\n");
        let err = load_recording(&path, &eeg(), &[], 250.0).unwrap_err();
        assert!(err.contains("row 2"));
        assert!(err.contains("C4"));
    }

    #[test]
    fn test_inconsistent_sample_rate_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        // 100 Hz time axis declared as 250 Hz
        let path = write_file(
            &dir,
            "rec.csv",
            "time,C3\n0.00,1.0\n0.01,1.1\n0.02,1.2\n0.03,1.3\n",
        );
        let err = load_recording(&path, &eeg(), &[], 250.0).unwrap_err();
        assert!(err.contains("Hz"));
    }

    #[test]
    fn test_non_monotonic_time_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "rec.csv", "time,C3\n0.000,1.0\n0.000,1.1\n");
        let err = load_recording(&path, &eeg(), &[], 250.0).unwrap_err();
        assert!(err.contains("strictly increasing"));
    }

    #[test]
    fn test_load_events_explicit_onsets() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ev.csv", "onset,label\n0.0,1\n4.0,2\n");
        let map = vec![
            ("1".to_string(), "left".to_string()),
            ("2".to_string(), "right".to_string()),
        ];
        let events = load_events(&path, &[], &map).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events.events()[0].label, "left");
        assert_eq!(events.events()[1].label, "right");
    }

    #[test]
    fn test_load_events_positional_pairing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ev.csv", "label\nleft\nright\n");
        let events = load_events(&path, &[0.0, 4.0], &[]).unwrap();
        assert_eq!(events.len(), 2);
        assert!((events.events()[1].onset_s - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_misaligned_positional_pairing_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ev.csv", "label\nleft\nright\nleft\n");
        let err = load_events(&path, &[0.0, 4.0], &[]).unwrap_err();
        assert!(err.contains("misalignment"));
    }

    #[test]
    fn test_events_without_usable_columns_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "ev.csv", "foo,bar\n1,2\n");
        assert!(load_events(&path, &[], &[]).is_err());
    }
}
