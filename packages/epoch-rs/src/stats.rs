//! Per-class summary statistics over the feature table.

use serde::{Deserialize, Serialize};

use crate::error::{EpochError, Result};
use crate::features::{FeatureKey, FeatureTable};

/// Mean and standard error of one band-power column within one class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassStat {
    pub label: String,
    pub channel: String,
    pub band: String,
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation divided by sqrt(count)
    pub std_error: f64,
}

// Streaming accumulator: one pass over the rows, no second copy of the table
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    fn std_error(&self) -> f64 {
        let mean = self.mean();
        let variance = (self.sum_sq / self.count as f64 - mean * mean).max(0.0);
        variance.sqrt() / (self.count as f64).sqrt()
    }
}

/// Partition the table rows by class label and compute mean and standard
/// error for every band-power column.
///
/// Every declared class must appear in the data (a zero-count class makes
/// the standard error 0/0, which is reported rather than coerced), and
/// every label in the data must be declared.
pub fn class_statistics(table: &FeatureTable, class_labels: &[String]) -> Result<Vec<ClassStat>> {
    let band_power_columns: Vec<(usize, &str, String)> = table
        .schema
        .iter()
        .enumerate()
        .filter_map(|(idx, key)| match key {
            FeatureKey::BandPower { channel, band } => {
                Some((idx, channel.as_str(), band.name.clone()))
            }
            _ => None,
        })
        .collect();

    // accumulators[class][column]
    let mut accumulators =
        vec![vec![Accumulator::default(); band_power_columns.len()]; class_labels.len()];

    for row in &table.rows {
        let class_idx = class_labels
            .iter()
            .position(|label| *label == row.y)
            .ok_or_else(|| EpochError::UndeclaredClass(row.y.clone()))?;
        for (col, (value_idx, _, _)) in band_power_columns.iter().enumerate() {
            accumulators[class_idx][col].push(row.values[*value_idx]);
        }
    }

    let mut stats = Vec::with_capacity(class_labels.len() * band_power_columns.len());
    for (class_idx, label) in class_labels.iter().enumerate() {
        for (col, (_, channel, band)) in band_power_columns.iter().enumerate() {
            let acc = &accumulators[class_idx][col];
            if acc.count == 0 {
                return Err(EpochError::EmptyClass(label.clone()));
            }
            stats.push(ClassStat {
                label: label.clone(),
                channel: channel.to_string(),
                band: band.clone(),
                count: acc.count,
                mean: acc.mean(),
                std_error: acc.std_error(),
            });
        }
    }

    Ok(stats)
}
