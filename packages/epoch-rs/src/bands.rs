//! Frequency band definitions and the canonical EEG band registry.

use serde::{Deserialize, Serialize};

use crate::error::{EpochError, Result};

/// Canonical boundary list for the standard EEG partition
pub const CANONICAL_BOUNDARIES: &[f64] = &[0.5, 4.0, 7.0, 12.0, 30.0];

/// Static metadata for a canonical EEG band
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BandMetadata {
    pub name: &'static str,
    pub low_hz: f64,
    pub high_hz: f64,
    pub documentation: &'static str,
}

impl BandMetadata {
    /// Look up a canonical band by name
    pub fn from_name(name: &str) -> Option<&'static BandMetadata> {
        BAND_REGISTRY.iter().find(|b| b.name == name)
    }

    /// Look up a canonical band by its exact interval
    pub fn from_interval(low_hz: f64, high_hz: f64) -> Option<&'static BandMetadata> {
        BAND_REGISTRY
            .iter()
            .find(|b| b.low_hz == low_hz && b.high_hz == high_hz)
    }
}

/// Delta (0.5, 4] Hz
///
/// Slow-wave activity, dominant in deep sleep; in awake recordings mostly
/// movement and electrode artifact.
pub const DELTA: BandMetadata = BandMetadata {
    name: "delta",
    low_hz: 0.5,
    high_hz: 4.0,
    documentation: "Slow-wave activity; in awake recordings mostly artifact.",
};

/// Theta (4, 7] Hz
pub const THETA: BandMetadata = BandMetadata {
    name: "theta",
    low_hz: 4.0,
    high_hz: 7.0,
    documentation: "Drowsiness and working-memory load.",
};

/// Alpha/mu (7, 12] Hz
///
/// Over sensorimotor cortex this range is the mu rhythm, the primary carrier
/// of motor-imagery desynchronization.
pub const ALPHA: BandMetadata = BandMetadata {
    name: "alpha",
    low_hz: 7.0,
    high_hz: 12.0,
    documentation: "Alpha/mu rhythm; desynchronizes during motor imagery.",
};

/// Beta (12, 30] Hz
pub const BETA: BandMetadata = BandMetadata {
    name: "beta",
    low_hz: 12.0,
    high_hz: 30.0,
    documentation: "Sensorimotor beta; rebounds after movement ends.",
};

/// All canonical bands in ascending frequency order
pub const BAND_REGISTRY: &[BandMetadata] = &[DELTA, THETA, ALPHA, BETA];

/// A half-open frequency interval `(low, high]` in Hz.
///
/// Built from an ordered boundary list; carries a name so that derived
/// features (ratios) can reference bands without repeating numeric bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub name: String,
    pub low_hz: f64,
    pub high_hz: f64,
}

impl FrequencyBand {
    pub fn new(name: impl Into<String>, low_hz: f64, high_hz: f64) -> Self {
        Self {
            name: name.into(),
            low_hz,
            high_hz,
        }
    }

    /// Whether `freq_hz` falls inside the half-open interval `(low, high]`.
    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz > self.low_hz && freq_hz <= self.high_hz
    }

    /// Interval notation, e.g. `(7, 12]`.
    pub fn interval_label(&self) -> String {
        format!("({}, {}]", trim_float(self.low_hz), trim_float(self.high_hz))
    }
}

impl std::fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.interval_label())
    }
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Build the band set from an ordered boundary list.
///
/// `[b0, b1, ..., bn]` becomes `(b0,b1], (b1,b2], ..., (bn-1,bn]`. Names are
/// taken from `names` when given (one per interval), otherwise from the
/// canonical registry when an interval matches exactly, otherwise from the
/// interval bounds (`"0.5-4Hz"`).
pub fn bands_from_boundaries(
    boundaries: &[f64],
    names: Option<&[String]>,
) -> Result<Vec<FrequencyBand>> {
    if boundaries.len() < 2 {
        return Err(EpochError::InvalidBoundaries(format!(
            "need at least 2 boundaries, got {}",
            boundaries.len()
        )));
    }
    if boundaries[0] < 0.0 {
        return Err(EpochError::InvalidBoundaries(format!(
            "first boundary must be >= 0, got {}",
            boundaries[0]
        )));
    }
    for pair in boundaries.windows(2) {
        if pair[1] <= pair[0] {
            return Err(EpochError::InvalidBoundaries(format!(
                "boundaries must be strictly increasing, got {} after {}",
                pair[1], pair[0]
            )));
        }
    }

    let n_intervals = boundaries.len() - 1;
    if let Some(names) = names {
        if names.len() != n_intervals {
            return Err(EpochError::InvalidBoundaries(format!(
                "{} names given for {} intervals",
                names.len(),
                n_intervals
            )));
        }
    }

    let bands = boundaries
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let name = match names {
                Some(names) => names[i].clone(),
                None => match BandMetadata::from_interval(pair[0], pair[1]) {
                    Some(meta) => meta.name.to_string(),
                    None => format!("{}-{}Hz", trim_float(pair[0]), trim_float(pair[1])),
                },
            };
            FrequencyBand::new(name, pair[0], pair[1])
        })
        .collect();

    Ok(bands)
}

/// Find a band by name within a band set.
pub fn band_by_name<'a>(bands: &'a [FrequencyBand], name: &str) -> Result<&'a FrequencyBand> {
    bands
        .iter()
        .find(|b| b.name == name)
        .ok_or_else(|| EpochError::UnknownBand(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_size() {
        assert_eq!(BAND_REGISTRY.len(), 4);
    }

    #[test]
    fn test_lookup_by_name() {
        assert!(BandMetadata::from_name("delta").is_some());
        assert!(BandMetadata::from_name("alpha").is_some());
        assert!(BandMetadata::from_name("gamma").is_none());
    }

    #[test]
    fn test_canonical_boundaries_produce_named_bands() {
        let bands = bands_from_boundaries(CANONICAL_BOUNDARIES, None).unwrap();
        let names: Vec<&str> = bands.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["delta", "theta", "alpha", "beta"]);
    }

    #[test]
    fn test_boundary_list_yields_one_band_per_interval() {
        let bands = bands_from_boundaries(&[0.5, 4.0, 7.0, 12.0, 30.0], None).unwrap();
        assert_eq!(bands.len(), 4);
        assert_eq!(bands[2].interval_label(), "(7, 12]");
    }

    #[test]
    fn test_half_open_membership() {
        let alpha = FrequencyBand::new("alpha", 7.0, 12.0);
        assert!(!alpha.contains(7.0));
        assert!(alpha.contains(7.01));
        assert!(alpha.contains(12.0));
        assert!(!alpha.contains(12.01));
    }

    #[test]
    fn test_non_canonical_interval_gets_numeric_name() {
        let bands = bands_from_boundaries(&[1.0, 3.0], None).unwrap();
        assert_eq!(bands[0].name, "1-3Hz");
    }

    #[test]
    fn test_custom_names() {
        let names = vec!["low".to_string(), "high".to_string()];
        let bands = bands_from_boundaries(&[0.0, 10.0, 20.0], Some(&names)).unwrap();
        assert_eq!(bands[0].name, "low");
        assert_eq!(bands[1].name, "high");
    }

    #[test]
    fn test_rejects_non_increasing_boundaries() {
        assert!(bands_from_boundaries(&[4.0, 4.0], None).is_err());
        assert!(bands_from_boundaries(&[4.0, 2.0], None).is_err());
        assert!(bands_from_boundaries(&[4.0], None).is_err());
    }

    #[test]
    fn test_band_by_name() {
        let bands = bands_from_boundaries(CANONICAL_BOUNDARIES, None).unwrap();
        assert!(band_by_name(&bands, "theta").is_ok());
        let err = band_by_name(&bands, "gamma").unwrap_err();
        assert!(err.to_string().contains("gamma"));
    }
}
