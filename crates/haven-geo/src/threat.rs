//! Intensity-based threat classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used when a threat carries no intensity and the caller asked for the
/// no-data distinction
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// Ordinal threat level, always recomputed from the intensity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "LOW",
            ThreatLevel::Moderate => "MODERATE",
            ThreatLevel::High => "HIGH",
            ThreatLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a missing intensity is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingIntensity {
    /// Missing counts as 0, i.e. [`ThreatLevel::Low`]. Proximity search.
    TreatAsZero,
    /// Missing yields no level, rendered as `UNKNOWN`. City reports.
    Unknown,
}

/// Classify an intensity; thresholds are closed below and checked highest-first.
pub fn classify(intensity: f64) -> ThreatLevel {
    if intensity >= 0.8 {
        ThreatLevel::Critical
    } else if intensity >= 0.6 {
        ThreatLevel::High
    } else if intensity >= 0.4 {
        ThreatLevel::Moderate
    } else {
        ThreatLevel::Low
    }
}

pub fn classify_with(intensity: Option<f64>, missing: MissingIntensity) -> Option<ThreatLevel> {
    match (intensity, missing) {
        (Some(value), _) => Some(classify(value)),
        (None, MissingIntensity::TreatAsZero) => Some(classify(0.0)),
        (None, MissingIntensity::Unknown) => None,
    }
}

pub fn level_label(level: Option<ThreatLevel>) -> &'static str {
    level.map_or(UNKNOWN_LABEL, |level| level.as_str())
}
