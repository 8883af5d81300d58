//! Per-city aggregation

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use haven_core::{Category, LocationRecord};

use crate::store::LocationTable;
use crate::threat::{classify_with, level_label, MissingIntensity, ThreatLevel};

/// A threat record in a city report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityThreat {
    pub record: LocationRecord,
    /// `None` when the record has no intensity; serialized as `UNKNOWN`
    #[serde(serialize_with = "serialize_level")]
    pub threat_level: Option<ThreatLevel>,
}

impl CityThreat {
    pub fn level_label(&self) -> &'static str {
        level_label(self.threat_level)
    }
}

fn serialize_level<S: Serializer>(level: &Option<ThreatLevel>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(level_label(*level))
}

/// Safety facilities and threat zones recorded for one city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityReport {
    pub city: String,
    pub safety: Vec<LocationRecord>,
    pub threats: Vec<CityThreat>,
    pub safety_score: i64,
}

impl CityReport {
    pub fn safety_count(&self) -> usize {
        self.safety.len()
    }

    pub fn threat_count(&self) -> usize {
        self.threats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.safety.is_empty() && self.threats.is_empty()
    }

    /// Mean intensity over threats that carry one
    pub fn average_intensity(&self) -> Option<f64> {
        let scores: Vec<f64> = self
            .threats
            .iter()
            .filter_map(|threat| threat.record.intensity)
            .collect();

        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }

    /// Threat count per level label, including `UNKNOWN`
    pub fn level_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for threat in &self.threats {
            *counts.entry(threat.level_label()).or_insert(0) += 1;
        }
        counts
    }
}

/// Legacy safety heuristic, an illustrative integer rather than a probability
pub fn safety_score(safety_count: usize, threat_count: usize) -> i64 {
    let safety = safety_count as i64;
    let threats = threat_count as i64;

    if threats > 0 {
        (10 - 2 * threats + safety).max(0)
    } else if safety > 0 {
        10
    } else {
        5
    }
}

/// Collect a city's records by exact, case-insensitive city equality
pub fn aggregate_city(table: &LocationTable, city: &str) -> CityReport {
    let wanted = city.trim().to_lowercase();
    let mut safety = Vec::new();
    let mut threats = Vec::new();

    for record in table
        .iter()
        .filter(|record| record.city.trim().to_lowercase() == wanted)
    {
        match record.category() {
            Category::Safety => safety.push(record.clone()),
            Category::Threat => threats.push(CityThreat {
                record: record.clone(),
                threat_level: classify_with(record.intensity, MissingIntensity::Unknown),
            }),
            Category::Other => {}
        }
    }

    let safety_score = safety_score(safety.len(), threats.len());

    CityReport {
        city: city.trim().to_string(),
        safety,
        threats,
        safety_score,
    }
}
