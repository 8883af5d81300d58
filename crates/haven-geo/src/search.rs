//! Proximity search over a location table

use serde::{Deserialize, Serialize};

use haven_core::{Category, GeoPoint, Kind, LocationRecord};

use crate::distance::distance_between;
use crate::store::LocationTable;
use crate::threat::{classify_with, MissingIntensity, ThreatLevel};

pub const DEFAULT_LIMIT: usize = 10;

/// Kinds considered for "nearest shelter" queries
pub const NEAREST_SHELTER_KINDS: [Kind; 2] = [Kind::Bunker, Kind::Shelter];

/// Which records a proximity search considers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    SafetyOnly,
    ThreatOnly,
    All,
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::SafetyOnly => category == Category::Safety,
            CategoryFilter::ThreatOnly => category == Category::Threat,
            CategoryFilter::All => true,
        }
    }
}

/// A record with its distance from the query origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLocation {
    pub record: LocationRecord,
    pub distance_km: f64,
    /// Present exactly for threat records; missing intensity counts as 0
    pub threat_level: Option<ThreatLevel>,
}

impl RankedLocation {
    fn new(record: &LocationRecord, distance_km: f64) -> Self {
        let threat_level = match record.category() {
            Category::Threat => classify_with(record.intensity, MissingIntensity::TreatAsZero),
            _ => None,
        };

        Self {
            record: record.clone(),
            distance_km,
            threat_level,
        }
    }
}

/// Rank records passing `filter` by distance from `origin`.
///
/// The sort is stable, so equidistant records keep table order. Returns at
/// most `limit` entries and an empty vector when nothing matches.
pub fn search(
    table: &LocationTable,
    origin: GeoPoint,
    filter: CategoryFilter,
    limit: usize,
) -> Vec<RankedLocation> {
    rank(table, origin, |record| filter.matches(record.category()), Some(limit))
}

/// Closest record whose kind is in `kinds`; the earliest wins a tie.
pub fn nearest_single(table: &LocationTable, origin: GeoPoint, kinds: &[Kind]) -> Option<RankedLocation> {
    let mut best: Option<(&LocationRecord, f64)> = None;

    for record in table.iter().filter(|record| kinds.contains(&record.kind)) {
        let distance = distance_between(origin, record.point());
        if best.is_none_or(|(_, closest)| distance < closest) {
            best = Some((record, distance));
        }
    }

    best.map(|(record, distance)| RankedLocation::new(record, distance))
}

/// Nearest bunker or shelter
pub fn nearest_shelter(table: &LocationTable, origin: GeoPoint) -> Option<RankedLocation> {
    nearest_single(table, origin, &NEAREST_SHELTER_KINDS)
}

/// Every threat within `radius_km` of `origin`, closest first
pub fn threats_within(table: &LocationTable, origin: GeoPoint, radius_km: f64) -> Vec<RankedLocation> {
    let mut ranked = rank(table, origin, |record| record.category() == Category::Threat, None);
    ranked.retain(|location| location.distance_km <= radius_km);
    ranked
}

fn rank(
    table: &LocationTable,
    origin: GeoPoint,
    predicate: impl Fn(&LocationRecord) -> bool,
    limit: Option<usize>,
) -> Vec<RankedLocation> {
    let mut scored: Vec<(&LocationRecord, f64)> = table
        .iter()
        .filter(|record| predicate(record))
        .map(|record| (record, distance_between(origin, record.point())))
        .collect();

    scored.sort_by(|a, b| a.1.total_cmp(&b.1));

    if let Some(limit) = limit {
        scored.truncate(limit);
    }

    scored
        .into_iter()
        .map(|(record, distance)| RankedLocation::new(record, distance))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LocationTable {
        LocationTable::new(vec![
            LocationRecord::new(Kind::Bunker, "Tel Aviv", 32.0853, 34.7818),
            LocationRecord::new(Kind::Shelter, "Jerusalem", 31.7683, 35.2137),
            LocationRecord::new(Kind::Embassy, "Tel Aviv", 32.0700, 34.7800),
            LocationRecord::new(Kind::MissileStrike, "Sderot", 31.5250, 34.5961).with_intensity(0.9),
            LocationRecord::new(Kind::SoldiersSpotted, "Haifa", 32.7940, 34.9896),
            LocationRecord::new(Kind::Other("heat".to_string()), "Eilat", 29.5577, 34.9519),
        ])
    }

    #[test]
    fn test_search_sorted_and_limited() {
        let origin = GeoPoint::new(32.08, 34.78);
        let results = search(&table(), origin, CategoryFilter::All, 3);

        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert_eq!(results[0].record.kind, Kind::Bunker);
    }

    #[test]
    fn test_search_all_returns_every_record_once() {
        let origin = GeoPoint::new(31.0, 35.0);
        let table = table();
        let results = search(&table, origin, CategoryFilter::All, 100);

        assert_eq!(results.len(), table.len());
        for record in table.records() {
            assert_eq!(results.iter().filter(|r| &r.record == record).count(), 1);
        }
    }

    #[test]
    fn test_search_filters_and_threat_levels() {
        let origin = GeoPoint::new(32.0, 34.8);

        let safety = search(&table(), origin, CategoryFilter::SafetyOnly, DEFAULT_LIMIT);
        assert_eq!(safety.len(), 3);
        assert!(safety.iter().all(|r| r.record.category() == Category::Safety));
        assert!(safety.iter().all(|r| r.threat_level.is_none()));

        let threats = search(&table(), origin, CategoryFilter::ThreatOnly, DEFAULT_LIMIT);
        assert_eq!(threats.len(), 2);
        for ranked in &threats {
            let expected = if ranked.record.kind == Kind::MissileStrike {
                ThreatLevel::Critical
            } else {
                ThreatLevel::Low
            };
            assert_eq!(ranked.threat_level, Some(expected));
        }
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let table = LocationTable::new(vec![
            LocationRecord::new(Kind::Shelter, "A", 10.0, 10.0),
            LocationRecord::new(Kind::Bunker, "B", 10.0, 10.0),
        ]);
        let origin = GeoPoint::new(0.0, 0.0);

        let results = search(&table, origin, CategoryFilter::SafetyOnly, 2);
        assert_eq!(results[0].record.city, "A");
        assert_eq!(results[1].record.city, "B");

        let nearest = nearest_shelter(&table, origin).unwrap();
        assert_eq!(nearest.record.city, "A");
    }

    #[test]
    fn test_nearest_agrees_with_search() {
        let table = table();
        for origin in [
            GeoPoint::new(32.08, 34.78),
            GeoPoint::new(31.77, 35.21),
            GeoPoint::new(29.5, 34.9),
        ] {
            let nearest = nearest_single(&table, origin, &Kind::SAFETY);
            let first = search(&table, origin, CategoryFilter::SafetyOnly, 1).into_iter().next();
            assert_eq!(nearest, first);
        }
    }

    #[test]
    fn test_empty_inputs() {
        let empty = LocationTable::default();
        let origin = GeoPoint::new(32.0, 34.8);

        assert!(search(&empty, origin, CategoryFilter::All, 10).is_empty());
        assert!(nearest_single(&empty, origin, &[Kind::Bunker, Kind::Shelter]).is_none());
        assert!(search(&table(), origin, CategoryFilter::All, 0).is_empty());
    }

    #[test]
    fn test_threats_within_radius() {
        let origin = GeoPoint::new(31.52, 34.60);
        let nearby = threats_within(&table(), origin, 5.0);

        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].record.city, "Sderot");
    }
}
