//! Snapshot tests for CLI output

#[cfg(test)]
mod snapshot_tests {
    use crate::{format_city_summary, format_report, format_stats, CommandDetector};
    use haven_core::{Kind, LocationRecord};
    use haven_geo::{aggregate_city, LocationTable, SourceStats, SourceSummary};
    use insta::{assert_snapshot, assert_yaml_snapshot};
    use std::collections::BTreeMap;

    fn jerusalem() -> LocationTable {
        LocationTable::new(vec![
            LocationRecord::new(Kind::Bunker, "Jerusalem", 31.7683, 35.2137).with_name("Mamilla"),
            LocationRecord::new(Kind::Embassy, "Jerusalem", 31.7780, 35.2250),
            LocationRecord::new(Kind::MissileStrike, "Jerusalem", 31.7700, 35.2200).with_intensity(0.9),
            LocationRecord::new(Kind::SoldiersSpotted, "Jerusalem", 31.7600, 35.2100),
        ])
    }

    #[test]
    fn test_city_report_snapshot() {
        let report = aggregate_city(&jerusalem(), "Jerusalem");

        assert_snapshot!(format_report(&report), @r###"
        Jerusalem
        Safety score: 8

        Safety facilities (2):
        - BUNKER Mamilla (GPS: 31.7683, 35.2137)
        - EMBASSY Jerusalem (GPS: 31.778, 35.225)

        Threat zones (2):
        - MISSILE_STRIKE Jerusalem (GPS: 31.77, 35.22) [CRITICAL]
        - SOLDIERS_SPOTTED Jerusalem (GPS: 31.76, 35.21) [UNKNOWN]

        Average threat intensity: 0.90
        "###);
    }

    #[test]
    fn test_city_summary_snapshot() {
        let report = aggregate_city(&jerusalem(), "Jerusalem");

        assert_snapshot!(format_city_summary(&report, true), @r###"
        *Jerusalem:* 2 safety facilities, 2 threat zones (safety score 8)
        - Threats: CRITICAL x1, UNKNOWN x1
        *Safety facilities in Jerusalem:*
        - BUNKER Mamilla (GPS: 31.7683, 35.2137)
        - EMBASSY Jerusalem (GPS: 31.778, 35.225)
        "###);
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = SourceStats {
            total: 3,
            per_source: BTreeMap::from([
                (
                    "data/bunkers.csv".to_string(),
                    SourceSummary {
                        records: 2,
                        kinds: BTreeMap::from([("bunker".to_string(), 1), ("shelter".to_string(), 1)]),
                    },
                ),
                (
                    "data/heat.csv".to_string(),
                    SourceSummary {
                        records: 1,
                        kinds: BTreeMap::from([("explosion".to_string(), 1)]),
                    },
                ),
            ]),
            kinds: BTreeMap::new(),
            loaded_at: None,
        };

        assert_snapshot!(format_stats(&stats), @r###"
        Total records: 3
        - data/bunkers.csv: 2 (bunker 1, shelter 1)
        - data/heat.csv: 1 (explosion 1)
        "###);
    }

    #[test]
    fn test_command_detection_snapshot() {
        let detector = CommandDetector::new();
        let inputs = [
            "/nearest 32.08,34.78",
            "/danger 31.52 34.59",
            "/location Haifa",
            "/report shelters 32.79,34.99",
            "/nearest somewhere",
            "where do I go?",
        ];

        let detected: Vec<String> = inputs
            .iter()
            .map(|input| format!("{:?}", detector.detect(input)))
            .collect();

        assert_yaml_snapshot!(detected, @r###"
        ---
        - "Nearest { origin: GeoPoint { lat: 32.08, lon: 34.78 }, kind: None }"
        - "Danger { origin: GeoPoint { lat: 31.52, lon: 34.59 }, radius_km: 5.0 }"
        - "Location { city: \"Haifa\" }"
        - "Report { kind: Shelter, origin: GeoPoint { lat: 32.79, lon: 34.99 }, name: None }"
        - "Invalid { usage: \"/nearest <lat>,<lon> [bunker|shelter|embassy]\" }"
        - "Question(\"where do I go?\")"
        "###);
    }
}
