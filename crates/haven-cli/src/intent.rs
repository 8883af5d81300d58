//! Command detection for interactive input

use regex::Regex;

use haven_core::{GeoPoint, Kind};

pub const DEFAULT_DANGER_RADIUS_KM: f64 = 5.0;

const NEAREST_USAGE: &str = "/nearest <lat>,<lon> [bunker|shelter|embassy]";
const LOCATION_USAGE: &str = "/location <city>";
const DANGER_USAGE: &str = "/danger <lat>,<lon> [radius_km]";
const REPORT_USAGE: &str = "/report <type> <lat>,<lon> [name]";
const UNKNOWN_USAGE: &str = "Unknown command. Type /help for the list of commands.";

/// What the user asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Exit,
    Help,
    Emergency,
    Stats,
    /// Closest facility; bunkers and shelters unless `kind` narrows it
    Nearest { origin: GeoPoint, kind: Option<Kind> },
    Location { city: String },
    Danger { origin: GeoPoint, radius_km: f64 },
    Report { kind: Kind, origin: GeoPoint, name: Option<String> },
    /// Free text for the emergency responder
    Question(String),
    Invalid { usage: &'static str },
}

/// Parses slash commands; everything else is a question
pub struct CommandDetector {
    coordinate_patterns: Vec<Regex>,
}

impl CommandDetector {
    pub fn new() -> Self {
        let coordinate_patterns = vec![
            r"^(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)(?:\s+(.+))?$",
            r"^(-?\d+(?:\.\d+)?)\s+(-?\d+(?:\.\d+)?)(?:\s+(.+))?$",
        ];

        let coordinate_patterns = coordinate_patterns
            .into_iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();

        Self { coordinate_patterns }
    }

    pub fn detect(&self, input: &str) -> Command {
        let input = input.trim();

        if !input.starts_with('/') {
            return match input.to_lowercase().as_str() {
                "exit" | "quit" => Command::Exit,
                "help" => Command::Help,
                _ => Command::Question(input.to_string()),
            };
        }

        let (head, rest) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (input, ""),
        };

        match head.to_lowercase().as_str() {
            "/exit" | "/quit" => Command::Exit,
            "/help" => Command::Help,
            "/emergency" => Command::Emergency,
            "/stats" => Command::Stats,
            "/nearest" => self.nearest(rest),
            "/location" => {
                if rest.is_empty() {
                    Command::Invalid { usage: LOCATION_USAGE }
                } else {
                    Command::Location { city: rest.to_string() }
                }
            }
            "/danger" => self.danger(rest),
            "/report" => self.report(rest),
            _ => Command::Invalid { usage: UNKNOWN_USAGE },
        }
    }

    fn nearest(&self, args: &str) -> Command {
        let invalid = Command::Invalid { usage: NEAREST_USAGE };
        let Some((origin, tail)) = self.point(args) else {
            return invalid;
        };

        match tail {
            None => Command::Nearest { origin, kind: None },
            Some(raw) => match Kind::parse(raw) {
                Some(kind) if !matches!(kind, Kind::Other(_)) => Command::Nearest {
                    origin,
                    kind: Some(kind),
                },
                _ => invalid,
            },
        }
    }

    fn danger(&self, args: &str) -> Command {
        let invalid = Command::Invalid { usage: DANGER_USAGE };
        let Some((origin, tail)) = self.point(args) else {
            return invalid;
        };

        let radius_km = match tail {
            None => DEFAULT_DANGER_RADIUS_KM,
            Some(raw) => match raw.trim_end_matches("km").trim().parse::<f64>() {
                Ok(radius) if radius.is_finite() && radius > 0.0 => radius,
                _ => return invalid,
            },
        };

        Command::Danger { origin, radius_km }
    }

    fn report(&self, args: &str) -> Command {
        let invalid = Command::Invalid { usage: REPORT_USAGE };
        let Some((raw_kind, rest)) = args.split_once(char::is_whitespace) else {
            return invalid;
        };
        let Some(kind) = Kind::parse(raw_kind) else {
            return invalid;
        };
        let Some((origin, name)) = self.point(rest.trim()) else {
            return invalid;
        };

        Command::Report {
            kind,
            origin,
            name: name.map(str::to_string),
        }
    }

    /// Leading `lat,lon` or `lat lon` and whatever follows it
    fn point<'a>(&self, args: &'a str) -> Option<(GeoPoint, Option<&'a str>)> {
        self.coordinate_patterns.iter().find_map(|pattern| {
            let captures = pattern.captures(args)?;
            let lat = captures.get(1)?.as_str().parse::<f64>().ok()?;
            let lon = captures.get(2)?.as_str().parse::<f64>().ok()?;
            let point = GeoPoint::new(lat, lon);
            if !point.is_valid() {
                return None;
            }
            let tail = captures.get(3).map(|m| m.as_str().trim()).filter(|s| !s.is_empty());
            Some((point, tail))
        })
    }
}

impl Default for CommandDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        let detector = CommandDetector::new();
        assert_eq!(detector.detect("/exit"), Command::Exit);
        assert_eq!(detector.detect("quit"), Command::Exit);
        assert_eq!(detector.detect("/HELP"), Command::Help);
        assert_eq!(detector.detect(" /emergency "), Command::Emergency);
        assert_eq!(detector.detect("/stats"), Command::Stats);
    }

    #[test]
    fn test_nearest_coordinates() {
        let detector = CommandDetector::new();

        assert_eq!(
            detector.detect("/nearest 32.08,34.78"),
            Command::Nearest {
                origin: GeoPoint::new(32.08, 34.78),
                kind: None
            }
        );
        assert_eq!(
            detector.detect("/nearest 32.08 34.78 embassy"),
            Command::Nearest {
                origin: GeoPoint::new(32.08, 34.78),
                kind: Some(Kind::Embassy)
            }
        );
        assert!(matches!(detector.detect("/nearest"), Command::Invalid { .. }));
        assert!(matches!(detector.detect("/nearest 95,34"), Command::Invalid { .. }));
        assert!(matches!(detector.detect("/nearest 32,34 pizza"), Command::Invalid { .. }));
    }

    #[test]
    fn test_danger_default_radius() {
        let detector = CommandDetector::new();

        assert_eq!(
            detector.detect("/danger 31.52, 34.59"),
            Command::Danger {
                origin: GeoPoint::new(31.52, 34.59),
                radius_km: DEFAULT_DANGER_RADIUS_KM
            }
        );
        assert_eq!(
            detector.detect("/danger 31.52,34.59 12km"),
            Command::Danger {
                origin: GeoPoint::new(31.52, 34.59),
                radius_km: 12.0
            }
        );
        assert!(matches!(detector.detect("/danger 31.52,34.59 -3"), Command::Invalid { .. }));
    }

    #[test]
    fn test_report_and_location() {
        let detector = CommandDetector::new();

        assert_eq!(
            detector.detect("/report drone_strike 31.52,34.59 Sderot market"),
            Command::Report {
                kind: Kind::DroneStrike,
                origin: GeoPoint::new(31.52, 34.59),
                name: Some("Sderot market".to_string())
            }
        );
        assert!(matches!(detector.detect("/report bunker"), Command::Invalid { .. }));
        assert_eq!(
            detector.detect("/location Tel Aviv"),
            Command::Location {
                city: "Tel Aviv".to_string()
            }
        );
        assert_eq!(
            detector.detect("/location"),
            Command::Invalid { usage: LOCATION_USAGE }
        );
    }

    #[test]
    fn test_questions_and_unknown_commands() {
        let detector = CommandDetector::new();
        assert_eq!(
            detector.detect("Is it safe in Haifa?"),
            Command::Question("Is it safe in Haifa?".to_string())
        );
        assert_eq!(
            detector.detect("/teleport"),
            Command::Invalid { usage: UNKNOWN_USAGE }
        );
    }
}
