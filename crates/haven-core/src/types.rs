//! Location record model shared across Haven

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Broad grouping of a location kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Protective destination (bunker, shelter, embassy)
    Safety,
    /// Hostile or hazardous event
    Threat,
    /// Kind outside the known vocabulary
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Safety => "safety",
            Category::Threat => "threat",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location kind tag, stored in raw sources under the `type` column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Kind {
    Bunker,
    Shelter,
    Embassy,
    Explosion,
    DroneStrike,
    CarExplosion,
    MissileStrike,
    ForcesGathering,
    AirStrike,
    SoldiersSpotted,
    /// Normalized tag that is not part of the known vocabulary
    Other(String),
}

impl Kind {
    pub const SAFETY: [Kind; 3] = [Kind::Bunker, Kind::Shelter, Kind::Embassy];

    pub const THREAT: [Kind; 7] = [
        Kind::Explosion,
        Kind::DroneStrike,
        Kind::CarExplosion,
        Kind::MissileStrike,
        Kind::ForcesGathering,
        Kind::AirStrike,
        Kind::SoldiersSpotted,
    ];

    /// Parse a raw kind tag.
    ///
    /// The tag is trimmed and lower-cased, and runs of whitespace, `-` or `_`
    /// collapse into a single `_`, so `"Missile Strike"` and `"missile-strike"`
    /// both parse as [`Kind::MissileStrike`]. A trailing plural `s` is accepted
    /// for vocabulary kinds. Returns `None` when nothing is left after
    /// normalization.
    pub fn parse(raw: &str) -> Option<Kind> {
        let normalized = raw
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        if normalized.is_empty() {
            return None;
        }

        if let Some(kind) = Self::from_vocabulary(&normalized) {
            return Some(kind);
        }

        if let Some(singular) = normalized.strip_suffix('s') {
            if let Some(kind) = Self::from_vocabulary(singular) {
                return Some(kind);
            }
        }

        Some(Kind::Other(normalized))
    }

    fn from_vocabulary(tag: &str) -> Option<Kind> {
        let kind = match tag {
            "bunker" => Kind::Bunker,
            "shelter" => Kind::Shelter,
            "embassy" => Kind::Embassy,
            "explosion" => Kind::Explosion,
            "drone_strike" => Kind::DroneStrike,
            "car_explosion" => Kind::CarExplosion,
            "missile_strike" => Kind::MissileStrike,
            "forces_gathering" => Kind::ForcesGathering,
            "air_strike" => Kind::AirStrike,
            "soldiers_spotted" => Kind::SoldiersSpotted,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Kind::Bunker => "bunker",
            Kind::Shelter => "shelter",
            Kind::Embassy => "embassy",
            Kind::Explosion => "explosion",
            Kind::DroneStrike => "drone_strike",
            Kind::CarExplosion => "car_explosion",
            Kind::MissileStrike => "missile_strike",
            Kind::ForcesGathering => "forces_gathering",
            Kind::AirStrike => "air_strike",
            Kind::SoldiersSpotted => "soldiers_spotted",
            Kind::Other(tag) => tag,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Kind::Bunker | Kind::Shelter | Kind::Embassy => Category::Safety,
            Kind::Other(_) => Category::Other,
            _ => Category::Threat,
        }
    }

    /// Intensity assigned to a freshly reported threat that carries no score
    pub fn default_intensity(&self) -> Option<f64> {
        match self {
            Kind::MissileStrike => Some(0.9),
            Kind::Explosion | Kind::AirStrike => Some(0.8),
            Kind::CarExplosion | Kind::DroneStrike => Some(0.7),
            Kind::ForcesGathering => Some(0.6),
            Kind::SoldiersSpotted => Some(0.4),
            _ => None,
        }
    }

    /// Title-cased label, e.g. `Missile Strike`
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        kind.as_str().to_string()
    }
}

impl From<String> for Kind {
    fn from(raw: String) -> Self {
        Kind::parse(&raw).unwrap_or(Kind::Other(raw))
    }
}

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and within [-90, 90] / [-180, 180]
    pub fn is_valid(&self) -> bool {
        is_valid_latitude(self.lat) && is_valid_longitude(self.lon)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

pub fn is_valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

pub fn is_valid_longitude(lon: f64) -> bool {
    lon.is_finite() && (-180.0..=180.0).contains(&lon)
}

/// One row of the unified location table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub kind: Kind,
    pub city: String,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Severity in [0, 1]; only meaningful for threat records
    pub intensity: Option<f64>,
    pub description: Option<String>,
    /// Identifier of the source table the record came from
    pub source: Option<String>,
}

impl LocationRecord {
    pub fn new(kind: Kind, city: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            kind,
            city: city.into(),
            name: None,
            lat,
            lon,
            intensity: None,
            description: None,
            source: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Check coordinate bounds, kind presence and intensity range
    pub fn validate(&self) -> Result<()> {
        if self.kind.as_str().trim().is_empty() {
            return Err(Error::Validation("kind must not be empty".to_string()));
        }

        if !is_valid_latitude(self.lat) {
            return Err(Error::Validation(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }

        if !is_valid_longitude(self.lon) {
            return Err(Error::Validation(format!(
                "longitude {} outside [-180, 180]",
                self.lon
            )));
        }

        if let Some(intensity) = self.intensity {
            if !intensity.is_finite() || !(0.0..=1.0).contains(&intensity) {
                return Err(Error::Validation(format!(
                    "intensity {} outside [0, 1]",
                    intensity
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_vocabulary() {
        assert_eq!(Kind::parse("bunker"), Some(Kind::Bunker));
        assert_eq!(Kind::parse("  Shelter "), Some(Kind::Shelter));
        assert_eq!(Kind::parse("missile strike"), Some(Kind::MissileStrike));
        assert_eq!(Kind::parse("Drone-Strike"), Some(Kind::DroneStrike));
        assert_eq!(Kind::parse("air strikes"), Some(Kind::AirStrike));
        assert_eq!(Kind::parse("soldiers spotted"), Some(Kind::SoldiersSpotted));
        assert_eq!(Kind::parse("bunkers"), Some(Kind::Bunker));
    }

    #[test]
    fn test_kind_parse_unknown_and_empty() {
        assert_eq!(Kind::parse("food bank"), Some(Kind::Other("food_bank".to_string())));
        assert_eq!(Kind::parse("   "), None);
        assert_eq!(Kind::parse(""), None);
    }

    #[test]
    fn test_kind_category() {
        for kind in Kind::SAFETY {
            assert_eq!(kind.category(), Category::Safety);
        }
        for kind in Kind::THREAT {
            assert_eq!(kind.category(), Category::Threat);
        }
        assert_eq!(Kind::Other("heat".to_string()).category(), Category::Other);
    }

    #[test]
    fn test_kind_default_intensity() {
        assert_eq!(Kind::MissileStrike.default_intensity(), Some(0.9));
        assert_eq!(Kind::SoldiersSpotted.default_intensity(), Some(0.4));
        assert_eq!(Kind::Bunker.default_intensity(), None);
        assert_eq!(Kind::Other("bomb".to_string()).default_intensity(), None);
    }

    #[test]
    fn test_kind_display_name() {
        assert_eq!(Kind::MissileStrike.display_name(), "Missile Strike");
        assert_eq!(Kind::Bunker.display_name(), "Bunker");
    }

    #[test]
    fn test_record_validation() {
        let ok = LocationRecord::new(Kind::Bunker, "Haifa", 32.79, 34.99);
        assert!(ok.validate().is_ok());

        let bad_lat = LocationRecord::new(Kind::Bunker, "Haifa", 91.0, 34.99);
        assert!(matches!(bad_lat.validate(), Err(Error::Validation(_))));

        let bad_lon = LocationRecord::new(Kind::Bunker, "Haifa", 32.0, -180.5);
        assert!(bad_lon.validate().is_err());

        let nan = LocationRecord::new(Kind::Bunker, "Haifa", f64::NAN, 34.0);
        assert!(nan.validate().is_err());

        let empty_kind = LocationRecord::new(Kind::Other(String::new()), "Haifa", 32.0, 34.0);
        assert!(empty_kind.validate().is_err());

        let hot = LocationRecord::new(Kind::Explosion, "Haifa", 32.0, 34.0).with_intensity(1.5);
        assert!(hot.validate().is_err());
    }

    #[test]
    fn test_geo_point_bounds() {
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(GeoPoint::new(-90.0, -180.0).is_valid());
        assert!(!GeoPoint::new(f64::INFINITY, 0.0).is_valid());
    }
}
