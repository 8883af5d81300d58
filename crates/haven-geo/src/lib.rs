//! Geospatial proximity and threat-classification engine for Haven
//!
//! The [`RecordStore`] owns the unified location table and swaps in a new
//! immutable [`LocationTable`] on every load or append. Query functions take a
//! table snapshot explicitly, so concurrent readers never observe a partially
//! updated table.

mod aggregate;
mod config;
mod distance;
mod extract;
mod search;
mod source;
mod store;
mod threat;


pub use aggregate::{aggregate_city, safety_score, CityReport, CityThreat};
pub use config::StoreConfig;
pub use distance::{distance_between, distance_km, EARTH_RADIUS_KM};
pub use extract::{detect_protection_intent, extract_cities, CityExtractor, PROTECTION_KEYWORDS};
pub use search::{
    nearest_shelter, nearest_single, search, threats_within, CategoryFilter, RankedLocation,
    DEFAULT_LIMIT, NEAREST_SHELTER_KINDS,
};
pub use source::{CsvSourceReader, SourceReader, SourceTable};
pub use store::{parse_table, LocationTable, RecordStore, SourceStats, SourceSummary};
pub use threat::{classify, classify_with, level_label, MissingIntensity, ThreatLevel, UNKNOWN_LABEL};

// Re-export core types for convenience
pub use haven_core::{Category, Error, GeoPoint, Kind, LocationRecord, Result};
