//! Record store configuration

use serde::{Deserialize, Serialize};
use std::env;

use haven_core::{Category, Kind};

const DEFAULT_SOURCES: [&str; 3] = ["data/embassies.csv", "data/bunkers.csv", "data/heat.csv"];
const DEFAULT_THREAT_SOURCE: &str = "data/heat.csv";
const DEFAULT_SAFETY_SOURCE: &str = "data/bunkers.csv";

/// Which sources to load and where newly reported records are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub sources: Vec<String>,
    pub threat_source: String,
    pub safety_source: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            threat_source: DEFAULT_THREAT_SOURCE.to_string(),
            safety_source: DEFAULT_SAFETY_SOURCE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Create configuration from environment variables
    ///
    /// `HAVEN_SOURCES` is a comma-separated list; `HAVEN_THREAT_SOURCE` and
    /// `HAVEN_SAFETY_SOURCE` pick the append targets.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let sources = env::var("HAVEN_SOURCES")
            .map(|value| parse_source_list(&value))
            .ok()
            .filter(|sources| !sources.is_empty())
            .unwrap_or(defaults.sources);

        let threat_source =
            env::var("HAVEN_THREAT_SOURCE").unwrap_or(defaults.threat_source);
        let safety_source =
            env::var("HAVEN_SAFETY_SOURCE").unwrap_or(defaults.safety_source);

        Self {
            sources,
            threat_source,
            safety_source,
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Source a record of this kind is appended to when it names none
    pub fn append_target(&self, kind: &Kind) -> &str {
        match kind.category() {
            Category::Safety => &self.safety_source,
            Category::Threat | Category::Other => &self.threat_source,
        }
    }
}

pub(crate) fn parse_source_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_list() {
        assert_eq!(
            parse_source_list(" a.csv, ,b.csv ,"),
            vec!["a.csv".to_string(), "b.csv".to_string()]
        );
        assert!(parse_source_list("").is_empty());
    }

    #[test]
    fn test_append_target_routing() {
        let config = StoreConfig::default();
        assert_eq!(config.append_target(&Kind::Shelter), "data/bunkers.csv");
        assert_eq!(config.append_target(&Kind::MissileStrike), "data/heat.csv");
        assert_eq!(
            config.append_target(&Kind::Other("food_bank".to_string())),
            "data/heat.csv"
        );
    }
}
