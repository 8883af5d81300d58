//! City name and protection-intent extraction from free text

use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

use crate::store::LocationTable;

/// Words that signal the asker is looking for protection
pub const PROTECTION_KEYWORDS: [&str; 8] = [
    "safety",
    "safe",
    "bunker",
    "shelter",
    "protection",
    "protect",
    "hide",
    "refuge",
];

/// Whole-word, case-insensitive matcher over a fixed set of city names
pub struct CityExtractor {
    patterns: Vec<(String, Regex)>,
}

impl CityExtractor {
    pub fn new<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = cities
            .into_iter()
            .filter_map(|city| {
                let city = city.as_ref().trim();
                if city.is_empty() {
                    return None;
                }
                let pattern = format!(
                    r"(?i){}{}{}",
                    boundary(city.chars().next()),
                    regex::escape(city),
                    boundary(city.chars().last())
                );
                match Regex::new(&pattern) {
                    Ok(regex) => Some((city.to_string(), regex)),
                    Err(e) => {
                        debug!(city, error = %e, "skipping unmatchable city name");
                        None
                    }
                }
            })
            .collect();

        Self { patterns }
    }

    /// Matcher over every city known to the table
    pub fn from_table(table: &LocationTable) -> Self {
        Self::new(table.known_cities())
    }

    /// Known cities that occur in `text` as whole words
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        self.patterns
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(city, _)| city.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// `\b` only holds next to a word character, so other ends go unanchored
fn boundary(edge: Option<char>) -> &'static str {
    match edge {
        Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
        _ => "",
    }
}

pub fn extract_cities<I, S>(known_cities: I, text: &str) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    CityExtractor::new(known_cities).extract(text)
}

/// True if any protection keyword occurs in `text`, as a substring
pub fn detect_protection_intent(text: &str) -> bool {
    let text = text.to_lowercase();
    PROTECTION_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_whole_word() {
        let cities = ["Jerusalem", "Tel Aviv", "Haifa"];

        let found = extract_cities(cities, "Is it safe in Jerusalem?");
        assert_eq!(found, BTreeSet::from(["Jerusalem".to_string()]));

        assert!(extract_cities(cities, "Jerusalemite bakery").is_empty());
    }

    #[test]
    fn test_extract_case_insensitive_multi_word() {
        let cities = ["Jerusalem", "Tel Aviv", "Haifa"];
        let found = extract_cities(cities, "driving from TEL AVIV to haifa tonight");

        assert_eq!(
            found,
            BTreeSet::from(["Haifa".to_string(), "Tel Aviv".to_string()])
        );
    }

    #[test]
    fn test_extract_escapes_city_names() {
        let found = extract_cities(["Be'er Sheva"], "shelters near be'er sheva please");
        assert_eq!(found, BTreeSet::from(["Be'er Sheva".to_string()]));

        assert!(extract_cities(["St. Louis"], "stalouis").is_empty());
        assert!(!extract_cities(["St. Louis"], "st. louis").is_empty());
    }

    #[test]
    fn test_extract_city_with_punctuated_ends() {
        let cities = ["Kiryat (North)", "(Old) Akko"];

        let found = extract_cities(cities, "is Kiryat (North) safe? and (old) akko?");
        assert_eq!(
            found,
            BTreeSet::from(["(Old) Akko".to_string(), "Kiryat (North)".to_string()])
        );

        assert!(extract_cities(cities, "Kiryat North").is_empty());
        assert!(extract_cities(cities, "(Old) Akkoville").is_empty());
    }

    #[test]
    fn test_extractor_ignores_blank_cities() {
        let extractor = CityExtractor::new(["", "  ", "Eilat"]);
        assert_eq!(extractor.len(), 1);
    }

    #[test]
    fn test_protection_intent() {
        assert!(detect_protection_intent("Where can I find a SHELTER?"));
        assert!(detect_protection_intent("is it unsafe here"));
        assert!(detect_protection_intent("I need to hide"));
        assert!(!detect_protection_intent("What is the weather in Haifa?"));
    }
}
