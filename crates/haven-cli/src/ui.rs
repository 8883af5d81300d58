//! UI utilities for the CLI

use colored::*;
use crossterm::terminal::size;
use std::io::{self, BufRead, Write};

use haven_core::Result;
use haven_geo::{CityReport, RankedLocation, SourceStats};

pub const HELP_TEXT: &str = "EMERGENCY CONTACTS:
Police: 100 | Medical: 101 | Fire: 102 | Home Front: 104

COMMANDS:
/nearest <lat>,<lon> [type]   Find nearest bunker/shelter (or embassy)
/location <city>              Safety info for a city
/danger <lat>,<lon> [km]      Threat zones around a point (default 5 km)
/report <type> <lat>,<lon> [name]
                              Report a new location or incident
/emergency                    Immediate instructions
/stats                        Loaded data summary
/help                         Show this help
/exit                         Exit

EXAMPLES:
- Where is the nearest bunker to me in Tel Aviv?
- Is it safe to go to Jerusalem right now?
- I hear sirens, what should I do?

In immediate danger, call 100 first!";

/// Display startup banner
pub fn display_banner(model: &str, records: usize) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = terminal_width.saturating_sub(4).clamp(40, 67);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.red());
    println!("{}", empty_line.red());

    let lines = [
        "HAVEN - Emergency Safety Assistant".to_string(),
        String::new(),
        format!("{} locations loaded", records),
        format!("Model: {}", model),
    ];

    for line in &lines {
        let padding = (banner_width - 4).saturating_sub(line.chars().count());
        let content = format!("│  {}{}│", line, " ".repeat(padding));
        println!("{}", content.red());
    }

    println!("{}", empty_line.red());
    println!("{}", bottom_border.red());
    println!();
    println!(
        "{}",
        "Type a question in plain language, or /help for commands. Call 100 in immediate danger.".dimmed()
    );
    println!();
}

pub fn print_help() {
    println!("{}", "HAVEN EMERGENCY HELP".red().bold());
    println!();
    println!("{}", HELP_TEXT);
    println!();
}

/// Read one line; `None` at end of input
pub fn read_input(prompt: &str) -> Result<Option<String>> {
    print!("{} ", prompt.green().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input)?;
    if read == 0 {
        return Ok(None);
    }

    Ok(Some(input.trim().to_string()))
}

fn ranked_line(index: usize, location: &RankedLocation) -> String {
    let record = &location.record;
    let mut line = format!(
        "{}. {} {}, {:.2} km (GPS: {}, {})",
        index,
        record.kind.as_str().to_uppercase(),
        record.name.as_deref().unwrap_or(&record.city),
        location.distance_km,
        record.lat,
        record.lon
    );

    if let Some(level) = location.threat_level {
        line.push_str(&format!(" [{}]", level));
    }

    line
}

pub fn format_ranked(locations: &[RankedLocation]) -> String {
    if locations.is_empty() {
        return "No matching locations.".to_string();
    }

    locations
        .iter()
        .enumerate()
        .map(|(i, location)| ranked_line(i + 1, location))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_report(report: &CityReport) -> String {
    if report.is_empty() {
        return format!("No data for {}.", report.city);
    }

    let mut out = format!("{}\nSafety score: {}\n", report.city, report.safety_score);

    out.push_str(&format!("\nSafety facilities ({}):\n", report.safety_count()));
    for record in &report.safety {
        out.push_str(&format!(
            "- {} {} (GPS: {}, {})\n",
            record.kind.as_str().to_uppercase(),
            record.name.as_deref().unwrap_or(&record.city),
            record.lat,
            record.lon
        ));
    }

    out.push_str(&format!("\nThreat zones ({}):\n", report.threat_count()));
    for threat in &report.threats {
        let record = &threat.record;
        out.push_str(&format!(
            "- {} {} (GPS: {}, {}) [{}]\n",
            record.kind.as_str().to_uppercase(),
            record.name.as_deref().unwrap_or(&record.city),
            record.lat,
            record.lon,
            threat.level_label()
        ));
    }

    if let Some(average) = report.average_intensity() {
        out.push_str(&format!("\nAverage threat intensity: {:.2}\n", average));
    }

    out
}

pub fn format_stats(stats: &SourceStats) -> String {
    let mut out = format!("Total records: {}\n", stats.total);

    for (source, summary) in &stats.per_source {
        let kinds: Vec<String> = summary
            .kinds
            .iter()
            .map(|(kind, count)| format!("{} {}", kind, count))
            .collect();
        out.push_str(&format!("- {}: {} ({})\n", source, summary.records, kinds.join(", ")));
    }

    if let Some(loaded_at) = stats.loaded_at {
        out.push_str(&format!("Loaded at {}\n", loaded_at.format("%Y-%m-%d %H:%M:%S UTC")));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_core::{GeoPoint, Kind, LocationRecord};
    use haven_geo::{aggregate_city, nearest_shelter, LocationTable};

    #[test]
    fn test_format_ranked() {
        let table = LocationTable::new(vec![
            LocationRecord::new(Kind::Bunker, "Tel Aviv", 32.0853, 34.7818).with_name("Dizengoff"),
        ]);
        let nearest = nearest_shelter(&table, GeoPoint::new(32.0853, 34.7818)).unwrap();

        assert_eq!(
            format_ranked(&[nearest]),
            "1. BUNKER Dizengoff, 0.00 km (GPS: 32.0853, 34.7818)"
        );
        assert_eq!(format_ranked(&[]), "No matching locations.");
    }

    #[test]
    fn test_format_empty_report() {
        let report = aggregate_city(&LocationTable::default(), "Atlantis");
        assert_eq!(format_report(&report), "No data for Atlantis.");
    }

    #[test]
    fn test_help_lists_contacts() {
        for contact in ["Police: 100", "Medical: 101", "Fire: 102", "Home Front: 104"] {
            assert!(HELP_TEXT.contains(contact));
        }
    }
}
