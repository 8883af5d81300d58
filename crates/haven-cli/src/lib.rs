//! Terminal front end for Haven

mod intent;
mod responder;
mod ui;

#[cfg(test)]
mod tests;

pub use intent::{Command, CommandDetector};
pub use responder::{emergency_guide, format_city_summary, EmergencyResponder, EMERGENCY_FALLBACK};
pub use ui::{
    display_banner, format_ranked, format_report, format_stats, print_help, read_input, HELP_TEXT,
};

// Re-export core types
pub use haven_core::{Error, Result};
