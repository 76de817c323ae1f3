//! GRBL Protocol Utilities
//!
//! Line classification and state lookups used by the link monitor.

use crate::firmware::grbl::status_parser::StatusParser;

/// Kind of a line received from the plotter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `<...>` status frame
    StatusFrame,
    /// Empty line (bare `\r\n`)
    Blank,
    /// Anything else: responses, alarms, welcome banner, settings
    Telemetry,
}

/// Classify a received line
pub fn classify_line(line: &str) -> LineKind {
    if line.trim().is_empty() {
        LineKind::Blank
    } else if StatusParser::is_status_frame(line) {
        LineKind::StatusFrame
    } else {
        LineKind::Telemetry
    }
}

/// Base state token, without a sub-state such as the `:0` in `Hold:0`
fn base_state(state: &str) -> &str {
    state.split(':').next().unwrap_or(state)
}

/// Get the human-readable state name from GRBL state string
pub fn get_state_name(state: &str) -> &'static str {
    match base_state(state) {
        "Idle" => "Idle",
        "Run" => "Running",
        "Hold" => "Hold",
        "Jog" => "Jogging",
        "Alarm" => "Alarm",
        "Check" => "Check",
        "Door" => "Door",
        "Sleep" => "Sleep",
        "Disconnected" => "Disconnected",
        _ => "Unknown",
    }
}

/// Check if GRBL is in an error state
pub fn is_error_state(state: &str) -> bool {
    matches!(base_state(state), "Alarm" | "Door")
}
