//! Formatting of second counts as clock-style durations.

/// Format seconds as "H:MM". Hours are unpadded, sub-minute remainders are truncated.
pub fn format_hh_mm(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{}:{:02}", hours, minutes)
}

/// Format seconds as "H:MM:SS".
pub fn format_hh_mm_ss(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, secs)
}
