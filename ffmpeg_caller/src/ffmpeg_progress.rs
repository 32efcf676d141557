//! The small part of ffmpeg's stderr grammar needed to drive a progress bar.
use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// ffmpeg ends an interactive question with this text and waits for input without a newline.
pub const FFMPEG_CONFIRM_TEXT: &str = "[y/N] ";

lazy_static! {
    static ref FFMPEG_DURATION_RE: Regex =
        Regex::new(r"Duration: (\d{2}):(\d{2}):(\d{2})\.(\d{2})").unwrap();
    static ref FFMPEG_STATUS_RE: Regex =
        Regex::new(r"frame=.*time=(\d{2}):(\d{2}):(\d{2})\.(\d{2}).*").unwrap();
}

/// Seconds represented by separate time units.
pub fn seconds_of(hours: u64, minutes: u64, seconds: u64, milliseconds: u64) -> f64 {
    ((hours * 60 + minutes) * 60 + seconds) as f64 + milliseconds as f64 / 1000.0
}

/// Seconds represented by the fields of an ffmpeg `HH:MM:SS.CC` timestamp.
///
/// Centiseconds are scaled to milliseconds first, so `("02", "20", "20", "02")` is exactly `8420.02`.
pub fn parse_duration(hours: &str, minutes: &str, seconds: &str, centiseconds: &str) -> Option<f64> {
    Some(seconds_of(
        hours.parse().ok()?,
        minutes.parse().ok()?,
        seconds.parse().ok()?,
        centiseconds.parse::<u64>().ok()? * 10,
    ))
}

fn parse_captures(captures: Captures) -> Option<f64> {
    parse_duration(&captures[1], &captures[2], &captures[3], &captures[4])
}

/// Total media length announced by a `Duration:` line.
pub fn parse_duration_line(line: &str) -> Option<f64> {
    FFMPEG_DURATION_RE.captures(line).and_then(parse_captures)
}

/// Elapsed media time of a status line (`frame=... time=HH:MM:SS.CC ...`).
pub fn parse_status_line(line: &str) -> Option<f64> {
    FFMPEG_STATUS_RE.captures(line).and_then(parse_captures)
}

pub fn is_status_line(line: &str) -> bool {
    FFMPEG_STATUS_RE.is_match(line)
}
