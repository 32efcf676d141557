//! Removes ffmpeg arguments that would stop the duration and status lines from being printed.
use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

/// Named ffmpeg log levels, as accepted by `-v` and `-loglevel`.
pub const FFMPEG_VERBOSITY_OPTIONS: [(&str, i32); 9] = [
    ("quiet", -8),
    ("panic", 0),
    ("fatal", 8),
    ("error", 16),
    ("warning", 24),
    ("info", 32),
    ("verbose", 40),
    ("debug", 48),
    ("trace", 56),
];

/// Lowest verbosity at which ffmpeg still prints `Duration:` and the status lines.
pub const MIN_VERBOSITY: i32 = 32;

pub const INCOMPATIBLE_FLAGS: [&str; 1] = ["-nostats"];

pub const LOGLEVEL_FLAGS: [&str; 2] = ["-v", "-loglevel"];

lazy_static! {
    // ffmpeg accepts `[flags+]level`, e.g. `repeat+level+verbose`
    static ref LOGLEVEL_RE: Regex = Regex::new(r"^(?:[^+]*\+)*(?P<level>[^+]+)$").unwrap();
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SanitizedArgs {
    /// Arguments to hand to ffmpeg, in their original relative order.
    pub args: Vec<String>,
    /// One line per removal, meant for the same stream ffmpeg writes to.
    pub notices: Vec<String>,
}

/// Resolves a log level value to its numeric verbosity.
///
/// Returns `None` for names ffmpeg does not define, which keeps the flag untouched.
pub fn resolve_verbosity(value: &str) -> Option<i32> {
    let level = &LOGLEVEL_RE.captures(value)?["level"];
    if let Ok(number) = level.parse::<i32>() {
        return Some(number);
    }
    FFMPEG_VERBOSITY_OPTIONS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, verbosity)| *verbosity)
}

pub fn sanitize_args<I, S>(args: I) -> SanitizedArgs
    where
        I: IntoIterator<Item=S>,
        S: AsRef<str>, {
    sanitize_args_with_min_verbosity(args, MIN_VERBOSITY)
}

pub fn sanitize_args_with_min_verbosity<I, S>(args: I, min_verbosity: i32) -> SanitizedArgs
    where
        I: IntoIterator<Item=S>,
        S: AsRef<str>, {
    let mut sanitized = SanitizedArgs::default();
    let mut args = remove_flags(args, &mut sanitized.notices);
    // removing a pair can join a flag to a new value, e.g. `-v -v 0 0`
    while let Some(remaining) = remove_loglevels(&args, min_verbosity, &mut sanitized.notices) {
        args = remaining;
    }
    sanitized.args = args;
    sanitized
}

/// Drops every occurrence of the [`INCOMPATIBLE_FLAGS`].
fn remove_flags<I, S>(args: I, notices: &mut Vec<String>) -> Vec<String>
    where
        I: IntoIterator<Item=S>,
        S: AsRef<str>, {
    let mut kept = Vec::new();
    for arg in args {
        let arg = arg.as_ref();
        if INCOMPATIBLE_FLAGS.contains(&arg) {
            info!(flag = arg, "removing incompatible flag");
            notices.push(format!("Incompatible flag removed: {}", arg));
        } else {
            kept.push(arg.to_string());
        }
    }
    kept
}

/// Drops log level flags quieter than `min_verbosity` with their value, `None` when there are none.
fn remove_loglevels(args: &[String], min_verbosity: i32, notices: &mut Vec<String>) -> Option<Vec<String>> {
    let mut kept = Vec::with_capacity(args.len());
    let mut removed = false;
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if LOGLEVEL_FLAGS.contains(&arg.as_str()) {
            let too_quiet = iter
                .peek()
                .and_then(|value| resolve_verbosity(value))
                .map_or(false, |verbosity| verbosity < min_verbosity);
            if too_quiet {
                if let Some(value) = iter.next() {
                    info!(flag = %arg, value = %value, "removing incompatible loglevel");
                    notices.push(format!(
                        "Incompatible loglevel removed: {} (min verbosity = {})",
                        value, min_verbosity
                    ));
                }
                removed = true;
                continue;
            }
        }
        kept.push(arg.clone());
    }
    if removed {
        Some(kept)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_nostats_and_quiet_loglevel() {
        let sanitized = sanitize_args(["-nostats", "-v", "0", "-i", "input.mp4", "output.mp4"]);
        assert_eq!(sanitized.args, vec!["-i", "input.mp4", "output.mp4"]);
        assert_eq!(
            sanitized.notices,
            vec![
                "Incompatible flag removed: -nostats".to_string(),
                "Incompatible loglevel removed: 0 (min verbosity = 32)".to_string(),
            ]
        );
    }

    #[test]
    fn keeps_unrelated_args_in_order() {
        let args = ["-y", "-i", "in.mkv", "-c:v", "libx264", "-crf", "20", "out.mp4"];
        let sanitized = sanitize_args(args);
        assert_eq!(sanitized.args, args);
        assert!(sanitized.notices.is_empty());
    }

    #[test]
    fn threshold_boundary() {
        assert_eq!(sanitize_args(["-v", "32"]).args, vec!["-v", "32"]);
        assert_eq!(sanitize_args(["-loglevel", "info"]).args, vec!["-loglevel", "info"]);
        assert!(sanitize_args(["-v", "31"]).args.is_empty());
        assert!(sanitize_args(["-loglevel", "warning"]).args.is_empty());
    }

    #[test]
    fn min_verbosity_is_configurable() {
        let args = ["-v", "20"];
        assert_eq!(sanitize_args_with_min_verbosity(args, 20).args, args);
        assert!(sanitize_args_with_min_verbosity(args, 21).args.is_empty());
    }

    #[test]
    fn unknown_level_name_is_kept() {
        let args = ["-loglevel", "shouting", "-i", "a.wav"];
        let sanitized = sanitize_args(args);
        assert_eq!(sanitized.args, args);
        assert!(sanitized.notices.is_empty());
    }

    #[test]
    fn negative_and_prefixed_levels() {
        assert!(sanitize_args(["-v", "-8"]).args.is_empty());
        assert!(sanitize_args(["-v", "repeat+level+quiet"]).args.is_empty());
        assert_eq!(sanitize_args(["-v", "repeat+verbose"]).args, vec!["-v", "repeat+verbose"]);
        assert_eq!(sanitize_args(["-v", "+repeat"]).args, vec!["-v", "+repeat"]);
    }

    #[test]
    fn trailing_loglevel_flag_without_value_is_kept() {
        assert_eq!(sanitize_args(["-i", "a.mp4", "-v"]).args, vec!["-i", "a.mp4", "-v"]);
    }

    #[test]
    fn every_occurrence_is_removed() {
        let sanitized = sanitize_args(["-nostats", "-v", "error", "-nostats", "-loglevel", "fatal", "out.mp4"]);
        assert_eq!(sanitized.args, vec!["out.mp4"]);
        assert_eq!(sanitized.notices.len(), 4);
    }

    #[test]
    fn flag_removal_does_not_hide_quiet_loglevel() {
        let sanitized = sanitize_args(["-v", "-nostats", "0", "-i", "a.mp4"]);
        assert_eq!(sanitized.args, vec!["-i", "a.mp4"]);
        assert_eq!(
            sanitized.notices,
            vec![
                "Incompatible flag removed: -nostats".to_string(),
                "Incompatible loglevel removed: 0 (min verbosity = 32)".to_string(),
            ]
        );
    }

    #[test]
    fn loglevel_removal_does_not_hide_quiet_loglevel() {
        let sanitized = sanitize_args(["-v", "-v", "0", "0", "-i", "a.mp4"]);
        assert_eq!(sanitized.args, vec!["-i", "a.mp4"]);
        assert_eq!(sanitized.notices.len(), 2);
    }

    #[test]
    fn idempotent() {
        let inputs: [&[&str]; 6] = [
            &["-nostats", "-v", "0", "-i", "input.mp4", "output.mp4"],
            &["-v", "-nostats", "0", "-i", "a.mp4"],
            &["-v", "-v", "0", "0", "-i", "a.mp4"],
            &["-v", "-v", "0"],
            &["-loglevel", "shouting", "-nostats"],
            &["-i", "a.mp4", "-loglevel"],
        ];
        for input in inputs {
            let once = sanitize_args(input);
            let twice = sanitize_args(&once.args);
            assert_eq!(twice.args, once.args);
            assert!(twice.notices.is_empty());
        }
    }

    #[test]
    fn resolves_named_levels() {
        assert_eq!(resolve_verbosity("trace"), Some(56));
        assert_eq!(resolve_verbosity("quiet"), Some(-8));
        assert_eq!(resolve_verbosity("48"), Some(48));
        assert_eq!(resolve_verbosity("loud"), None);
        assert_eq!(resolve_verbosity(""), None);
    }
}
