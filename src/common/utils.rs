//! Small formatting helpers shared by the logging call sites.

use std::path::Path;
use std::time::Duration as StdDuration;

/// Replace the user's home directory prefix with `~` for display.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

/// Mask all but the last four characters of a device auth token.
pub fn redact_token(token: &str) -> String {
    let visible: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{visible}")
    }
}

/// Human readable duration: `2h 15m`, `4m 10s`, `45s`.
pub fn format_duration(duration: StdDuration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    match (hours, minutes, seconds) {
        (0, 0, s) => format!("{s}s"),
        (0, m, 0) => format!("{m}m"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, 0, _) => format!("{h}h"),
        (h, m, _) => format!("{h}h {m}m"),
    }
}

/// Like [`format_duration`] for signed chrono durations; negative values read as `-5m`.
pub fn format_signed_duration(duration: chrono::Duration) -> String {
    match duration.to_std() {
        Ok(positive) => format_duration(positive),
        Err(_) => format!("-{}", format_duration((-duration).to_std().unwrap_or_default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(StdDuration::from_secs(0)), "0s");
        assert_eq!(format_duration(StdDuration::from_secs(45)), "45s");
        assert_eq!(format_duration(StdDuration::from_secs(20 * 60)), "20m");
        assert_eq!(format_duration(StdDuration::from_secs(250)), "4m 10s");
        assert_eq!(format_duration(StdDuration::from_secs(2 * 3600)), "2h");
        assert_eq!(format_duration(StdDuration::from_secs(8100)), "2h 15m");
    }

    #[test]
    fn test_format_signed_duration() {
        assert_eq!(format_signed_duration(chrono::Duration::minutes(5)), "5m");
        assert_eq!(format_signed_duration(chrono::Duration::minutes(-5)), "-5m");
    }

    #[test]
    fn test_redact_token() {
        assert_eq!(redact_token("abcdefgh1234"), "****1234");
        assert_eq!(redact_token("abc"), "****");
    }
}
