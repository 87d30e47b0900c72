//! Detection of the timezone the schedule is expressed in.
//!
//! Fixed clock times such as "10:15" are local times. When the configuration does
//! not name a timezone explicitly the system zone is used, found the same way
//! most Linux tools find it: the `TZ` variable first, then the `/etc/localtime`
//! symlink.

use chrono_tz::Tz;
use std::path::Path;

/// Get the system timezone, if it can be determined.
pub fn get_system_timezone() -> Option<Tz> {
    if let Ok(tz) = std::env::var("TZ")
        && let Some(parsed) = parse_tz_name(&tz)
    {
        return Some(parsed);
    }

    let target = std::fs::read_link("/etc/localtime").ok()?;
    timezone_from_zoneinfo_path(&target)
}

/// Parse an IANA name, accepting the `:Area/City` form `TZ` allows.
pub fn parse_tz_name(name: &str) -> Option<Tz> {
    name.trim().trim_start_matches(':').parse::<Tz>().ok()
}

/// Extract the zone from a path like `/usr/share/zoneinfo/America/New_York`.
fn timezone_from_zoneinfo_path(path: &Path) -> Option<Tz> {
    let text = path.to_str()?;
    let (_, name) = text.split_once("zoneinfo/")?;
    parse_tz_name(name)
}
