//! Default configuration file creation.
//!
//! The default file documents every setting inline and spells out the built-in
//! event catalog as `[[event]]` tables, so editing an event never requires
//! knowing what the built-in list was.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;

/// Create the default config file at `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content())
        .with_context(|| format!("Failed to write default config to {}", path.display()))
}

/// Text of the default configuration file.
pub fn default_config_content() -> String {
    let settings = ConfigBuilder::new()
        .add_section("Device")
        .add_commented_setting(
            "device_address",
            "\"192.168.0.198\"",
            "Nanoleaf address on the local network (required to run)",
        )
        .add_setting(
            "device_port",
            &DEFAULT_DEVICE_PORT.to_string(),
            "Nanoleaf Open API port",
        )
        .add_commented_setting(
            "auth_token",
            "\"<token>\"",
            "Token from the device pairing step (required to run)",
        )
        .add_setting(
            "request_timeout",
            &DEFAULT_REQUEST_TIMEOUT.to_string(),
            &format!(
                "HTTP request timeout in seconds ({MINIMUM_REQUEST_TIMEOUT}-{MAXIMUM_REQUEST_TIMEOUT})"
            ),
        )
        .add_section("Location")
        .add_setting(
            "latitude",
            &format!("{DEFAULT_LATITUDE:.6}"),
            "Geographic latitude for sunrise (-90 to 90)",
        )
        .add_setting(
            "longitude",
            &format!("{DEFAULT_LONGITUDE:.6}"),
            "Geographic longitude for sunrise (-180 to 180)",
        )
        .add_commented_setting(
            "timezone",
            "\"America/New_York\"",
            "Timezone for fixed clock times (default: system timezone)",
        )
        .add_section("Scheduler")
        .add_setting(
            "grace_window",
            &DEFAULT_GRACE_WINDOW.to_string(),
            &format!(
                "Minutes an event may be late and still fire ({MINIMUM_GRACE_WINDOW}-{MAXIMUM_GRACE_WINDOW})"
            ),
        )
        .add_setting(
            "max_sleep",
            &DEFAULT_MAX_SLEEP.to_string(),
            &format!(
                "Maximum minutes between schedule rebuilds ({MINIMUM_MAX_SLEEP}-{MAXIMUM_MAX_SLEEP})"
            ),
        )
        .add_setting(
            "retention",
            &DEFAULT_RETENTION.to_string(),
            &format!("Days a fired event is remembered ({MINIMUM_RETENTION}-{MAXIMUM_RETENTION})"),
        )
        .add_setting(
            "retry_delay",
            &DEFAULT_RETRY_DELAY.to_string(),
            &format!(
                "Seconds before retrying a failed action ({MINIMUM_RETRY_DELAY}-{MAXIMUM_RETRY_DELAY})"
            ),
        )
        .add_setting(
            "max_attempts",
            &DEFAULT_MAX_ATTEMPTS.to_string(),
            &format!(
                "Failed attempts before an occurrence is dropped ({MINIMUM_MAX_ATTEMPTS}-{MAXIMUM_MAX_ATTEMPTS})"
            ),
        )
        .build();

    format!("{settings}\n\n{DEFAULT_EVENTS}")
}

// Mirrors `Catalog::default_catalog`
const DEFAULT_EVENTS: &str = r#"#[Events]
# Each [[event]] fires once per day, either at a fixed clock time (at = "HH:MM")
# or relative to sunrise (sunrise_offset = minutes, negative = before).
# Actions: fade_in, switch_effect, set_brightness, set_color, power_off

[[event]]
name = "sunrise-fade-in"
sunrise_offset = -30
action = "fade_in"
effect = "Coral Sunrise"
brightness = 100
fade_seconds = 1800

[[event]]
name = "morning-mode"
sunrise_offset = 45
action = "switch_effect"
effect = "Natural Light"

[[event]]
name = "morning-off"
at = "10:15"
action = "power_off"

[[event]]
name = "nightlight-on"
at = "20:00"
action = "set_color"
color = [33, 0, 0]

# A one-off probe for testing the device, disabled by default
# [[event]]
# name = "probe"
# at = "14:05"
# action = "set_brightness"
# brightness = 40
# enabled = false
"#;

/// Builder for the aligned `key = value # comment` layout of the settings block.
///
/// Padding is computed from the longest setting line so comments stay aligned
/// when defaults change.
struct ConfigBuilder {
    entries: Vec<EntryType>,
}

enum EntryType {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(EntryType::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(EntryType::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// A setting written commented out, as an example the user fills in.
    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(EntryType::Setting {
            line: format!("# {key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                EntryType::Setting { line, .. } => Some(line.len()),
                EntryType::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                EntryType::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.join("\n")
    }
}
