//! Configuration system for dawnlight.
//!
//! Settings live in a single TOML file, `dawnlight.toml`, searched in:
//! 1. the directory given with `--config <dir>`
//! 2. **XDG_CONFIG_HOME**/dawnlight/dawnlight.toml
//!
//! A commented default file is written the first time the default location is
//! used.
//!
//! ## Configuration Structure
//!
//! ```toml
//! #[Device]
//! device_address = "192.168.0.198" # Nanoleaf address on the local network
//! device_port = 16021              # Open API port
//! auth_token = "..."               # Token from the device pairing step
//! request_timeout = 10             # HTTP request timeout in seconds (1-120)
//!
//! #[Location]
//! latitude = 42.317794
//! longitude = -72.631973
//! timezone = "America/New_York"    # IANA zone for fixed clock times (default: system)
//!
//! #[Scheduler]
//! grace_window = 10                # Minutes an event may be late and still fire (1-120)
//! max_sleep = 20                   # Maximum minutes between schedule rebuilds (1-240)
//! retention = 2                    # Days a fired event is remembered (1-30)
//! retry_delay = 30                 # Seconds before retrying a failed action (1-3600)
//! max_attempts = 5                 # Failed attempts before giving up on an occurrence (1-100)
//!
//! [[event]]
//! name = "sunrise-fade-in"
//! sunrise_offset = -30             # Minutes relative to sunrise
//! action = "fade_in"
//! effect = "Coral Sunrise"
//! brightness = 100
//! fade_seconds = 1800
//! ```
//!
//! Every top-level key is optional; unset keys fall back to the defaults in
//! [`crate::common::constants`]. Without any `[[event]]` table the built-in
//! catalog is used.

pub mod builder;
pub mod loading;
pub mod validation;

use chrono_tz::Tz;
use serde::Deserialize;
use std::time::Duration;

use crate::common::constants::*;
use crate::common::utils::redact_token;

// Re-export public API
pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Kind of action an `[[event]]` table performs.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    FadeIn,
    SwitchEffect,
    SetBrightness,
    SetColor,
    PowerOff,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::FadeIn => "fade_in",
            ActionKind::SwitchEffect => "switch_effect",
            ActionKind::SetBrightness => "set_brightness",
            ActionKind::SetColor => "set_color",
            ActionKind::PowerOff => "power_off",
        }
    }
}

/// One `[[event]]` table as written in the configuration file.
///
/// Exactly one of `at` and `sunrise_offset` selects the trigger. The remaining
/// fields are the action's parameters; which ones are required depends on
/// `action`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EventConfig {
    pub name: String,
    pub at: Option<String>,          // "HH:MM" or "HH:MM:SS", schedule timezone
    pub sunrise_offset: Option<i64>, // minutes, negative = before sunrise
    pub action: ActionKind,
    pub effect: Option<String>,
    pub brightness: Option<u8>,
    pub fade_seconds: Option<u32>,
    pub color: Option<[u8; 3]>,
    pub enabled: Option<bool>,
}

impl EventConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Configuration structure for dawnlight.
///
/// ## Configuration Categories
///
/// - **Device**: `device_address`, `device_port`, `auth_token`, `request_timeout`
/// - **Location**: `latitude`, `longitude`, `timezone`
/// - **Scheduler**: `grace_window`, `max_sleep`, `retention`, `retry_delay`, `max_attempts`
/// - **Events**: the `[[event]]` tables
///
/// The device address and token are only required when talking to a real
/// device; `schedule`, `simulate` and `--dry-run` work without them.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    pub device_address: Option<String>,
    pub device_port: Option<u16>,
    pub auth_token: Option<String>,
    pub request_timeout: Option<u64>, // seconds

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,

    pub grace_window: Option<u64>, // minutes
    pub max_sleep: Option<u64>,    // minutes
    pub retention: Option<u64>,    // days
    pub retry_delay: Option<u64>,  // seconds
    pub max_attempts: Option<u32>,

    #[serde(default, rename = "event")]
    pub events: Vec<EventConfig>,
}

impl Config {
    pub fn device_port(&self) -> u16 {
        self.device_port.unwrap_or(DEFAULT_DEVICE_PORT)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
    }

    /// Latitude and longitude, falling back to the defaults.
    pub fn coordinates(&self) -> (f64, f64) {
        (
            self.latitude.unwrap_or(DEFAULT_LATITUDE),
            self.longitude.unwrap_or(DEFAULT_LONGITUDE),
        )
    }

    /// The timezone fixed clock times are interpreted in.
    ///
    /// Uses the configured `timezone`, then the system zone, then UTC. An
    /// unparseable configured name is rejected by validation before this runs.
    pub fn schedule_timezone(&self) -> Tz {
        if let Some(name) = self.timezone.as_deref()
            && let Ok(tz) = name.parse::<Tz>()
        {
            return tz;
        }

        match crate::geo::get_system_timezone() {
            Some(tz) => tz,
            None => {
                log_warning!("Could not detect the system timezone, using UTC");
                Tz::UTC
            }
        }
    }

    pub fn log_config(&self) {
        let config_source = match get_custom_config_dir() {
            Some(_) => "custom configuration",
            None => "default configuration",
        };
        log_block_start!("Loaded {}", config_source);

        match (&self.device_address, &self.auth_token) {
            (Some(address), Some(token)) => log_indented!(
                "Device: {}:{} (token {})",
                address,
                self.device_port(),
                redact_token(token)
            ),
            _ => log_indented!("Device: not configured"),
        }

        let (lat, lon) = self.coordinates();
        let lat_dir = if lat >= 0.0 { "N" } else { "S" };
        let lon_dir = if lon >= 0.0 { "E" } else { "W" };
        log_indented!(
            "Location: {:.3}°{}, {:.3}°{}",
            lat.abs(),
            lat_dir,
            lon.abs(),
            lon_dir
        );
        log_indented!("Timezone: {}", self.schedule_timezone());

        log_indented!(
            "Grace window: {} minutes",
            self.grace_window.unwrap_or(DEFAULT_GRACE_WINDOW)
        );
        log_indented!(
            "Max sleep: {} minutes",
            self.max_sleep.unwrap_or(DEFAULT_MAX_SLEEP)
        );

        let enabled = self.events.iter().filter(|e| e.is_enabled()).count();
        if self.events.is_empty() {
            log_indented!("Events: built-in catalog");
        } else if enabled == self.events.len() {
            log_indented!("Events: {} configured", enabled);
        } else {
            log_indented!(
                "Events: {} configured, {} disabled",
                enabled,
                self.events.len() - enabled
            );
        }
    }
}
