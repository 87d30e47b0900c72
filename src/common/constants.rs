//! Application constants and default values for dawnlight.
//!
//! Configuration defaults, validation limits, and operational constants used
//! throughout the application.

// ═══ Device Defaults ═══

pub const DEFAULT_DEVICE_PORT: u16 = 16021; // Nanoleaf Open API port
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10; // seconds

// ═══ Location Defaults ═══

pub const DEFAULT_LATITUDE: f64 = 42.317794;
pub const DEFAULT_LONGITUDE: f64 = -72.631973;

// ═══ Scheduler Defaults ═══
// Used when the configuration leaves a value unset

pub const DEFAULT_GRACE_WINDOW: u64 = 10; // minutes an event may be late and still fire
pub const DEFAULT_MAX_SLEEP: u64 = 20; // minutes between schedule rebuilds at most
pub const DEFAULT_RETENTION: u64 = 2; // days a fired event is remembered
pub const DEFAULT_RETRY_DELAY: u64 = 30; // seconds before retrying a failed action
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5; // failed attempts before an occurrence is dropped
pub const MIN_SLEEP_SECS: u64 = 1;

// ═══ Validation Limits ═══

pub const MINIMUM_REQUEST_TIMEOUT: u64 = 1;
pub const MAXIMUM_REQUEST_TIMEOUT: u64 = 120;

pub const MINIMUM_GRACE_WINDOW: u64 = 1;
pub const MAXIMUM_GRACE_WINDOW: u64 = 120;

pub const MINIMUM_MAX_SLEEP: u64 = 1;
pub const MAXIMUM_MAX_SLEEP: u64 = 240;

pub const MINIMUM_RETENTION: u64 = 1;
pub const MAXIMUM_RETENTION: u64 = 30;

pub const MINIMUM_RETRY_DELAY: u64 = 1;
pub const MAXIMUM_RETRY_DELAY: u64 = 3600;

pub const MINIMUM_MAX_ATTEMPTS: u32 = 1;
pub const MAXIMUM_MAX_ATTEMPTS: u32 = 100;

pub const MAXIMUM_BRIGHTNESS: u8 = 100;
pub const MAXIMUM_FADE_SECONDS: u32 = 6 * 60 * 60;
pub const MAXIMUM_SUNRISE_OFFSET: i64 = 12 * 60; // minutes either side of sunrise

// ═══ Files ═══

pub const CONFIG_DIR_NAME: &str = "dawnlight";
pub const CONFIG_FILE_NAME: &str = "dawnlight.toml";
pub const LOCK_FILE_NAME: &str = "dawnlight.lock";

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1;
