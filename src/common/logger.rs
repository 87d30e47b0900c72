//! Structured logging with box-drawing output.
//!
//! Every status line dawnlight prints goes through the macros defined here so the
//! daemon's stdout reads as one continuous tree:
//!
//! ```text
//! ┏ dawnlight v0.3.0 ━━╸
//! ┃
//! ┣ Schedule at 2026-10-16 08:00:00 EDT
//! ┃   Fri 10:15:00  morning-off      power off (in 2h 15m)
//! ┃   Fri 20:00:00  nightlight-on    color #210000 (in 12h)
//! ┣ Next: 'morning-off' in 2h 15m
//! ┃   Sleeping 20m
//! ╹
//! ```
//!
//! ## Logging Conventions
//!
//! - **`log_block_start!`**: opens a new conceptual block (a scheduling pass, a fired
//!   event, a reload). Prints an empty pipe for spacing, then `┣ message`.
//! - **`log_decorated!`**: a line that belongs to the current block (`┣ message`).
//! - **`log_indented!`**: nested detail under the previous line (`┃   message`).
//! - **`log_pipe!`**: a single empty `┃` line. Use it before a level macro that starts
//!   its own block, never at the end of a block.
//! - **`log_version!`** / **`log_end!`**: the header and the final `╹` marker.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`**:
//!   semantic lines with a colored `[LEVEL]` tag.
//!
//! Output can be switched off at runtime with [`Log::set_enabled`], which the
//! tests use to keep stdout quiet.

use std::io::Write;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Timezone used for simulated timestamps
static SCHEDULE_TIMEZONE: RwLock<Option<chrono_tz::Tz>> = RwLock::new(None);

/// Main logging interface.
pub struct Log;

impl Log {
    /// Enable or disable all log output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Set the timezone used for simulation timestamps. A reload may replace it.
    pub fn set_timezone(tz: chrono_tz::Tz) {
        if let Ok(mut zone) = SCHEDULE_TIMEZONE.write() {
            *zone = Some(tz);
        }
    }

    /// Timezone currently used for simulation timestamps.
    pub fn timezone() -> Option<chrono_tz::Tz> {
        SCHEDULE_TIMEZONE.read().ok().and_then(|zone| *zone)
    }

    /// Timestamp prefix for simulation mode, empty when running on the real clock.
    ///
    /// Real runs are usually captured by journald which stamps lines itself, so the
    /// prefix only appears when the clock is simulated and wall time is meaningless.
    pub fn get_timestamp_prefix() -> String {
        if !crate::time::source::is_initialized() || !crate::time::source::is_simulated() {
            return String::new();
        }

        let now = crate::time::source::now();
        match Self::timezone() {
            Some(tz) => format!("[{}] ", now.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S")),
            None => format!("[{}] ", now.format("%Y-%m-%d %H:%M:%SZ")),
        }
    }
}

/// Write one formatted line group to stdout.
///
/// `lead` is printed before the message on the first line; `spaced` prepends an
/// empty pipe line. Used by the macros, not meant to be called directly.
#[doc(hidden)]
pub fn emit(lead: &str, message: std::fmt::Arguments<'_>, spaced: bool) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::get_timestamp_prefix();
    let text = if spaced {
        format!("{prefix}┃\n{prefix}{lead}{message}\n")
    } else {
        format!("{prefix}{lead}{message}\n")
    };
    write_output(&text);
}

/// Route formatted text to stdout.
pub fn write_output(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}

// # Logging Macros

/// Log a line that belongs to the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => {
        $crate::common::logger::emit("┣ ", format_args!($($arg)+), false)
    };
}

/// Log nested detail under the previous line.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => {
        $crate::common::logger::emit("┃   ", format_args!($($arg)+), false)
    };
}

/// Log an empty pipe for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::common::logger::emit("┃", format_args!(""), false)
    };
}

/// Start a new block of related output.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {
        $crate::common::logger::emit("┣ ", format_args!($($arg)+), true)
    };
}

/// Log the application header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::common::logger::emit(
            "┏ ",
            format_args!("dawnlight v{} ━━╸", env!("CARGO_PKG_VERSION")),
            false,
        )
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::common::logger::emit("╹", format_args!(""), false)
    };
}

/// Log a warning with a yellow tag.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::common::logger::emit("┣[\x1b[33mWARNING\x1b[0m] ", format_args!($($arg)+), false)
    };
}

/// Log an error with a red tag.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::common::logger::emit("┣[\x1b[31mERROR\x1b[0m] ", format_args!($($arg)+), false)
    };
}

/// Log a terminating error: closes the tree with `┗`.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {
        $crate::common::logger::emit("┗[\x1b[31mERROR\x1b[0m] ", format_args!($($arg)+), true)
    };
}

/// Log an informational message with a green tag.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::common::logger::emit("┣[\x1b[32mINFO\x1b[0m] ", format_args!($($arg)+), false)
    };
}

/// Log a debug message with a green tag.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::common::logger::emit("┣[\x1b[32mDEBUG\x1b[0m] ", format_args!($($arg)+), false)
    };
}

/// Log a critical message with a red tag.
#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => {
        $crate::common::logger::emit("┣[\x1b[31mCRITICAL\x1b[0m] ", format_args!($($arg)+), false)
    };
}
