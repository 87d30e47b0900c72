//! Time source abstraction for real and simulated time.
//!
//! The scheduler loop never reads the system clock directly: it asks a
//! [`TimeSource`] for "now" and for sleeping. [`RealTimeSource`] is the wall
//! clock; [`SimulatedTimeSource`] is a fast-forward clock where sleeping advances
//! time instantly, used by the `simulate` command and by tests that drive the
//! loop end to end.
//!
//! A process-wide registration exists only so the logger can stamp simulated
//! lines. Everything that schedules receives its source explicitly.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

/// Global time source instance, used by the logger for timestamp prefixes
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current instant
    fn now(&self) -> DateTime<Utc>;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Fast-forward simulated clock.
///
/// `sleep` advances the clock by exactly the requested duration without
/// blocking, capped at `end_time`. Once the end is reached [`is_ended`]
/// reports true and the scheduler loop stops.
///
/// [`is_ended`]: TimeSource::is_ended
pub struct SimulatedTimeSource {
    current: Mutex<DateTime<Utc>>,
    end_time: DateTime<Utc>,
}

impl SimulatedTimeSource {
    /// Create a simulated clock running from `start_time` to `end_time`.
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start_time),
            end_time,
        }
    }

    /// Create a simulated clock that never ends, for tests.
    pub fn unbounded(start_time: DateTime<Utc>) -> Self {
        Self::new(start_time, DateTime::<Utc>::MAX_UTC)
    }

    /// Move the clock forward without going through `sleep`.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = (*current + duration).min(self.end_time);
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sleep(&self, duration: StdDuration) {
        let step = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = current
            .checked_add_signed(step)
            .unwrap_or(self.end_time)
            .min(self.end_time);
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.now() >= self.end_time
    }
}

/// Register the process-wide time source (call once at startup)
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Check if the time source has been initialized
pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// Get the current time from the global time source
pub fn now() -> DateTime<Utc> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}

/// Check if we're running in simulation mode
pub fn is_simulated() -> bool {
    TIME_SOURCE
        .get()
        .map(|source| source.is_simulated())
        .unwrap_or(false)
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS" in a specific timezone
pub fn parse_datetime_in_tz(s: &str, tz: Tz) -> Result<DateTime<Tz>, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))
        .and_then(|naive| {
            tz.from_local_datetime(&naive)
                .earliest()
                .ok_or_else(|| format!("{s} does not exist in timezone {tz}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        parse_datetime_in_tz(s, Tz::UTC).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_simulated_sleep_advances_clock() {
        let source = SimulatedTimeSource::new(
            instant("2026-06-01 08:00:00"),
            instant("2026-06-01 12:00:00"),
        );
        source.sleep(StdDuration::from_secs(20 * 60));
        assert_eq!(source.now(), instant("2026-06-01 08:20:00"));
        assert!(!source.is_ended());
    }

    #[test]
    fn test_simulated_sleep_caps_at_end() {
        let source = SimulatedTimeSource::new(
            instant("2026-06-01 08:00:00"),
            instant("2026-06-01 08:30:00"),
        );
        source.sleep(StdDuration::from_secs(3600));
        assert_eq!(source.now(), instant("2026-06-01 08:30:00"));
        assert!(source.is_ended());
    }

    #[test]
    fn test_unbounded_source_survives_huge_sleep() {
        let source = SimulatedTimeSource::unbounded(instant("2026-06-01 08:00:00"));
        source.sleep(StdDuration::MAX);
        assert!(source.now() > instant("2026-06-01 08:00:00"));
    }

    #[test]
    fn test_parse_datetime_in_tz() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let parsed = parse_datetime_in_tz("2026-06-01 10:15:00", tz).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), instant("2026-06-01 14:15:00"));

        assert!(parse_datetime_in_tz("2026-06-01 10:15", tz).is_err());
        // Spring-forward gap
        assert!(parse_datetime_in_tz("2026-03-08 02:30:00", tz).is_err());
    }
}
