//! Astronomical sunrise calculation.
//!
//! The scheduler only needs one thing from astronomy: the instant the sun rises
//! on a given calendar date at a fixed location. [`SunriseSource`] is that
//! contract; [`SolarSunrise`] fulfils it with the `sunrise` crate.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

/// Source of sunrise instants for a fixed location.
///
/// Implementations must be deterministic: the same date always yields the
/// same instant.
pub trait SunriseSource {
    /// The sunrise instant on `date`.
    fn sunrise(&self, date: NaiveDate) -> Result<DateTime<Utc>>;
}

/// Sunrise calculated from geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarSunrise {
    latitude: f64,
    longitude: f64,
}

impl SolarSunrise {
    /// Create a sunrise source for the given coordinates.
    ///
    /// Fails when latitude is outside ±90° or longitude outside ±180°.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl SunriseSource for SolarSunrise {
    fn sunrise(&self, date: NaiveDate) -> Result<DateTime<Utc>> {
        let coord = coordinates(self.latitude, self.longitude)?;
        let sunrise = SolarDay::new(coord, date).event_time(SolarEvent::Sunrise);

        // Polar day/night: the solver returns an instant far from the requested date
        let reference = date
            .and_hms_opt(12, 0, 0)
            .context("Invalid reference time")?
            .and_utc();
        let offset = sunrise.signed_duration_since(reference);
        if offset.num_hours().abs() > 36 {
            anyhow::bail!(
                "No sunrise at {:.4}°, {:.4}° on {date}",
                self.latitude,
                self.longitude
            );
        }

        Ok(truncate_to_second(sunrise))
    }
}

fn coordinates(latitude: f64, longitude: f64) -> Result<Coordinates> {
    Coordinates::new(latitude, longitude).ok_or_else(|| {
        anyhow::anyhow!("Invalid coordinates: latitude={latitude:.4}, longitude={longitude:.4}")
    })
}

/// Drop sub-second precision so schedule keys compare equal across rebuilds
fn truncate_to_second(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
