//! Geographic location support: sunrise times and the local timezone.
//!
//! ## Module Structure
//!
//! - [`solar`]: the [`SunriseSource`] contract and its astronomical implementation
//! - [`timezone`]: system timezone detection for schedules without an explicit zone

pub mod solar;
pub mod timezone;

pub use solar::{SolarSunrise, SunriseSource};
pub use timezone::get_system_timezone;

#[cfg(test)]
mod tests;
