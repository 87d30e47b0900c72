//! Device abstraction for the light being scheduled.
//!
//! The scheduler talks to exactly one light through the [`LightDevice`] trait.
//! Every method is idempotent from the scheduler's point of view: calling it twice
//! leaves the light in the same state as calling it once, and the only result
//! inspected is success or failure.
//!
//! ## Implementations
//!
//! - **[`NanoleafClient`]**: the Nanoleaf Open API over HTTP
//! - **[`DryRunDevice`]**: logs each call instead of sending it (`--dry-run`, `simulate`)

use anyhow::Result;
use std::fmt;

use crate::config::Config;

pub mod nanoleaf;

pub use nanoleaf::NanoleafClient;

/// Create the device the scheduler drives.
///
/// `dry_run` selects the logging [`DryRunDevice`]; otherwise a
/// [`NanoleafClient`] built from the device settings in `config`.
pub fn create_device(
    config: &Config,
    dry_run: bool,
    debug_enabled: bool,
) -> Result<Box<dyn LightDevice>> {
    if dry_run {
        return Ok(Box::new(DryRunDevice::new()));
    }
    Ok(Box::new(NanoleafClient::from_config(config, debug_enabled)?))
}

/// An RGB color as configured by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to hue (0-360), saturation (0-100), and brightness (0-100).
    pub fn to_hsb(self) -> (u16, u8, u8) {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let chroma = max - min;

        let hue = if chroma == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / chroma).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / chroma + 2.0)
        } else {
            60.0 * ((r - g) / chroma + 4.0)
        };
        let saturation = if max == 0.0 { 0.0 } else { chroma / max };

        (
            (hue.round() as u16) % 360,
            (saturation * 100.0).round() as u8,
            (max * 100.0).round() as u8,
        )
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Control surface of a single light.
#[cfg_attr(test, mockall::automock)]
pub trait LightDevice {
    /// Select a named effect (scene) on the device. Turns the light on.
    fn set_effect(&mut self, name: &str) -> Result<()>;

    /// Set brightness (0-100), fading over `fade_seconds` when given.
    fn set_brightness(&mut self, value: u8, fade_seconds: Option<u32>) -> Result<()>;

    /// Set a solid color.
    fn set_color(&mut self, color: Rgb) -> Result<()>;

    /// Turn the light off.
    fn power_off(&mut self) -> Result<()>;

    /// Names of the effects the device offers, when it can report them.
    fn effects(&mut self) -> Result<Option<Vec<String>>> {
        Ok(None)
    }

    /// Human readable name for log lines.
    fn device_name(&self) -> &'static str;
}

/// Device that only logs the calls it receives.
#[derive(Debug, Default)]
pub struct DryRunDevice {
    calls: Vec<String>,
}

impl DryRunDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn record(&mut self, call: String) {
        log_indented!("dry-run: {call}");
        self.calls.push(call);
    }
}

impl LightDevice for DryRunDevice {
    fn set_effect(&mut self, name: &str) -> Result<()> {
        self.record(format!("set_effect({name:?})"));
        Ok(())
    }

    fn set_brightness(&mut self, value: u8, fade_seconds: Option<u32>) -> Result<()> {
        match fade_seconds {
            Some(secs) => self.record(format!("set_brightness({value}, fade {secs}s)")),
            None => self.record(format!("set_brightness({value})")),
        }
        Ok(())
    }

    fn set_color(&mut self, color: Rgb) -> Result<()> {
        self.record(format!("set_color({color})"));
        Ok(())
    }

    fn power_off(&mut self) -> Result<()> {
        self.record("power_off()".to_string());
        Ok(())
    }

    fn device_name(&self) -> &'static str {
        "dry-run"
    }
}
