//! Nanoleaf Open API client.
//!
//! Nanoleaf panels expose a small REST API on the local network:
//!
//! - `PUT {base}/effects` with `{"select": name}` selects an effect
//! - `PUT {base}/state` changes power, brightness, hue and saturation
//! - `GET {base}/effects/effectsList` lists the installed effects
//!
//! where `{base}` is `http://{address}:{port}/api/v1/{auth_token}`. Requests are
//! blocking; the scheduler loop waits for each one to finish. The client applies
//! its own request timeout so a hung device cannot stall the loop forever.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::time::Duration;

use super::{LightDevice, Rgb};
use crate::common::utils::redact_token;
use crate::config::Config;

/// Blocking HTTP client for one Nanoleaf device.
pub struct NanoleafClient {
    client: reqwest::blocking::Client,
    base_url: String,
    debug_enabled: bool,
}

impl NanoleafClient {
    /// Create a client for the device at `address:port` using `auth_token`.
    pub fn new(
        address: &str,
        port: u16,
        auth_token: &str,
        timeout: Duration,
        debug_enabled: bool,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        if debug_enabled {
            log_debug!(
                "Nanoleaf endpoint: http://{address}:{port}/api/v1/{}",
                redact_token(auth_token)
            );
        }

        Ok(Self {
            client,
            base_url: base_url(address, port, auth_token),
            debug_enabled,
        })
    }

    /// Create a client from the device settings in `config`.
    pub fn from_config(config: &Config, debug_enabled: bool) -> Result<Self> {
        let address = config
            .device_address
            .as_deref()
            .context("device_address is not set in the configuration")?;
        let token = config
            .auth_token
            .as_deref()
            .context("auth_token is not set in the configuration")?;

        Self::new(
            address,
            config.device_port(),
            token,
            config.request_timeout(),
            debug_enabled,
        )
    }

    fn put(&self, path: &str, body: Value) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        if self.debug_enabled {
            log_indented!("PUT {path} {body}");
        }

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .with_context(|| format!("Request to Nanoleaf {path} failed"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Nanoleaf {path} returned HTTP {status}");
        }
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Request to Nanoleaf {path} failed"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Nanoleaf {path} returned HTTP {status}");
        }
        response
            .json()
            .with_context(|| format!("Invalid JSON from Nanoleaf {path}"))
    }
}

impl LightDevice for NanoleafClient {
    fn set_effect(&mut self, name: &str) -> Result<()> {
        self.put("/effects", effect_payload(name))
    }

    fn set_brightness(&mut self, value: u8, fade_seconds: Option<u32>) -> Result<()> {
        self.put("/state", brightness_payload(value, fade_seconds))
    }

    fn set_color(&mut self, color: Rgb) -> Result<()> {
        self.put("/state", color_payload(color))
    }

    fn power_off(&mut self) -> Result<()> {
        self.put("/state", power_payload(false))
    }

    fn effects(&mut self) -> Result<Option<Vec<String>>> {
        let list = self.get("/effects/effectsList")?;
        let names = serde_json::from_value(list).context("Unexpected effects list format")?;
        Ok(Some(names))
    }

    fn device_name(&self) -> &'static str {
        "Nanoleaf"
    }
}

fn base_url(address: &str, port: u16, auth_token: &str) -> String {
    format!("http://{address}:{port}/api/v1/{auth_token}")
}

fn effect_payload(name: &str) -> Value {
    json!({ "select": name })
}

fn brightness_payload(value: u8, fade_seconds: Option<u32>) -> Value {
    match fade_seconds {
        Some(duration) => json!({ "brightness": { "value": value, "duration": duration } }),
        None => json!({ "brightness": { "value": value } }),
    }
}

fn color_payload(color: Rgb) -> Value {
    let (hue, saturation, brightness) = color.to_hsb();
    json!({
        "hue": { "value": hue },
        "sat": { "value": saturation },
        "brightness": { "value": brightness, "duration": 0 },
    })
}

fn power_payload(on: bool) -> Value {
    json!({ "on": { "value": on } })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(
            base_url("192.168.0.198", 16021, "tok"),
            "http://192.168.0.198:16021/api/v1/tok"
        );
    }

    #[test]
    fn test_effect_payload() {
        assert_eq!(
            effect_payload("Coral Sunrise"),
            json!({ "select": "Coral Sunrise" })
        );
    }

    #[test]
    fn test_brightness_payload_with_and_without_fade() {
        assert_eq!(
            brightness_payload(100, None),
            json!({ "brightness": { "value": 100 } })
        );
        assert_eq!(
            brightness_payload(80, Some(1800)),
            json!({ "brightness": { "value": 80, "duration": 1800 } })
        );
    }

    #[test]
    fn test_color_payload_uses_hsb() {
        assert_eq!(
            color_payload(Rgb::new(33, 0, 0)),
            json!({
                "hue": { "value": 0 },
                "sat": { "value": 100 },
                "brightness": { "value": 13, "duration": 0 },
            })
        );
    }

    #[test]
    fn test_power_payload() {
        assert_eq!(power_payload(false), json!({ "on": { "value": false } }));
    }

    #[test]
    fn test_from_config_requires_address_and_token() {
        let mut config = Config::default();
        assert!(NanoleafClient::from_config(&config, false).is_err());

        config.device_address = Some("192.168.0.198".to_string());
        let err = NanoleafClient::from_config(&config, false)
            .err()
            .unwrap()
            .to_string();
        assert!(err.contains("auth_token"));

        config.auth_token = Some("secret-token".to_string());
        assert!(NanoleafClient::from_config(&config, false).is_ok());
    }
}
