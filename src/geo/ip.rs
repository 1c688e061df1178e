//! IP-based position lookup.
//!
//! A terminal has no GPS, so the closest stand-in for a browser position request
//! is asking an IP geolocation service. The request is bounded by
//! `PositionOptions::timeout` and never served from a cache.

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;

use crate::domain::Coordinates;

use super::{GeoError, Locator, PositionOptions};

pub const DEFAULT_GEO_URL: &str = "http://ip-api.com/json";

pub struct IpLocator {
    client: Client,
    url: String,
}

impl IpLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

impl Locator for IpLocator {
    fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, GeoError> {
        if options.high_accuracy {
            debug!("high accuracy requested; IP lookup resolves to city level at best");
        }

        let mut req = self.client.get(&self.url).timeout(options.timeout);
        if options.maximum_age.is_zero() {
            req = req.header(CACHE_CONTROL, "no-cache");
        }

        let resp = req.send().map_err(|e| {
            if e.is_timeout() {
                GeoError::timeout(format!("no position within {} ms", options.timeout.as_millis()))
            } else {
                GeoError::unavailable(format!("IP lookup failed: {e}"))
            }
        })?;

        if !resp.status().is_success() {
            return Err(GeoError::unavailable(format!(
                "IP lookup failed with status {}",
                resp.status()
            )));
        }

        let body: LookupResponse = resp.json().map_err(|e| {
            if e.is_timeout() {
                GeoError::timeout(format!("no position within {} ms", options.timeout.as_millis()))
            } else {
                GeoError::unavailable(format!("Failed to parse IP lookup response: {e}"))
            }
        })?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| body.status.clone());
            return Err(GeoError::unavailable(format!("IP lookup refused: {reason}")));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon)
                .ok_or_else(|| GeoError::unavailable(format!("IP lookup returned invalid position {lat},{lon}"))),
            _ => Err(GeoError::unavailable("IP lookup returned no position")),
        }
    }
}
