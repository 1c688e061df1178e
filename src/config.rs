//! Runtime configuration.
//!
//! Values come from `.env` / the process environment first, then CLI flags
//! override them. The resolved [`Config`] is passed into constructors; nothing
//! downstream reads the environment.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use log::info;

use crate::cli::FormArgs;
use crate::domain::Coordinates;
use crate::error::AppError;
use crate::geo::PositionOptions;
use crate::geo::ip::DEFAULT_GEO_URL;

pub const ENV_ENDPOINT_URL: &str = "RATE_ENDPOINT_URL";
pub const ENV_LOCATOR: &str = "RATE_LOCATOR";
pub const ENV_LAT: &str = "RATE_LAT";
pub const ENV_LNG: &str = "RATE_LNG";
pub const ENV_GEO_URL: &str = "RATE_GEO_URL";
pub const ENV_GEO_TIMEOUT_MS: &str = "RATE_GEO_TIMEOUT_MS";
pub const ENV_NOTICE_MS: &str = "RATE_NOTICE_MS";
pub const ENV_SUBMIT_TIMEOUT_MS: &str = "RATE_SUBMIT_TIMEOUT_MS";

pub const DEFAULT_NOTICE_MS: u64 = 3_000;

/// Where positions come from.
///
/// Sharing a position is opt-in: unless `ip` or `fixed` is chosen, every
/// submission goes out without coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LocatorKind {
    /// Look the position up from the public IP address.
    Ip,
    /// Use `--lat`/`--lng` (or `RATE_LAT`/`RATE_LNG`).
    Fixed,
    /// Refuse to share a position.
    #[default]
    Deny,
    /// No geolocation capability.
    Off,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub endpoint_url: String,
    pub locator: LocatorKind,
    pub fixed_position: Option<Coordinates>,
    pub geo_url: String,
    pub position: PositionOptions,
    /// How long success/error/geo-error notices stay up.
    pub notice_duration: Duration,
    pub submit_timeout: Option<Duration>,
}

impl Config {
    /// Load `.env`, read the environment, then apply CLI overrides.
    pub fn resolve(args: &FormArgs) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok(), args)
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F, args: &FormArgs) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let endpoint_url = args
            .endpoint
            .clone()
            .or_else(|| var(ENV_ENDPOINT_URL))
            .ok_or_else(|| {
                AppError::usage(format!(
                    "Missing {ENV_ENDPOINT_URL} in environment (.env); or pass --endpoint."
                ))
            })?;
        reqwest::Url::parse(&endpoint_url)
            .map_err(|e| AppError::usage(format!("Invalid endpoint URL '{endpoint_url}': {e}")))?;

        let locator = match args.locator {
            Some(kind) => kind,
            None => match var(ENV_LOCATOR) {
                Some(raw) => <LocatorKind as ValueEnum>::from_str(&raw, true)
                    .map_err(|e| AppError::usage(format!("Invalid {ENV_LOCATOR} value: {e}")))?,
                None => LocatorKind::default(),
            },
        };

        let lat = match args.lat {
            Some(v) => Some(v),
            None => parse_opt::<f64>(ENV_LAT, var(ENV_LAT))?,
        };
        let lng = match args.lng {
            Some(v) => Some(v),
            None => parse_opt::<f64>(ENV_LNG, var(ENV_LNG))?,
        };
        let fixed_position = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng).ok_or_else(|| {
                AppError::usage(format!("Coordinates out of range: {lat},{lng}"))
            })?),
            (None, None) => None,
            _ => return Err(AppError::usage("Latitude and longitude must be given together.")),
        };
        if locator == LocatorKind::Fixed && fixed_position.is_none() {
            return Err(AppError::usage(
                "Locator 'fixed' needs --lat/--lng (or RATE_LAT/RATE_LNG).",
            ));
        }

        let geo_timeout_ms = match args.geo_timeout_ms {
            Some(v) => v,
            None => parse_opt(ENV_GEO_TIMEOUT_MS, var(ENV_GEO_TIMEOUT_MS))?
                .unwrap_or(PositionOptions::default().timeout.as_millis() as u64),
        };
        let notice_ms = match args.notice_ms {
            Some(v) => v,
            None => parse_opt(ENV_NOTICE_MS, var(ENV_NOTICE_MS))?.unwrap_or(DEFAULT_NOTICE_MS),
        };
        let submit_timeout = parse_opt::<u64>(ENV_SUBMIT_TIMEOUT_MS, var(ENV_SUBMIT_TIMEOUT_MS))?
            .map(Duration::from_millis);

        let geo_url = var(ENV_GEO_URL).unwrap_or_else(|| {
            info!("{ENV_GEO_URL} not set, using default: {DEFAULT_GEO_URL}");
            DEFAULT_GEO_URL.to_string()
        });

        Ok(Self {
            endpoint_url,
            locator,
            fixed_position,
            geo_url,
            position: PositionOptions {
                timeout: Duration::from_millis(geo_timeout_ms),
                ..PositionOptions::default()
            },
            notice_duration: Duration::from_millis(notice_ms),
            submit_timeout,
        })
    }
}

fn parse_opt<T: FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>, AppError>
where
    T::Err: Display,
{
    raw.map(|v| {
        v.trim()
            .parse()
            .map_err(|e| AppError::usage(format!("Invalid {key} value '{v}': {e}")))
    })
    .transpose()
}
