//! Geolocation adapter.
//!
//! The workflow asks a [`Locator`] for the current position once per attempt and
//! switches on the returned [`GeoError`] variant to decide between the
//! rating-only fallback and a generic failure.

use std::time::Duration;

use thiserror::Error;

use crate::config::{Config, LocatorKind};
use crate::domain::Coordinates;

pub mod fixed;
pub mod ip;

pub use fixed::{DeniedLocator, FixedLocator, UnsupportedLocator};
pub use ip::IpLocator;

/// Request options, mirroring what a browser position request accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position that may be reused. Zero means always ask fresh.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(10_000),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Reason a position request failed. Numeric values follow the browser codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GeoErrorCode {
    PermissionDenied = 1,
    PositionUnavailable = 2,
    Timeout = 3,
}

impl GeoErrorCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    /// The host has no way to produce a position at all.
    #[error("geolocation is not supported here")]
    Unsupported,
    /// The capability exists but this request did not produce a position.
    #[error("geolocation failed (code {}): {reason}", .code.code())]
    Position { code: GeoErrorCode, reason: String },
}

impl GeoError {
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Position {
            code: GeoErrorCode::PermissionDenied,
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Position {
            code: GeoErrorCode::PositionUnavailable,
            reason: reason.into(),
        }
    }

    pub fn timeout(reason: impl Into<String>) -> Self {
        Self::Position {
            code: GeoErrorCode::Timeout,
            reason: reason.into(),
        }
    }
}

/// Something that can report where the device is.
pub trait Locator {
    fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, GeoError>;
}

impl<L: Locator + ?Sized> Locator for Box<L> {
    fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, GeoError> {
        (**self).current_position(options)
    }
}

/// Build the locator selected by configuration.
pub fn locator_from_config(config: &Config) -> Box<dyn Locator> {
    match config.locator {
        LocatorKind::Ip => Box::new(IpLocator::new(config.geo_url.clone())),
        LocatorKind::Fixed => match config.fixed_position {
            Some(pos) => Box::new(FixedLocator::new(pos)),
            None => Box::new(UnsupportedLocator),
        },
        LocatorKind::Deny => Box::new(DeniedLocator),
        LocatorKind::Off => Box::new(UnsupportedLocator),
    }
}
