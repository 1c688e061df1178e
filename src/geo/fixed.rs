//! Locators that never touch the network.

use crate::domain::Coordinates;

use super::{GeoError, Locator, PositionOptions};

/// Always reports the same configured position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator {
    position: Coordinates,
}

impl FixedLocator {
    pub fn new(position: Coordinates) -> Self {
        Self { position }
    }
}

impl Locator for FixedLocator {
    fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, GeoError> {
        Ok(self.position)
    }
}

/// The user declined to share their location.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocator;

impl Locator for DeniedLocator {
    fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, GeoError> {
        Err(GeoError::denied("user denied geolocation"))
    }
}

/// No geolocation capability is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocator;

impl Locator for UnsupportedLocator {
    fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, GeoError> {
        Err(GeoError::Unsupported)
    }
}
