//! The 1–10 rating and its validator.

use std::num::IntErrorKind;

use serde::Serialize;
use thiserror::Error;

/// Field-level validation failure, shown next to the rating control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Rating is required")]
    Required,
    #[error("Rating must be a whole number")]
    NotANumber,
    #[error("Rating must be at least {min}", min = Rating::MIN)]
    TooLow(i64),
    #[error("Rating must be at most {max}", max = Rating::MAX)]
    TooHigh(i64),
}

/// A validated energy/mood rating in `[Rating::MIN, Rating::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Validate an integer value.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value < i64::from(Self::MIN) {
            return Err(ValidationError::TooLow(value));
        }
        if value > i64::from(Self::MAX) {
            return Err(ValidationError::TooHigh(value));
        }
        Ok(Self(value as u8))
    }

    /// Validate a raw form value.
    ///
    /// `None` and blank text both mean the user never picked a level.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        let text = raw.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(ValidationError::Required);
        }
        let value: i64 = text.parse().map_err(|e: std::num::ParseIntError| match e.kind() {
            // Still an integer, just past what i64 holds.
            IntErrorKind::PosOverflow => ValidationError::TooHigh(i64::MAX),
            IntErrorKind::NegOverflow => ValidationError::TooLow(i64::MIN),
            _ => ValidationError::NotANumber,
        })?;
        Self::new(value)
    }

    /// Validate an optional selection (the TUI's rating control).
    pub fn from_selection(selected: Option<u8>) -> Result<Self, ValidationError> {
        match selected {
            Some(v) => Self::new(i64::from(v)),
            None => Err(ValidationError::Required),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn level(self) -> &'static RatingLevel {
        &LEVELS[usize::from(self.0 - Self::MIN)]
    }

    /// Next level up, saturating at the top of the scale.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX))
    }

    /// Next level down, saturating at the bottom of the scale.
    pub fn prev(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN))
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One selectable level on the rating control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingLevel {
    pub value: u8,
    pub emoji: &'static str,
}

pub const LEVELS: [RatingLevel; 10] = [
    RatingLevel { value: 1, emoji: "😴" },
    RatingLevel { value: 2, emoji: "🥱" },
    RatingLevel { value: 3, emoji: "😒" },
    RatingLevel { value: 4, emoji: "🫥" },
    RatingLevel { value: 5, emoji: "😐" },
    RatingLevel { value: 6, emoji: "🙂" },
    RatingLevel { value: 7, emoji: "😀" },
    RatingLevel { value: 8, emoji: "😎" },
    RatingLevel { value: 9, emoji: "🤩" },
    RatingLevel { value: 10, emoji: "🥳" },
];
