//! Domain types used throughout the submission workflow.
//!
//! This module defines:
//!
//! - the validated rating (`Rating`) and its field-level validator
//! - the ten labelled rating levels shown by the form
//! - coordinates, the outbound payload, and the endpoint's reply

pub mod rating;
pub mod types;

pub use rating::*;
pub use types::*;
