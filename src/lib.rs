//! `rate-form` library crate.
//!
//! The binary (`rate`) is a thin wrapper around this library so that:
//!
//! - the submission workflow is testable without a terminal or a network
//! - the scripted `submit` command and the TUI share one controller

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod geo;
pub mod remote;
pub mod tui;
pub mod workflow;

#[cfg(test)]
mod test_support;
