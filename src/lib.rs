//! Edlskip - automatic intro and recap skipping for media servers
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod host;
pub mod scheduler;
pub mod skip;
