//! Refrain Server
//!
//! HTTP surface and configuration for the Refrain practice engine.
//! The `refrain` binary in `src/bin/cli.rs` wraps both for the terminal.

pub mod api;
pub mod config;

pub use config::ServerConfig;
