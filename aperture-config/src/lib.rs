//! Shared configuration library for Aperture.
//!
//! This crate centralizes settings loading and validation for the token
//! core: the signing secret and algorithm plus the three token lifetimes,
//! read from an optional TOML file with `APERTURE_*` environment overrides
//! (`.env` files are honored via `dotenvy`). It also carries the tracing
//! bootstrap so every binary logs the same way.

pub mod loader;
pub mod models;
pub mod telemetry;

pub use loader::{ConfigError, SettingsLoader};
pub use models::{AuthSettings, Settings};
pub use telemetry::init_tracing;
