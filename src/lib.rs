//! Hourly dispatch simulation of solar, wind, storage and gas serving a data-center load.

pub mod cli;
/// TOML scenarios and presets.
pub mod config;
pub mod error;
pub mod io;
/// Synthetic hourly profiles.
pub mod profiles;
pub mod reporting;
/// Series alignment, dispatch engine, metrics and sweeps.
pub mod sim;
pub mod telemetry;
