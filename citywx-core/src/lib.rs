//! Core library for the `citywx` CLI.
//!
//! This crate defines:
//! - Configuration (`.env` credential, optional `citywx.toml`, output directory)
//! - The weather provider abstraction and its OpenWeather implementation
//! - The daily table of city snapshots and its CSV and chart writers
//!
//! [`pipeline::execute`] ties them together into one all-or-nothing run.

pub mod config;
pub mod date;
pub mod error;
pub mod fetch;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod provider;

pub use config::{RunContext, Settings};
pub use date::RunDate;
pub use error::SnapshotError;
pub use fetch::{TARGET_CITIES, fetch_records};
pub use model::{Observation, WeatherRecord, WeatherTable};
pub use pipeline::{RunSummary, execute, run};
pub use provider::{OpenWeatherProvider, WeatherProvider};
