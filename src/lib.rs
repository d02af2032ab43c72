//! `AqiMap` - Air quality, satellite radiation and climate data for India
//!
//! This library resolves a place name or coordinates inside India and
//! gathers current air quality, satellite radiation and multi-model climate
//! summaries from Open-Meteo into one dashboard record.

pub mod api;
pub mod aqi;
pub mod cache;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod geocoder;
pub mod logging;
pub mod models;
pub mod open_meteo;
pub mod query;
pub mod web;

// Re-export core types for public API
pub use cache::CacheStore;
pub use config::AqimapConfig;
pub use dashboard::Dashboard;
pub use error::{AqimapError, ErrorKind};
pub use models::{DisplayRecord, Location, Section};
pub use query::LocationQuery;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AqimapError>;
