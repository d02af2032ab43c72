//! Data models for AqiMap
//!
//! - Location: validated coordinates inside India
//! - Air quality, radiation and climate records produced by the fetchers
//! - Display: the per-query aggregate with per-section availability

pub mod air_quality;
pub mod climate;
pub mod display;
pub mod location;
pub mod radiation;

pub use air_quality::AirQualityRecord;
pub use climate::{ClimateRecord, DailyMetrics};
pub use display::{DisplayRecord, Section};
pub use location::{BoundingBox, INDIA, INDIA_CENTER, Location};
pub use radiation::{RadiationRecord, RadiationSample};
