//! Open-Meteo data sources
//!
//! Each fetcher builds a provider-specific request, delegates it to an
//! [`ApiClient`](crate::client::ApiClient) and normalizes the payload into a
//! fixed record shape. Unknown response fields are ignored; missing required
//! ones fail with `MalformedResponse`.

use crate::client::QueryParams;
use crate::models::Location;
use crate::{AqimapError, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod air_quality;
pub mod climate;
pub mod satellite;

pub use air_quality::AirQualityFetcher;
pub use climate::ClimateFetcher;
pub use satellite::SatelliteFetcher;

/// Every request is made in Indian Standard Time.
pub const TIMEZONE: &str = "Asia/Kolkata";

/// A data source producing one dashboard section
#[async_trait]
pub trait Fetcher: Send + Sync {
    type Record: Send;

    async fn fetch(&self, location: &Location, date: NaiveDate) -> Result<Self::Record>;
}

fn coordinate_params(location: &Location) -> QueryParams {
    vec![
        ("latitude", location.latitude.to_string()),
        ("longitude", location.longitude.to_string()),
    ]
}

/// Decode a payload into its provider struct, mapping shape errors to
/// `MalformedResponse`.
fn decode<T: DeserializeOwned>(provider: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| AqimapError::malformed(provider, e.to_string()))
}

/// Parse Open-Meteo's local ISO time ("2025-03-01T06:45") as IST.
fn parse_local_time(provider: &str, raw: &str) -> Result<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map_err(|e| AqimapError::malformed(provider, format!("bad timestamp '{raw}': {e}")))?;
    chrono_tz::Asia::Kolkata
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| AqimapError::malformed(provider, format!("ambiguous timestamp '{raw}'")))
}
