//! Current air quality from the Open-Meteo air-quality API

use super::{Fetcher, TIMEZONE, coordinate_params, decode};
use crate::aqi::Pollutant;
use crate::client::{ApiClient, QueryParams};
use crate::models::{AirQualityRecord, Location};
use crate::{AqimapError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

const PROVIDER: &str = "air quality";

/// Variables requested in `current`
pub const CURRENT_VARIABLES: [&str; 11] = [
    "pm2_5",
    "pm10",
    "carbon_monoxide",
    "nitrogen_dioxide",
    "sulphur_dioxide",
    "ozone",
    "aerosol_optical_depth",
    "dust",
    "uv_index",
    "uv_index_clear_sky",
    "methane",
];

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: CurrentAirQuality,
}

/// Concentrations in μg/m³, UV index and AOD are dimensionless
#[derive(Debug, Deserialize)]
struct CurrentAirQuality {
    time: Option<String>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
    carbon_monoxide: Option<f64>,
    nitrogen_dioxide: Option<f64>,
    sulphur_dioxide: Option<f64>,
    ozone: Option<f64>,
    aerosol_optical_depth: Option<f64>,
    dust: Option<f64>,
    uv_index: Option<f64>,
    uv_index_clear_sky: Option<f64>,
    methane: Option<f64>,
}

impl CurrentAirQuality {
    /// Concentration in the unit the CPCB breakpoints use
    fn concentration(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            // μg/m³ -> mg/m³
            Pollutant::CarbonMonoxide => self.carbon_monoxide.map(|v| v / 1000.0),
            Pollutant::NitrogenDioxide => self.nitrogen_dioxide,
            Pollutant::SulphurDioxide => self.sulphur_dioxide,
            Pollutant::Ozone => self.ozone,
        }
    }

    fn extras(&self) -> BTreeMap<String, f64> {
        [
            ("aerosol_optical_depth", self.aerosol_optical_depth),
            ("dust", self.dust),
            ("uv_index", self.uv_index),
            ("uv_index_clear_sky", self.uv_index_clear_sky),
            ("methane", self.methane),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
    }
}

/// Turn an air-quality payload into an [`AirQualityRecord`].
pub fn normalize(payload: Value) -> Result<AirQualityRecord> {
    let response: AirQualityResponse = decode(PROVIDER, payload)?;
    let current = response.current;

    let pollutants: BTreeMap<Pollutant, f64> = Pollutant::ALL
        .iter()
        .filter_map(|&p| current.concentration(p).map(|c| (p, c)))
        .collect();

    let observed_at = current
        .time
        .as_deref()
        .and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M").ok());

    AirQualityRecord::from_concentrations(pollutants, current.extras(), observed_at)
        .ok_or_else(|| AqimapError::malformed(PROVIDER, "no pollutant concentrations in 'current'"))
}

pub struct AirQualityFetcher {
    client: ApiClient,
    url: String,
}

impl AirQualityFetcher {
    #[must_use]
    pub fn new(client: ApiClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    fn params(location: &Location) -> QueryParams {
        let mut params = coordinate_params(location);
        params.push(("timezone", TIMEZONE.to_string()));
        params.extend(CURRENT_VARIABLES.iter().map(|v| ("current", (*v).to_string())));
        params
    }
}

#[async_trait]
impl Fetcher for AirQualityFetcher {
    type Record = AirQualityRecord;

    /// Current conditions; the date is not part of the request.
    #[instrument(
        name = "fetch_air_quality",
        skip(self),
        fields(lat = location.latitude, lon = location.longitude)
    )]
    async fn fetch(&self, location: &Location, _date: NaiveDate) -> Result<AirQualityRecord> {
        let payload = self.client.fetch(&self.url, &Self::params(location)).await?;
        let record = normalize(payload)?;
        debug!("AQI {} driven by {:?}", record.format_aqi(), record.dominant_pollutant);
        Ok(record)
    }
}
