//! Multi-model daily climate summary from the Open-Meteo climate API
//!
//! With several models requested, each daily column is named
//! `{variable}_{model}`, e.g. `temperature_2m_max_MRI_AGCM3_2_S`.

use super::{Fetcher, coordinate_params, decode};
use crate::client::{ApiClient, QueryParams};
use crate::models::{ClimateRecord, DailyMetrics, Location};
use crate::{AqimapError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "climate";

/// High resolution CMIP6 models queried for every location
pub const MODELS: [&str; 7] = [
    "CMCC_CM2_VHR4",
    "FGOALS_f3_H",
    "HiRAM_SIT_HR",
    "MRI_AGCM3_2_S",
    "EC_Earth3P_HR",
    "MPI_ESM1_2_XR",
    "NICAM16_8S",
];

/// Daily variables with their display labels
pub const DAILY_VARIABLES: [(&str, &str); 19] = [
    ("temperature_2m_max", "Temp Max (°C)"),
    ("temperature_2m_mean", "Temp Mean (°C)"),
    ("temperature_2m_min", "Temp Min (°C)"),
    ("wind_speed_10m_mean", "Wind 10m Mean (m/s)"),
    ("wind_speed_10m_max", "Wind 10m Max (m/s)"),
    ("cloud_cover_mean", "Cloud Cover Mean (%)"),
    ("shortwave_radiation_sum", "Shortwave Rad. Sum (MJ/m²)"),
    ("relative_humidity_2m_mean", "RH Mean (%)"),
    ("relative_humidity_2m_max", "RH Max (%)"),
    ("relative_humidity_2m_min", "RH Min (%)"),
    ("dew_point_2m_mean", "Dew Point Mean (°C)"),
    ("dew_point_2m_min", "Dew Point Min (°C)"),
    ("dew_point_2m_max", "Dew Point Max (°C)"),
    ("precipitation_sum", "Precipitation Sum (mm)"),
    ("rain_sum", "Rain Sum (mm)"),
    ("snowfall_sum", "Snowfall Sum (mm)"),
    ("pressure_msl_mean", "Pressure MSL Mean (hPa)"),
    ("soil_moisture_0_to_10cm_mean", "Soil Moisture 0-10cm Mean (m³/m³)"),
    ("et0_fao_evapotranspiration_sum", "ET₀ FAO Evapotransp. (mm)"),
];

/// Legend entry for one daily variable
#[derive(Debug, Clone, Serialize)]
pub struct ClimateVariable {
    pub name: &'static str,
    pub label: &'static str,
}

/// Daily variables in request order, with their display labels
#[must_use]
pub fn variables() -> Vec<ClimateVariable> {
    DAILY_VARIABLES
        .iter()
        .map(|&(name, label)| ClimateVariable { name, label })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ClimateResponse {
    daily: Map<String, Value>,
}

/// First value of a daily column; nulls and non-numbers become `None`.
fn first_value(column: &Value) -> Option<Option<f64>> {
    column.as_array().map(|values| values.first().and_then(Value::as_f64))
}

/// Turn a climate payload into a [`ClimateRecord`].
pub fn normalize(payload: Value) -> Result<ClimateRecord> {
    let response: ClimateResponse = decode(PROVIDER, payload)?;
    let daily = response.daily;

    let raw_date = daily
        .get("time")
        .and_then(Value::as_array)
        .and_then(|times| times.first())
        .and_then(Value::as_str)
        .ok_or_else(|| AqimapError::malformed(PROVIDER, "daily.time is missing or empty"))?;
    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
        .map_err(|e| AqimapError::malformed(PROVIDER, format!("bad date '{raw_date}': {e}")))?;

    let mut daily_summary: BTreeMap<String, DailyMetrics> = BTreeMap::new();
    for model in MODELS {
        let metrics: DailyMetrics = DAILY_VARIABLES
            .iter()
            .filter_map(|(variable, _)| {
                let column = daily.get(&format!("{variable}_{model}"))?;
                first_value(column).map(|value| ((*variable).to_string(), value))
            })
            .collect();

        if metrics.is_empty() {
            warn!("Climate model {} returned no columns", model);
        } else {
            daily_summary.insert(model.to_string(), metrics);
        }
    }

    if daily_summary.is_empty() {
        return Err(AqimapError::malformed(
            PROVIDER,
            "no recognized model columns in daily data",
        ));
    }

    Ok(ClimateRecord {
        date,
        daily_summary,
    })
}

pub struct ClimateFetcher {
    client: ApiClient,
    url: String,
}

impl ClimateFetcher {
    #[must_use]
    pub fn new(client: ApiClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// The climate API has no timezone parameter; dates are calendar days.
    fn params(location: &Location, date: NaiveDate) -> QueryParams {
        let day = date.format("%Y-%m-%d").to_string();
        let mut params = coordinate_params(location);
        params.push(("start_date", day.clone()));
        params.push(("end_date", day));
        params.extend(MODELS.iter().map(|m| ("models", (*m).to_string())));
        params.extend(DAILY_VARIABLES.iter().map(|(v, _)| ("daily", (*v).to_string())));
        params
    }
}

#[async_trait]
impl Fetcher for ClimateFetcher {
    type Record = ClimateRecord;

    #[instrument(
        name = "fetch_climate",
        skip(self),
        fields(lat = location.latitude, lon = location.longitude)
    )]
    async fn fetch(&self, location: &Location, date: NaiveDate) -> Result<ClimateRecord> {
        let payload = self
            .client
            .fetch(&self.url, &Self::params(location, date))
            .await?;
        let record = normalize(payload)?;
        debug!("Climate summary from {} models", record.daily_summary.len());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_normalize_groups_columns_by_model() {
        let payload = json!({
            "latitude": 28.6,
            "longitude": 77.2,
            "daily_units": { "time": "iso8601" },
            "daily": {
                "time": ["2025-03-01"],
                "temperature_2m_max_MRI_AGCM3_2_S": [31.4],
                "rain_sum_MRI_AGCM3_2_S": [null],
                "temperature_2m_max_NICAM16_8S": [29.9],
                "some_future_variable_NICAM16_8S": [1.0]
            }
        });

        let record = normalize(payload).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(record.daily_summary.len(), 2);
        assert_eq!(record.metric("MRI_AGCM3_2_S", "temperature_2m_max"), Some(31.4));
        assert_eq!(
            record.daily_summary["MRI_AGCM3_2_S"].get("rain_sum"),
            Some(&None)
        );
        assert!(!record.daily_summary["NICAM16_8S"].contains_key("some_future_variable"));
    }

    #[test]
    fn test_missing_time_is_malformed() {
        let payload = json!({ "daily": { "temperature_2m_max_NICAM16_8S": [29.9] } });
        assert_eq!(
            normalize(payload).unwrap_err().kind(),
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn test_no_model_columns_is_malformed() {
        let payload = json!({ "daily": { "time": ["2025-03-01"] } });
        assert_eq!(
            normalize(payload).unwrap_err().kind(),
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn test_variable_legend() {
        let legend = variables();
        assert_eq!(legend.len(), 19);
        assert_eq!(legend[0].name, "temperature_2m_max");
        let rain = legend.iter().find(|v| v.name == "rain_sum").unwrap();
        assert_eq!(rain.label, "Rain Sum (mm)");
    }

    #[test]
    fn test_params_list_every_model() {
        let location = Location::validated(28.6, 77.2, None).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let params = ClimateFetcher::params(&location, date);
        assert_eq!(params.iter().filter(|(k, _)| *k == "models").count(), 7);
        assert_eq!(params.iter().filter(|(k, _)| *k == "daily").count(), 19);
    }
}
