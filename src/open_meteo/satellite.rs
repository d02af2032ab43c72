//! Sun times and terrestrial radiation from the Open-Meteo satellite archive

use super::{Fetcher, TIMEZONE, coordinate_params, decode, parse_local_time};
use crate::client::{ApiClient, QueryParams};
use crate::models::{Location, RadiationRecord, RadiationSample};
use crate::{AqimapError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

const PROVIDER: &str = "satellite radiation";

#[derive(Debug, Deserialize)]
struct SatelliteResponse {
    daily: SatelliteDaily,
    hourly: SatelliteHourly,
}

#[derive(Debug, Deserialize)]
struct SatelliteDaily {
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SatelliteHourly {
    time: Vec<String>,
    terrestrial_radiation_instant: Vec<Option<f64>>,
}

/// Turn a satellite archive payload into a [`RadiationRecord`].
pub fn normalize(payload: Value) -> Result<RadiationRecord> {
    let response: SatelliteResponse = decode(PROVIDER, payload)?;

    let first = |values: &[String], field: &str| -> Result<String> {
        values
            .first()
            .cloned()
            .ok_or_else(|| AqimapError::malformed(PROVIDER, format!("daily.{field} is empty")))
    };
    let sunrise = parse_local_time(PROVIDER, &first(&response.daily.sunrise, "sunrise")?)?;
    let sunset = parse_local_time(PROVIDER, &first(&response.daily.sunset, "sunset")?)?;

    let hourly = response.hourly;
    if hourly.time.len() != hourly.terrestrial_radiation_instant.len() {
        return Err(AqimapError::malformed(
            PROVIDER,
            format!(
                "hourly.time has {} entries but terrestrial_radiation_instant has {}",
                hourly.time.len(),
                hourly.terrestrial_radiation_instant.len()
            ),
        ));
    }

    let mut samples = hourly
        .time
        .iter()
        .zip(hourly.terrestrial_radiation_instant)
        .map(|(time, value)| {
            Ok(RadiationSample {
                timestamp: parse_local_time(PROVIDER, time)?,
                value,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    samples.sort_by_key(|s| s.timestamp);

    Ok(RadiationRecord {
        sunrise,
        sunset,
        hourly_terrestrial_radiation: samples,
    })
}

pub struct SatelliteFetcher {
    client: ApiClient,
    url: String,
}

impl SatelliteFetcher {
    #[must_use]
    pub fn new(client: ApiClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    fn params(location: &Location, date: NaiveDate) -> QueryParams {
        let day = date.format("%Y-%m-%d").to_string();
        let mut params = coordinate_params(location);
        params.extend([
            ("start_date", day.clone()),
            ("end_date", day),
            ("timezone", TIMEZONE.to_string()),
            ("daily", "sunrise".to_string()),
            ("daily", "sunset".to_string()),
            ("hourly", "terrestrial_radiation_instant".to_string()),
            ("models", "satellite_radiation_seamless".to_string()),
        ]);
        params
    }
}

#[async_trait]
impl Fetcher for SatelliteFetcher {
    type Record = RadiationRecord;

    #[instrument(
        name = "fetch_radiation",
        skip(self),
        fields(lat = location.latitude, lon = location.longitude)
    )]
    async fn fetch(&self, location: &Location, date: NaiveDate) -> Result<RadiationRecord> {
        let payload = self
            .client
            .fetch(&self.url, &Self::params(location, date))
            .await?;
        let record = normalize(payload)?;
        debug!(
            "Sunrise {} sunset {}, {} hourly samples",
            record.sunrise,
            record.sunset,
            record.hourly_terrestrial_radiation.len()
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_normalize_radiation() {
        let payload = json!({
            "latitude": 28.6,
            "longitude": 77.2,
            "utc_offset_seconds": 19800,
            "timezone": "Asia/Kolkata",
            "daily": {
                "time": ["2025-03-01"],
                "sunrise": ["2025-03-01T06:45"],
                "sunset": ["2025-03-01T18:25"]
            },
            "hourly": {
                "time": ["2025-03-01T01:00", "2025-03-01T00:00", "2025-03-01T02:00"],
                "terrestrial_radiation_instant": [0.0, 0.0, null]
            }
        });

        let record = normalize(payload).unwrap();
        assert_eq!(record.sunrise.to_rfc3339(), "2025-03-01T06:45:00+05:30");
        assert_eq!(record.sunset.to_rfc3339(), "2025-03-01T18:25:00+05:30");
        assert_eq!(record.hourly_terrestrial_radiation.len(), 3);
        assert_eq!(
            record.hourly_terrestrial_radiation[0].timestamp.to_rfc3339(),
            "2025-03-01T00:00:00+05:30"
        );
        assert_eq!(record.hourly_terrestrial_radiation[2].value, None);
    }

    #[test]
    fn test_length_mismatch_is_malformed() {
        let payload = json!({
            "daily": { "sunrise": ["2025-03-01T06:45"], "sunset": ["2025-03-01T18:25"] },
            "hourly": { "time": ["2025-03-01T00:00"], "terrestrial_radiation_instant": [] }
        });
        assert_eq!(
            normalize(payload).unwrap_err().kind(),
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn test_missing_sunrise_is_malformed() {
        let payload = json!({
            "daily": { "sunrise": [], "sunset": ["2025-03-01T18:25"] },
            "hourly": { "time": [], "terrestrial_radiation_instant": [] }
        });
        let err = normalize(payload).unwrap_err();
        assert!(err.to_string().contains("sunrise"));
    }

    #[test]
    fn test_params_pin_the_day() {
        let location = Location::validated(28.6, 77.2, None).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let params = SatelliteFetcher::params(&location, date);
        assert!(params.contains(&("start_date", "2025-03-01".to_string())));
        assert!(params.contains(&("end_date", "2025-03-01".to_string())));
        assert!(params.contains(&("models", "satellite_radiation_seamless".to_string())));
    }
}
