//! Place-name resolution through the Open-Meteo geocoding API
//!
//! Only Indian results are considered, and the chosen candidate must fall
//! inside the India bounding box.

use crate::client::{ApiClient, QueryParams};
use crate::models::Location;
use crate::query::MIN_NAME_LEN;
use crate::{AqimapError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument};

const PROVIDER: &str = "geocoding";
const COUNTRY_CODE: &str = "IN";
const CANDIDATES: u8 = 5;

/// Turns a place name into a validated [`Location`]
#[async_trait]
pub trait Geocode: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Location>;
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country_code: Option<String>,
    admin1: Option<String>,
    admin2: Option<String>,
    admin3: Option<String>,
    admin4: Option<String>,
}

impl GeocodingResult {
    fn is_indian(&self) -> bool {
        self.country_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(COUNTRY_CODE))
    }

    fn admin(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.admin1, &self.admin2, &self.admin3, &self.admin4]
            .into_iter()
            .filter_map(|a| a.as_deref())
            .filter(|a| !a.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }

    fn into_location(self) -> Result<Location> {
        let name = format!("{} ({:.4}, {:.4})", self.name, self.latitude, self.longitude);
        let admin = self.admin();
        Ok(Location::validated(self.latitude, self.longitude, Some(name))?.with_admin(admin))
    }
}

pub struct Geocoder {
    client: ApiClient,
    url: String,
}

impl Geocoder {
    #[must_use]
    pub fn new(client: ApiClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    fn params(name: &str) -> QueryParams {
        vec![
            ("name", name.to_string()),
            ("count", CANDIDATES.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
            ("countryCode", COUNTRY_CODE.to_string()),
        ]
    }
}

#[async_trait]
impl Geocode for Geocoder {
    #[instrument(name = "geocode", skip(self))]
    async fn resolve(&self, name: &str) -> Result<Location> {
        let name = name.trim();
        if name.chars().count() < MIN_NAME_LEN {
            return Err(AqimapError::invalid_input(format!(
                "location name must be at least {MIN_NAME_LEN} characters"
            )));
        }

        let payload = self.client.fetch(&self.url, &Self::params(name)).await?;
        let response: GeocodingResponse = serde_json::from_value(payload)
            .map_err(|e| AqimapError::malformed(PROVIDER, e.to_string()))?;

        let candidates = response.results.unwrap_or_default();
        debug!("{} geocoding candidates for '{}'", candidates.len(), name);

        let best = candidates
            .into_iter()
            .find(GeocodingResult::is_indian)
            .ok_or_else(|| AqimapError::not_found(name))?;

        let location = best.into_location()?;
        info!("Resolved '{}' to {}", name, location.display_name());
        Ok(location)
    }
}
