//! Query orchestration
//!
//! Resolves a [`LocationQuery`] to a location inside India, runs the three
//! fetchers concurrently and composes a [`DisplayRecord`]. Location failures
//! abort the query; fetcher failures only mark their section unavailable.

use crate::cache::{CacheStore, Namespace};
use crate::client::{ApiClient, build_http_client};
use crate::config::AqimapConfig;
use crate::geocoder::{Geocode, Geocoder};
use crate::models::{
    AirQualityRecord, ClimateRecord, DisplayRecord, Location, RadiationRecord, Section,
};
use crate::open_meteo::{AirQualityFetcher, ClimateFetcher, Fetcher, SatelliteFetcher};
use crate::query::LocationQuery;
use crate::Result;
use chrono::{NaiveDate, Utc};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Stages of a single query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Idle,
    Resolving,
    Fetching,
    Composing,
    Done,
    Failed,
}

type AirQualitySource = Box<dyn Fetcher<Record = AirQualityRecord>>;
type RadiationSource = Box<dyn Fetcher<Record = RadiationRecord>>;
type ClimateSource = Box<dyn Fetcher<Record = ClimateRecord>>;

/// Today's date in Indian Standard Time
#[must_use]
pub fn today_in_india() -> NaiveDate {
    Utc::now().with_timezone(&chrono_tz::Asia::Kolkata).date_naive()
}

pub struct Dashboard {
    geocoder: Box<dyn Geocode>,
    air_quality: AirQualitySource,
    radiation: RadiationSource,
    climate: ClimateSource,
}

impl Dashboard {
    pub fn new(
        geocoder: Box<dyn Geocode>,
        air_quality: AirQualitySource,
        radiation: RadiationSource,
        climate: ClimateSource,
    ) -> Self {
        Self {
            geocoder,
            air_quality,
            radiation,
            climate,
        }
    }

    /// Wire the Open-Meteo sources from configuration.
    ///
    /// Satellite and climate responses are cached in `store`; geocoding and
    /// current air quality always go upstream.
    pub fn from_config(config: &AqimapConfig, store: &CacheStore) -> Result<Self> {
        let http = build_http_client(&config.http)?;
        let ttl = config.cache.ttl();
        let endpoints = &config.endpoints;

        let uncached = ApiClient::uncached(http.clone());
        let satellite = ApiClient::cached(http.clone(), store.namespace(Namespace::Satellite, ttl));
        let climate = ApiClient::cached(http, store.namespace(Namespace::Climate, ttl));

        Ok(Self::new(
            Box::new(Geocoder::new(uncached.clone(), &endpoints.geocoding_url)),
            Box::new(AirQualityFetcher::new(uncached, &endpoints.air_quality_url)),
            Box::new(SatelliteFetcher::new(satellite, &endpoints.satellite_url)),
            Box::new(ClimateFetcher::new(climate, &endpoints.climate_url)),
        ))
    }

    /// Run a query for today's date in India.
    pub async fn query(&self, query: LocationQuery) -> Result<DisplayRecord> {
        self.query_on(query, today_in_india()).await
    }

    #[instrument(name = "dashboard_query", skip(self, query), fields(query = %query))]
    pub async fn query_on(&self, query: LocationQuery, date: NaiveDate) -> Result<DisplayRecord> {
        let start = Instant::now();
        let mut phase = QueryPhase::Idle;

        advance(&mut phase, QueryPhase::Resolving);
        let location = match self.resolve(query).await {
            Ok(location) => location,
            Err(e) => {
                warn!("Query aborted: {}", e);
                advance(&mut phase, QueryPhase::Failed);
                return Err(e);
            }
        };

        advance(&mut phase, QueryPhase::Fetching);
        let (air_quality, radiation, climate) = tokio::join!(
            self.air_quality.fetch(&location, date),
            self.radiation.fetch(&location, date),
            self.climate.fetch(&location, date),
        );

        advance(&mut phase, QueryPhase::Composing);
        let record = DisplayRecord {
            location,
            query_date: date,
            air_quality: Section::from(air_quality),
            radiation: Section::from(radiation),
            climate: Section::from(climate),
            retrieved_at: Utc::now(),
        };

        let missing = record.unavailable_sections();
        if !missing.is_empty() {
            warn!("Sections unavailable: {}", missing.join(", "));
        }

        advance(&mut phase, QueryPhase::Done);
        info!(
            "Dashboard for {} composed in {:.3}s",
            record.location.display_name(),
            start.elapsed().as_secs_f64()
        );
        Ok(record)
    }

    async fn resolve(&self, query: LocationQuery) -> Result<Location> {
        match query {
            LocationQuery::Name(name) => self.geocoder.resolve(&name).await,
            LocationQuery::Coordinates(lat, lon) => Location::validated(lat, lon, None),
        }
    }
}

fn advance(phase: &mut QueryPhase, next: QueryPhase) {
    debug!("Query phase {:?} -> {:?}", phase, next);
    *phase = next;
}
