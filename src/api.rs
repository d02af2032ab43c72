//! JSON API consumed by the map frontend

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aqi::{self, AqiBand, PollutantInfo};
use crate::dashboard::Dashboard;
use crate::models::{BoundingBox, DisplayRecord, INDIA, INDIA_CENTER};
use crate::open_meteo::climate::{self, ClimateVariable};
use crate::query::LocationQuery;
use crate::{AqimapError, ErrorKind};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    /// Place name or "lat,lon"
    pub q: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl DashboardParams {
    fn into_query(self) -> crate::Result<LocationQuery> {
        match (self.q, self.lat, self.lon) {
            (_, Some(lat), Some(lon)) => Ok(LocationQuery::coordinates(lat, lon)),
            (Some(q), None, None) => LocationQuery::parse(&q),
            (None, None, None) => Err(AqimapError::invalid_input(
                "provide either 'q' or both 'lat' and 'lon'",
            )),
            _ => Err(AqimapError::invalid_input(
                "'lat' and 'lon' must be given together",
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiBounds {
    pub bounds: BoundingBox,
    pub center: ApiCenter,
}

#[derive(Debug, Serialize)]
pub struct ApiCenter {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Error returned from a handler, rendered as `{kind, message}`
pub struct ApiFailure(AqimapError);

impl From<AqimapError> for ApiFailure {
    fn from(err: AqimapError) -> Self {
        Self(err)
    }
}

#[must_use]
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::OutOfBounds => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Network => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Upstream | ErrorKind::MalformedResponse => StatusCode::BAD_GATEWAY,
        ErrorKind::Cache | ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let body = ApiError {
            kind,
            message: self.0.user_message(),
        };
        (status_for(kind), Json(body)).into_response()
    }
}

pub fn router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/aqi-bands", get(get_aqi_bands))
        .route("/pollutants", get(get_pollutants))
        .route("/climate-variables", get(get_climate_variables))
        .route("/bounds", get(get_bounds))
        .with_state(dashboard)
}

async fn get_dashboard(
    State(dashboard): State<Arc<Dashboard>>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DisplayRecord>, ApiFailure> {
    let query = params.into_query()?;
    debug!("Dashboard request for {}", query);
    let record = dashboard.query(query).await?;
    Ok(Json(record))
}

async fn get_aqi_bands() -> Json<Vec<AqiBand>> {
    Json(aqi::bands())
}

async fn get_pollutants() -> Json<Vec<PollutantInfo>> {
    Json(aqi::pollutants())
}

async fn get_climate_variables() -> Json<Vec<ClimateVariable>> {
    Json(climate::variables())
}

async fn get_bounds() -> Json<ApiBounds> {
    let (latitude, longitude) = INDIA_CENTER;
    Json(ApiBounds {
        bounds: INDIA,
        center: ApiCenter {
            latitude,
            longitude,
        },
    })
}
