//! The per-query aggregate handed to the presentation layer

use super::{AirQualityRecord, ClimateRecord, Location, RadiationRecord};
use crate::{AqimapError, ErrorKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One dashboard section: either its record or why it is missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Available { data: T },
    Unavailable { kind: ErrorKind, message: String },
}

impl<T> Section<T> {
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Section::Available { .. })
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Available { data } => Some(data),
            Section::Unavailable { .. } => None,
        }
    }

    fn from_error(err: &AqimapError) -> Self {
        Section::Unavailable {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

impl<T> From<crate::Result<T>> for Section<T> {
    fn from(result: crate::Result<T>) -> Self {
        match result {
            Ok(data) => Section::Available { data },
            Err(err) => Section::from_error(&err),
        }
    }
}

/// Everything the dashboard shows for one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord {
    pub location: Location,
    /// Date the data refers to, in Asia/Kolkata
    pub query_date: NaiveDate,
    pub air_quality: Section<AirQualityRecord>,
    pub radiation: Section<RadiationRecord>,
    pub climate: Section<ClimateRecord>,
    pub retrieved_at: DateTime<Utc>,
}

impl DisplayRecord {
    /// Sections that failed, by name
    #[must_use]
    pub fn unavailable_sections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.air_quality.is_available() {
            missing.push("air_quality");
        }
        if !self.radiation.is_available() {
            missing.push("radiation");
        }
        if !self.climate.is_available() {
            missing.push("climate");
        }
        missing
    }
}
