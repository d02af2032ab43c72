//! Location model and the India bounding box

use crate::{AqimapError, Result};
use serde::{Deserialize, Serialize};

/// Rectangular latitude/longitude range, inclusive on every edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

/// Queries are constrained to this box: 6-36 N, 68-98 E.
pub const INDIA: BoundingBox = BoundingBox {
    min_latitude: 6.0,
    max_latitude: 36.0,
    min_longitude: 68.0,
    max_longitude: 98.0,
};

/// Initial map center (Nagpur)
pub const INDIA_CENTER: (f64, f64) = (21.146_633, 79.088_860);

impl BoundingBox {
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }

    /// Reject coordinates outside the box, including NaN.
    pub fn check(&self, latitude: f64, longitude: f64) -> Result<()> {
        if self.contains(latitude, longitude) {
            Ok(())
        } else {
            Err(AqimapError::out_of_bounds(latitude, longitude))
        }
    }
}

/// A validated location inside India, only built through [`Location::validated`]
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Location {
    /// Display name, absent for typed coordinates
    pub name: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Administrative regions, e.g. "Delhi, New Delhi"
    pub admin: Option<String>,
}

impl Location {
    /// Build a location, failing with `OutOfBounds` outside [`INDIA`]
    pub fn validated(latitude: f64, longitude: f64, name: Option<String>) -> Result<Self> {
        INDIA.check(latitude, longitude)?;
        Ok(Self {
            name,
            latitude,
            longitude,
            admin: None,
        })
    }

    #[must_use]
    pub fn with_admin(mut self, admin: Option<String>) -> Self {
        self.admin = admin.filter(|a| !a.is_empty());
        self
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Name shown to the user, falling back to the coordinates
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.format_coordinates())
    }
}
