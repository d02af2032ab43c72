//! Free-text location input

use crate::{AqimapError, Result};
use serde::{Deserialize, Serialize};

/// Shortest place name sent to the geocoder
pub const MIN_NAME_LEN: usize = 3;

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationQuery {
    Name(String),
    Coordinates(f64, f64),
}

impl LocationQuery {
    /// Parse user input as either `lat,lon` / `lat lon` or a place name.
    ///
    /// Coordinates are not range-checked here; the India bounding box does
    /// that downstream so the error kind is `OutOfBounds`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AqimapError::invalid_input("location is empty"));
        }

        if let Some((lat, lon)) = Self::parse_coordinates(input) {
            return Ok(LocationQuery::Coordinates(lat, lon));
        }

        Ok(LocationQuery::Name(input.to_string()))
    }

    /// Query from a map click or explicit coordinate fields
    #[must_use]
    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        LocationQuery::Coordinates(latitude, longitude)
    }

    /// Parse coordinates from string like "28.6139,77.2090" or "28.6139 77.2090"
    fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        match parts.as_slice() {
            [lat, lon] => {
                let lat = lat.parse::<f64>().ok()?;
                let lon = lon.parse::<f64>().ok()?;
                (lat.is_finite() && lon.is_finite()).then_some((lat, lon))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Name(name) => write!(f, "{name}"),
            LocationQuery::Coordinates(lat, lon) => write!(f, "{lat:.4}, {lon:.4}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(
            LocationQuery::parse("28.6139,77.2090").unwrap(),
            LocationQuery::Coordinates(28.6139, 77.2090)
        );
        assert_eq!(
            LocationQuery::parse(" 19.07 72.87 ").unwrap(),
            LocationQuery::Coordinates(19.07, 72.87)
        );
        assert_eq!(
            LocationQuery::parse("-46.8182, -8.2275").unwrap(),
            LocationQuery::Coordinates(-46.8182, -8.2275)
        );
    }

    #[test]
    fn test_out_of_range_coordinates_still_parse() {
        assert_eq!(
            LocationQuery::parse("40.0,77.0").unwrap(),
            LocationQuery::Coordinates(40.0, 77.0)
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(
            LocationQuery::parse("New Delhi").unwrap(),
            LocationQuery::Name("New Delhi".into())
        );
        assert!(matches!(
            LocationQuery::parse("28.6").unwrap(),
            LocationQuery::Name(_)
        ));
        assert!(matches!(
            LocationQuery::parse("1,2,3").unwrap(),
            LocationQuery::Name(_)
        ));
        assert!(matches!(
            LocationQuery::parse("inf,77").unwrap(),
            LocationQuery::Name(_)
        ));
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let err = LocationQuery::parse("   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
