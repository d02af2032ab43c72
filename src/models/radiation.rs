//! Satellite radiation record

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One hourly terrestrial radiation value in W/m²
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiationSample {
    pub timestamp: DateTime<FixedOffset>,
    /// `None` where the satellite product has a gap
    pub value: Option<f64>,
}

/// Sun times and hourly radiation for one day, in IST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiationRecord {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
    /// Sorted by timestamp
    pub hourly_terrestrial_radiation: Vec<RadiationSample>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist(hour: u32) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(&format!("2025-03-01T{hour:02}:00:00+05:30")).unwrap()
    }

    #[test]
    fn test_serializes_ist_offsets_and_gaps() {
        let record = RadiationRecord {
            sunrise: ist(6),
            sunset: ist(18),
            hourly_terrestrial_radiation: vec![
                RadiationSample {
                    timestamp: ist(12),
                    value: Some(990.5),
                },
                RadiationSample {
                    timestamp: ist(13),
                    value: None,
                },
            ],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sunrise"], "2025-03-01T06:00:00+05:30");
        assert_eq!(json["hourly_terrestrial_radiation"][0]["value"], 990.5);
        assert!(json["hourly_terrestrial_radiation"][1]["value"].is_null());
    }
}
