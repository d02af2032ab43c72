//! Air quality record

use crate::aqi::{self, AqiCategory, Pollutant};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current air quality at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityRecord {
    /// CPCB Air Quality Index (0-500)
    pub aqi: u16,
    pub category: AqiCategory,
    /// Pollutant with the highest sub-index
    pub dominant_pollutant: Pollutant,
    /// Concentrations in [`Pollutant::unit`]
    pub pollutants: BTreeMap<Pollutant, f64>,
    pub sub_indices: BTreeMap<Pollutant, f64>,
    /// Non-AQI variables such as dust or UV index
    pub extras: BTreeMap<String, f64>,
    /// Observation time (Asia/Kolkata local)
    pub observed_at: Option<NaiveDateTime>,
}

impl AirQualityRecord {
    /// Build the record from concentrations already in breakpoint units.
    ///
    /// Returns `None` when no pollutant is available.
    #[must_use]
    pub fn from_concentrations(
        pollutants: BTreeMap<Pollutant, f64>,
        extras: BTreeMap<String, f64>,
        observed_at: Option<NaiveDateTime>,
    ) -> Option<Self> {
        let sub_indices: BTreeMap<Pollutant, f64> = pollutants
            .iter()
            .map(|(&pollutant, &value)| (pollutant, pollutant.sub_index(value)))
            .collect();
        let pairs: Vec<(Pollutant, f64)> = sub_indices.iter().map(|(&p, &i)| (p, i)).collect();
        let (aqi, dominant_pollutant) = aqi::overall(&pairs)?;

        Some(Self {
            aqi,
            category: AqiCategory::from_aqi(aqi),
            dominant_pollutant,
            pollutants,
            sub_indices,
            extras,
            observed_at,
        })
    }

    /// Format index with its band label, e.g. "152 (Moderate)"
    #[must_use]
    pub fn format_aqi(&self) -> String {
        format!("{} ({})", self.aqi, self.category.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_concentrations() {
        let pollutants = BTreeMap::from([
            (Pollutant::Pm25, 45.0),
            (Pollutant::Pm10, 180.0),
            (Pollutant::CarbonMonoxide, 0.4),
        ]);
        let record =
            AirQualityRecord::from_concentrations(pollutants, BTreeMap::new(), None).unwrap();

        // PM10 at 180 μg/m³ sits in the 101-200 band
        assert_eq!(record.dominant_pollutant, Pollutant::Pm10);
        assert_eq!(record.aqi, 153);
        assert_eq!(record.category, AqiCategory::Moderate);
        assert_eq!(record.sub_indices.len(), 3);
        assert_eq!(record.format_aqi(), "153 (Moderate)");
    }

    #[test]
    fn test_record_requires_a_pollutant() {
        assert!(AirQualityRecord::from_concentrations(BTreeMap::new(), BTreeMap::new(), None)
            .is_none());
    }

    #[test]
    fn test_pollutant_keys_serialize_as_api_names() {
        let pollutants = BTreeMap::from([(Pollutant::Pm25, 10.0)]);
        let record =
            AirQualityRecord::from_concentrations(pollutants, BTreeMap::new(), None).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["pollutants"]["pm2_5"], 10.0);
        assert_eq!(json["dominant_pollutant"], "pm2_5");
    }
}
