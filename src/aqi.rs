//! CPCB (India) Air Quality Index
//!
//! Each pollutant concentration maps to a sub-index by linear interpolation
//! over six breakpoint bands; the AQI is the largest sub-index.

use serde::{Deserialize, Serialize};

/// `(concentration_low, concentration_high, index_low, index_high)`
type Breakpoint = (f64, f64, f64, f64);

/// Pollutants that contribute to the AQI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    #[serde(rename = "pm2_5")]
    Pm25,
    Pm10,
    CarbonMonoxide,
    NitrogenDioxide,
    SulphurDioxide,
    Ozone,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::CarbonMonoxide,
        Pollutant::NitrogenDioxide,
        Pollutant::SulphurDioxide,
        Pollutant::Ozone,
    ];

    /// Variable name used by the air-quality API
    #[must_use]
    pub fn api_name(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::CarbonMonoxide => "carbon_monoxide",
            Pollutant::NitrogenDioxide => "nitrogen_dioxide",
            Pollutant::SulphurDioxide => "sulphur_dioxide",
            Pollutant::Ozone => "ozone",
        }
    }

    /// Unit the breakpoints are expressed in
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Pollutant::CarbonMonoxide => "mg/m³",
            _ => "μg/m³",
        }
    }

    fn breakpoints(self) -> &'static [Breakpoint; 6] {
        match self {
            Pollutant::Pm25 => &[
                (0.0, 30.0, 0.0, 50.0),
                (30.0, 60.0, 51.0, 100.0),
                (60.0, 90.0, 101.0, 200.0),
                (90.0, 120.0, 201.0, 300.0),
                (120.0, 250.0, 301.0, 400.0),
                (250.0, 350.0, 401.0, 500.0),
            ],
            Pollutant::Pm10 => &[
                (0.0, 50.0, 0.0, 50.0),
                (50.0, 100.0, 51.0, 100.0),
                (100.0, 250.0, 101.0, 200.0),
                (250.0, 350.0, 201.0, 300.0),
                (350.0, 430.0, 301.0, 400.0),
                (430.0, 600.0, 401.0, 500.0),
            ],
            Pollutant::CarbonMonoxide => &[
                (0.0, 1.0, 0.0, 50.0),
                (1.0, 2.0, 51.0, 100.0),
                (2.0, 10.0, 101.0, 200.0),
                (10.0, 17.0, 201.0, 300.0),
                (17.0, 34.0, 301.0, 400.0),
                (34.0, 50.0, 401.0, 500.0),
            ],
            Pollutant::NitrogenDioxide => &[
                (0.0, 40.0, 0.0, 50.0),
                (40.0, 80.0, 51.0, 100.0),
                (80.0, 180.0, 101.0, 200.0),
                (180.0, 280.0, 201.0, 300.0),
                (280.0, 400.0, 301.0, 400.0),
                (400.0, 1000.0, 401.0, 500.0),
            ],
            Pollutant::SulphurDioxide => &[
                (0.0, 40.0, 0.0, 50.0),
                (40.0, 80.0, 51.0, 100.0),
                (80.0, 380.0, 101.0, 200.0),
                (380.0, 800.0, 201.0, 300.0),
                (800.0, 1600.0, 301.0, 400.0),
                (1600.0, 2000.0, 401.0, 500.0),
            ],
            Pollutant::Ozone => &[
                (0.0, 50.0, 0.0, 50.0),
                (50.0, 100.0, 51.0, 100.0),
                (100.0, 168.0, 101.0, 200.0),
                (168.0, 208.0, 201.0, 300.0),
                (208.0, 748.0, 301.0, 400.0),
                (748.0, 1000.0, 401.0, 500.0),
            ],
        }
    }

    /// Sub-index for a concentration in [`Pollutant::unit`]
    #[must_use]
    pub fn sub_index(self, concentration: f64) -> f64 {
        let bands = self.breakpoints();
        for &(c_low, c_high, i_low, i_high) in bands {
            if (c_low..=c_high).contains(&concentration) {
                return (i_high - i_low) / (c_high - c_low) * (concentration - c_low) + i_low;
            }
        }
        if concentration < bands[0].0 {
            bands[0].2
        } else {
            bands[5].3
        }
    }
}

/// AQI band with its display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
}

impl AqiCategory {
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Satisfactory,
        AqiCategory::Moderate,
        AqiCategory::Poor,
        AqiCategory::VeryPoor,
        AqiCategory::Severe,
    ];

    #[must_use]
    pub fn from_aqi(aqi: u16) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Satisfactory,
            101..=200 => AqiCategory::Moderate,
            201..=300 => AqiCategory::Poor,
            301..=400 => AqiCategory::VeryPoor,
            _ => AqiCategory::Severe,
        }
    }

    #[must_use]
    pub fn range(self) -> (u16, u16) {
        match self {
            AqiCategory::Good => (0, 50),
            AqiCategory::Satisfactory => (51, 100),
            AqiCategory::Moderate => (101, 200),
            AqiCategory::Poor => (201, 300),
            AqiCategory::VeryPoor => (301, 400),
            AqiCategory::Severe => (401, 500),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Satisfactory => "Satisfactory",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Severe => "Severe",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            AqiCategory::Good => "#009966",
            AqiCategory::Satisfactory => "#ffde33",
            AqiCategory::Moderate => "#ff9933",
            AqiCategory::Poor => "#cc0033",
            AqiCategory::VeryPoor => "#660099",
            AqiCategory::Severe => "#7e0023",
        }
    }
}

/// Legend entry for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct AqiBand {
    pub category: AqiCategory,
    pub low: u16,
    pub high: u16,
    pub label: &'static str,
    pub color: &'static str,
}

#[must_use]
pub fn bands() -> Vec<AqiBand> {
    AqiCategory::ALL
        .iter()
        .map(|&category| {
            let (low, high) = category.range();
            AqiBand {
                category,
                low,
                high,
                label: category.label(),
                color: category.color(),
            }
        })
        .collect()
}

/// Legend entry describing how a pollutant is reported
#[derive(Debug, Clone, Serialize)]
pub struct PollutantInfo {
    pub pollutant: Pollutant,
    pub name: &'static str,
    pub unit: &'static str,
}

#[must_use]
pub fn pollutants() -> Vec<PollutantInfo> {
    Pollutant::ALL
        .iter()
        .map(|&pollutant| PollutantInfo {
            pollutant,
            name: pollutant.api_name(),
            unit: pollutant.unit(),
        })
        .collect()
}

/// Overall index and the pollutant that drives it.
///
/// Returns `None` when no concentration is available.
#[must_use]
pub fn overall(sub_indices: &[(Pollutant, f64)]) -> Option<(u16, Pollutant)> {
    sub_indices
        .iter()
        .copied()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        // Sub-indices are clamped to 0..=500 by the breakpoint tables.
        .map(|(pollutant, index)| (index.clamp(0.0, 500.0) as u16, pollutant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Pollutant::Pm25, 0.0, 0.0)]
    #[case(Pollutant::Pm25, 15.0, 25.0)]
    #[case(Pollutant::Pm25, 30.0, 50.0)]
    #[case(Pollutant::Pm25, 45.0, 75.5)]
    #[case(Pollutant::Pm10, 100.0, 100.0)]
    #[case(Pollutant::CarbonMonoxide, 1.5, 75.5)]
    #[case(Pollutant::Ozone, 400.0, 336.2)]
    fn test_sub_index_interpolates(
        #[case] pollutant: Pollutant,
        #[case] concentration: f64,
        #[case] expected: f64,
    ) {
        let index = pollutant.sub_index(concentration);
        assert!(
            (index - expected).abs() < 0.1,
            "{pollutant:?} at {concentration}: got {index}, expected {expected}"
        );
    }

    #[test]
    fn test_sub_index_out_of_table() {
        assert_eq!(Pollutant::Pm25.sub_index(-1.0), 0.0);
        assert_eq!(Pollutant::Pm25.sub_index(900.0), 500.0);
        assert_eq!(Pollutant::SulphurDioxide.sub_index(5000.0), 500.0);
    }

    #[rstest]
    #[case(0, AqiCategory::Good)]
    #[case(50, AqiCategory::Good)]
    #[case(51, AqiCategory::Satisfactory)]
    #[case(150, AqiCategory::Moderate)]
    #[case(300, AqiCategory::Poor)]
    #[case(301, AqiCategory::VeryPoor)]
    #[case(500, AqiCategory::Severe)]
    fn test_category_from_aqi(#[case] aqi: u16, #[case] expected: AqiCategory) {
        assert_eq!(AqiCategory::from_aqi(aqi), expected);
    }

    #[test]
    fn test_overall_takes_max_and_truncates() {
        let indices = [
            (Pollutant::Pm25, 75.5),
            (Pollutant::Pm10, 180.9),
            (Pollutant::Ozone, 12.0),
        ];
        assert_eq!(overall(&indices), Some((180, Pollutant::Pm10)));
        assert_eq!(overall(&[]), None);
    }

    #[test]
    fn test_pollutant_legend_units() {
        let legend = pollutants();
        assert_eq!(legend.len(), 6);
        let co = legend
            .iter()
            .find(|p| p.pollutant == Pollutant::CarbonMonoxide)
            .unwrap();
        assert_eq!(co.name, "carbon_monoxide");
        assert_eq!(co.unit, "mg/m³");
        assert_eq!(legend[0].unit, "μg/m³");
    }

    #[test]
    fn test_bands_cover_full_scale() {
        let bands = bands();
        assert_eq!(bands.len(), 6);
        assert_eq!(bands[0].low, 0);
        assert_eq!(bands[5].high, 500);
        assert_eq!(bands[4].label, "Very Poor");
    }
}
