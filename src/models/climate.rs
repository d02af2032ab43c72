//! Multi-model daily climate summary

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Daily metrics of one model, keyed by variable name
pub type DailyMetrics = BTreeMap<String, Option<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateRecord {
    pub date: NaiveDate,
    /// Model name to its daily metrics
    pub daily_summary: BTreeMap<String, DailyMetrics>,
}

impl ClimateRecord {
    #[must_use]
    pub fn metric(&self, model: &str, variable: &str) -> Option<f64> {
        self.daily_summary.get(model)?.get(variable).copied().flatten()
    }
}
