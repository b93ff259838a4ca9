//! Emission records as reported by the tracking service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::aggregate::UnknownPeriod;

/// One measured tracking session
///
/// Records are either deserialized from the upstream service or synthesized
/// by the mock generator. They are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub timestamp: DateTime<Utc>,

    /// Session length in seconds
    pub duration: f64,

    /// Emitted mass in kg CO2eq
    pub emissions: f64,

    /// kg CO2eq per hour
    pub emissions_rate: f64,

    /// Average power draw in watts
    pub cpu_power: f64,
    pub gpu_power: f64,
    pub ram_power: f64,

    /// Energy in kWh
    pub cpu_energy: f64,
    pub gpu_energy: f64,
    pub ram_energy: f64,
    pub energy_consumed: f64,

    pub country_name: String,
    pub country_iso_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_region: Option<String>,

    pub os: String,
    pub python_version: String,
    pub codecarbon_version: String,

    pub cpu_count: u32,
    pub cpu_model: String,
    pub gpu_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_model: Option<String>,

    /// Total RAM in GB
    pub ram_total_size: f64,

    pub tracking_mode: String,
    pub on_cloud: bool,

    /// Power usage effectiveness multiplier (>= 1.0)
    pub pue: f64,
}

/// Granularity accepted by the upstream summary endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryPeriod {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

impl SummaryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryPeriod::Hour => "hour",
            SummaryPeriod::Day => "day",
            SummaryPeriod::Week => "week",
            SummaryPeriod::Month => "month",
        }
    }
}

impl FromStr for SummaryPeriod {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hour" => Ok(SummaryPeriod::Hour),
            "day" => Ok(SummaryPeriod::Day),
            "week" => Ok(SummaryPeriod::Week),
            "month" => Ok(SummaryPeriod::Month),
            _ => Err(UnknownPeriod(s.to_string())),
        }
    }
}

/// One period of server-side aggregated emissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryBucket {
    pub period: String,
    pub total_emissions: f64,
    pub total_energy: f64,
    pub avg_emissions_rate: f64,
    pub count: u64,
}
