//! Derived views over a collection of emission records

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported period '{0}'")]
pub struct UnknownPeriod(pub String);

/// Per-department accumulation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DepartmentTotals {
    pub emissions: f64,
    pub energy: f64,
    pub count: u64,
}

/// Totals over a whole listing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmissionTotals {
    pub emissions: f64,
    pub energy: f64,
    pub count: u64,
}

/// One bucket of a trend series, keyed by its period label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub emissions: f64,
    pub energy: f64,
}

/// Bucket width for trend series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    #[default]
    Day,
    /// Weeks start on Sunday
    Week,
    Month,
}

impl TrendPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendPeriod::Day => "day",
            TrendPeriod::Week => "week",
            TrendPeriod::Month => "month",
        }
    }
}

impl FromStr for TrendPeriod {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(TrendPeriod::Day),
            "week" => Ok(TrendPeriod::Week),
            "month" => Ok(TrendPeriod::Month),
            _ => Err(UnknownPeriod(s.to_string())),
        }
    }
}
