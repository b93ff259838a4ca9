//! Aggregation of emission records
//!
//! Works on any record collection, whether it came from the live service
//! or from the demo generator.

pub mod aggregator;

pub use aggregator::{
    aggregate_emissions_by_department, calculate_emissions_trend, calculate_emissions_trend_in,
    default_department_mapping, total_emissions, DepartmentMapping, DEFAULT_DEPARTMENT,
};
