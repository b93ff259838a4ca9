//! Grouping of emission records by department and by time bucket
//!
//! Every function here is a pure fold over the records it is given: no
//! state is kept between calls and the input order never changes the result.
//! Results are keyed by `BTreeMap`, so trend buckets come out ascending by
//! label and department maps serialize in a stable order.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::models::{DepartmentTotals, EmissionRecord, EmissionTotals, TrendPeriod, TrendPoint};

/// Department assigned to hardware that has no mapping entry
pub const DEFAULT_DEPARTMENT: &str = "Engineering";

/// Map from cpu model to owning department
pub type DepartmentMapping = HashMap<String, String>;

/// The hardware table of the demo fleet
pub fn default_department_mapping() -> DepartmentMapping {
    [
        ("Intel i7-10700K", "Engineering"),
        ("AMD Ryzen 7 3700X", "Engineering"),
        ("Apple M1", "Design"),
        ("Intel i5-11400", "Marketing"),
    ]
    .into_iter()
    .map(|(model, department)| (model.to_string(), department.to_string()))
    .collect()
}

/// Sum emissions, energy and record count per department
///
/// Only departments that actually received a record appear in the result.
pub fn aggregate_emissions_by_department(
    records: &[EmissionRecord],
    mapping: &DepartmentMapping,
) -> BTreeMap<String, DepartmentTotals> {
    let mut departments: BTreeMap<String, DepartmentTotals> = BTreeMap::new();

    for record in records {
        let department = mapping
            .get(&record.cpu_model)
            .map(String::as_str)
            .unwrap_or(DEFAULT_DEPARTMENT);

        let totals = departments.entry(department.to_string()).or_default();
        totals.emissions += record.emissions;
        totals.energy += record.energy_consumed;
        totals.count += 1;
    }

    departments
}

/// Trend buckets computed on UTC calendar dates
///
/// Days and Sunday-start weeks are taken from the UTC date of each record,
/// not the host's local date. Use [`calculate_emissions_trend_in`] to bucket
/// on another zone's calendar.
pub fn calculate_emissions_trend(records: &[EmissionRecord], period: TrendPeriod) -> Vec<TrendPoint> {
    calculate_emissions_trend_in(records, period, &Utc)
}

/// Trend buckets computed on calendar dates of `tz`
///
/// Keys are `YYYY-MM-DD` for days, the date of the Sunday opening the week
/// for weeks, and `YYYY-MM` for months.
pub fn calculate_emissions_trend_in<Tz: TimeZone>(
    records: &[EmissionRecord],
    period: TrendPeriod,
    tz: &Tz,
) -> Vec<TrendPoint> {
    let mut grouped: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for record in records {
        let key = bucket_key(&record.timestamp, period, tz);
        let bucket = grouped.entry(key).or_insert((0.0, 0.0));
        bucket.0 += record.emissions;
        bucket.1 += record.energy_consumed;
    }

    grouped
        .into_iter()
        .map(|(date, (emissions, energy))| TrendPoint {
            date,
            emissions,
            energy,
        })
        .collect()
}

fn bucket_key<Tz: TimeZone>(timestamp: &DateTime<Utc>, period: TrendPeriod, tz: &Tz) -> String {
    let date = timestamp.with_timezone(tz).date_naive();

    match period {
        TrendPeriod::Day => iso_date(date),
        TrendPeriod::Week => {
            let back = Days::new(u64::from(date.weekday().num_days_from_sunday()));
            iso_date(date - back)
        }
        TrendPeriod::Month => format!("{:04}-{:02}", date.year(), date.month()),
    }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Headline totals over a listing
pub fn total_emissions(records: &[EmissionRecord]) -> EmissionTotals {
    records
        .iter()
        .fold(EmissionTotals::default(), |mut totals, record| {
            totals.emissions += record.emissions;
            totals.energy += record.energy_consumed;
            totals.count += 1;
            totals
        })
}
