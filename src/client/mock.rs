//! Synthetic data served in demo mode
//!
//! Projects are fixed literals. Emission records, runs and summaries keep a
//! stable shape (which fields are present, which ranges values fall in) but
//! draw their values at random on every call. The `*_with` variants take the
//! random source and clock explicitly.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

use crate::models::{EmissionRecord, Project, Run, SummaryBucket};

pub const MOCK_CPU_MODELS: [&str; 4] = [
    "Intel i7-10700K",
    "AMD Ryzen 7 3700X",
    "Apple M1",
    "Intel i5-11400",
];
pub const MOCK_GPU_MODELS: [&str; 2] = ["NVIDIA RTX 3080", "AMD RX 6800 XT"];
pub const MOCK_OS: [&str; 3] = ["Windows", "macOS", "Linux"];

/// Record count used when a listing asks for no particular limit
pub const DEFAULT_MOCK_EMISSIONS: usize = 50;
/// Upper bound on generated records, whatever limit the caller asked for
pub const MAX_MOCK_EMISSIONS: usize = 1000;
pub const MOCK_RUN_COUNT: usize = 5;
pub const MOCK_SUMMARY_DAYS: i64 = 7;

const GPU_PROBABILITY: f64 = 0.3;
const CLOUD_PROBABILITY: f64 = 0.4;
const PYTHON_VERSION: &str = "3.9.0";
const CODECARBON_VERSION: &str = "2.3.0";
const TRACKING_MODE: &str = "machine";

fn epoch_secs(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(secs)
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, choices: &[&'a str]) -> &'a str {
    choices[rng.random_range(0..choices.len())]
}

/// The three demo projects
pub fn generate_mock_projects() -> Vec<Project> {
    vec![
        Project {
            id: "demo-project-1".to_string(),
            name: "Web Application Development".to_string(),
            description: Some("Main web application development project".to_string()),
            team_id: Some("team-1".to_string()),
            created_at: epoch_secs(1_704_067_200), // 2024-01-01T00:00:00Z
            updated_at: epoch_secs(1_705_320_000), // 2024-01-15T12:00:00Z
        },
        Project {
            id: "demo-project-2".to_string(),
            name: "Machine Learning Pipeline".to_string(),
            description: Some("ML model training and inference".to_string()),
            team_id: Some("team-2".to_string()),
            created_at: epoch_secs(1_704_412_800), // 2024-01-05T00:00:00Z
            updated_at: epoch_secs(1_705_246_200), // 2024-01-14T15:30:00Z
        },
        Project {
            id: "demo-project-3".to_string(),
            name: "Data Processing Jobs".to_string(),
            description: Some("Batch data processing and ETL".to_string()),
            team_id: Some("team-1".to_string()),
            created_at: epoch_secs(1_704_844_800), // 2024-01-10T00:00:00Z
            updated_at: epoch_secs(1_705_396_500), // 2024-01-16T09:15:00Z
        },
    ]
}

/// The demo project with this id, or a generic demo project carrying it
pub fn mock_project(project_id: &str) -> Project {
    let mut projects = generate_mock_projects();
    if let Some(pos) = projects.iter().position(|p| p.id == project_id) {
        return projects.swap_remove(pos);
    }

    Project {
        id: project_id.to_string(),
        name: "Demo Project".to_string(),
        description: Some("Synthetic project served in demo mode".to_string()),
        team_id: None,
        created_at: epoch_secs(1_704_067_200),
        updated_at: epoch_secs(1_704_067_200),
    }
}

pub fn generate_mock_emissions(count: usize) -> Vec<EmissionRecord> {
    generate_mock_emissions_with(&mut rand::rng(), count, Utc::now())
}

/// One record per hour going back from `now`, newest first
///
/// `count` is capped at [`MAX_MOCK_EMISSIONS`].
pub fn generate_mock_emissions_with<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<EmissionRecord> {
    let mut records: Vec<EmissionRecord> = (0..count.min(MAX_MOCK_EMISSIONS))
        .map(|i| {
            let timestamp = now - TimeDelta::hours(i as i64);
            mock_emission(rng, timestamp)
        })
        .collect();

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
}

fn mock_emission<R: Rng + ?Sized>(rng: &mut R, timestamp: DateTime<Utc>) -> EmissionRecord {
    let gpu_model = rng
        .random_bool(GPU_PROBABILITY)
        .then(|| pick(rng, &MOCK_GPU_MODELS).to_string());
    let has_gpu = gpu_model.is_some();
    let on_cloud = rng.random_bool(CLOUD_PROBABILITY);

    EmissionRecord {
        timestamp,
        duration: rng.random_range(1800.0..5400.0),
        emissions: rng.random_range(0.01..0.11),
        emissions_rate: rng.random_range(0.005..0.055),
        cpu_power: rng.random_range(50.0..150.0),
        gpu_power: if has_gpu { rng.random_range(100.0..300.0) } else { 0.0 },
        ram_power: rng.random_range(10.0..30.0),
        cpu_energy: rng.random_range(0.1..0.3),
        gpu_energy: if has_gpu { rng.random_range(0.2..0.6) } else { 0.0 },
        ram_energy: rng.random_range(0.02..0.07),
        energy_consumed: rng.random_range(0.4..1.2),
        country_name: "United States".to_string(),
        country_iso_code: "USA".to_string(),
        region: Some("us-east-1".to_string()),
        longitude: Some(-74.006),
        latitude: Some(40.7128),
        cloud_provider: on_cloud.then(|| "aws".to_string()),
        cloud_region: on_cloud.then(|| "us-east-1".to_string()),
        os: pick(rng, &MOCK_OS).to_string(),
        python_version: PYTHON_VERSION.to_string(),
        codecarbon_version: CODECARBON_VERSION.to_string(),
        cpu_count: rng.random_range(4..12),
        cpu_model: pick(rng, &MOCK_CPU_MODELS).to_string(),
        gpu_count: u32::from(has_gpu),
        gpu_model,
        ram_total_size: f64::from(rng.random_range(16u32..48)),
        tracking_mode: TRACKING_MODE.to_string(),
        on_cloud,
        pue: rng.random_range(1.2..1.5),
    }
}

pub fn generate_mock_runs(project_id: &str) -> Vec<Run> {
    generate_mock_runs_with(&mut rand::rng(), project_id, Utc::now())
}

/// One run per day going back from `now`, newest first
pub fn generate_mock_runs_with<R: Rng + ?Sized>(
    rng: &mut R,
    project_id: &str,
    now: DateTime<Utc>,
) -> Vec<Run> {
    (0..MOCK_RUN_COUNT)
        .map(|i| {
            let gpu_model = rng
                .random_bool(GPU_PROBABILITY)
                .then(|| pick(rng, &MOCK_GPU_MODELS).to_string());
            Run {
                id: format!("{project_id}-run-{}", i + 1),
                timestamp: now - TimeDelta::days(i as i64),
                project_id: project_id.to_string(),
                os: pick(rng, &MOCK_OS).to_string(),
                python_version: PYTHON_VERSION.to_string(),
                codecarbon_version: CODECARBON_VERSION.to_string(),
                cpu_count: rng.random_range(4..12),
                cpu_model: pick(rng, &MOCK_CPU_MODELS).to_string(),
                gpu_count: u32::from(gpu_model.is_some()),
                gpu_model,
                ram_total_size: f64::from(rng.random_range(16u32..48)),
                tracking_mode: TRACKING_MODE.to_string(),
            }
        })
        .collect()
}

pub fn generate_mock_summary() -> Vec<SummaryBucket> {
    generate_mock_summary_with(&mut rand::rng(), Utc::now())
}

/// Daily buckets for the trailing week, oldest first
pub fn generate_mock_summary_with<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<SummaryBucket> {
    (0..MOCK_SUMMARY_DAYS)
        .rev()
        .map(|days_back| {
            let day = now - TimeDelta::days(days_back);
            SummaryBucket {
                period: day.format("%Y-%m-%d").to_string(),
                total_emissions: rng.random_range(0.1..0.6),
                total_energy: rng.random_range(0.5..2.5),
                avg_emissions_rate: rng.random_range(0.01..0.11),
                count: rng.random_range(5..15),
            }
        })
        .collect()
}
