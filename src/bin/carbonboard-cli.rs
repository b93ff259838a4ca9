use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use carbonboard::analytics::{
    aggregate_emissions_by_department, calculate_emissions_trend, total_emissions,
};
use carbonboard::client::{EmissionsSource, FallbackClient, RemoteClient, DEFAULT_LATEST_LIMIT};
use carbonboard::config::Config;
use carbonboard::models::{SummaryPeriod, TrendPeriod};

#[derive(Parser)]
#[command(name = "carbonboard-cli")]
#[command(about = "Query emissions data from the command line", long_about = None)]
struct Cli {
    /// Serve demo data even if CODECARBON_API_KEY is set
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Aggregate {
    Department,
    Trend,
    Totals,
}

#[derive(Subcommand)]
enum Commands {
    /// List all projects
    Projects,
    /// Show a single project
    Project { project_id: String },
    /// List a project's emissions, optionally aggregated
    Emissions {
        project_id: String,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, value_enum)]
        aggregate: Option<Aggregate>,
        /// Trend bucket width (day, week, month)
        #[arg(long, default_value = "day")]
        period: TrendPeriod,
    },
    /// Most recent emissions first
    Latest {
        project_id: String,
        #[arg(long, default_value_t = DEFAULT_LATEST_LIMIT)]
        limit: u32,
    },
    /// List a project's runs
    Runs { project_id: String },
    /// Server-side summary (hour, day, week, month)
    Summary {
        project_id: String,
        #[arg(long, default_value = "day")]
        period: SummaryPeriod,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    config.upstream.prefer_mock |= cli.demo;
    // Nobody is waiting on a spinner here
    config.upstream.mock_latency = false;

    let http = RemoteClient::build_http_client(std::time::Duration::from_secs(
        config.upstream.timeout_secs,
    ))?;
    let api = FallbackClient::connect(http, &config.upstream)?;

    match cli.command {
        Commands::Projects => print_json(&api.list_projects().await?)?,
        Commands::Project { project_id } => print_json(&api.get_project(&project_id).await?)?,
        Commands::Emissions {
            project_id,
            start_date,
            end_date,
            limit,
            aggregate,
            period,
        } => {
            let records = api
                .get_project_emissions(
                    &project_id,
                    start_date.as_deref(),
                    end_date.as_deref(),
                    limit,
                )
                .await?;

            match aggregate {
                None => print_json(&records)?,
                Some(Aggregate::Department) => print_json(&aggregate_emissions_by_department(
                    &records,
                    &config.department_mapping,
                ))?,
                Some(Aggregate::Trend) => {
                    print_json(&calculate_emissions_trend(&records, period))?
                }
                Some(Aggregate::Totals) => print_json(&total_emissions(&records))?,
            }
        }
        Commands::Latest { project_id, limit } => {
            print_json(&api.get_latest_emissions(&project_id, limit).await?)?
        }
        Commands::Runs { project_id } => print_json(&api.get_runs(&project_id).await?)?,
        Commands::Summary {
            project_id,
            period,
            start_date,
            end_date,
        } => print_json(
            &api.get_emissions_summary(
                &project_id,
                period,
                start_date.as_deref(),
                end_date.as_deref(),
            )
            .await?,
        )?,
    }

    if api.is_mock_mode() {
        eprintln!("⚠ Demo data - configure CODECARBON_API_KEY for real tracking");
    }

    Ok(())
}
