use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use carbonboard::api::{self, AppState};
use carbonboard::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("carbonboard=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    let upstream = config.upstream.clone();
    if upstream.api_key.is_none() || upstream.prefer_mock {
        info!("🌱 Serving demo emissions data");
    } else {
        info!(
            "🌍 Emissions service: {} (falls back to demo data on failure)",
            upstream.base_url
        );
    }
    info!(
        "🏷️  {} cpu models mapped to departments",
        config.department_mapping.len()
    );

    let state = AppState::new(upstream, config.department_mapping)?;
    let api_router = api::create_api_router(state);

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 API server listening on http://{}", api_addr);
    info!("   - Endpoints available at http://{}/api/codecarbon/...", api_addr);

    axum::serve(listener, api_router).await?;

    Ok(())
}
