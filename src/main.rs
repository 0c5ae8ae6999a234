use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kma_nowcast_service::config::Config;
use kma_nowcast_service::fetcher::NowcastFetcher;
use kma_nowcast_service::grid::GridTable;
use kma_nowcast_service::services::forecast_service::LocationQuery;
use kma_nowcast_service::services::ForecastService;

#[derive(Parser)]
#[command(name = "kma-nowcast-service")]
#[command(about = "Look up the current KMA nowcast for an administrative location", long_about = None)]
struct Cli {
    /// Province (시도), e.g. 서울특별시
    province: String,

    /// District (시군구), e.g. 종로구
    district: Option<String>,

    /// Neighborhood (읍면동), e.g. 청운효자동
    neighborhood: Option<String>,
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,kma_nowcast_service=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    info!("Using weather API at {}", config.weather_api_url);

    // A malformed or missing reference table aborts startup
    let grid = match &config.grid_table_path {
        Some(path) => GridTable::load(Path::new(path))?,
        None => GridTable::bundled()?,
    };
    info!("Grid table loaded with {} records", grid.len());

    let fetcher = NowcastFetcher::new(config.weather_api_url.clone(), config.api_key.clone())?;
    let service = ForecastService::new(Arc::new(grid), fetcher);

    let query = LocationQuery {
        province: cli.province,
        district: cli.district,
        neighborhood: cli.neighborhood,
    };

    match service.resolve(&query).await {
        Ok(snapshot) => println!("{snapshot}"),
        Err(e) => {
            error!("Failed to resolve nowcast: {}", e);
            println!("Error retrieving weather data: {e}");
        }
    }

    Ok(())
}
