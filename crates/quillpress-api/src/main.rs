use std::sync::Arc;
use std::time::Duration;

use quillpress_api::state::AppState;
use quillpress_api::{routes, server};
use quillpress_core::Config;
use quillpress_db::PgDetectionRepository;
use quillpress_scan::SecurityMetricsService;
use quillpress_storage::S3ObjectStorage;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await?;
    quillpress_db::MIGRATOR.run(&pool).await?;

    let storage = Arc::new(
        S3ObjectStorage::new(config.s3_region.clone(), config.s3_endpoint.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?,
    );
    let detections = Arc::new(PgDetectionRepository::new(pool));

    let state = Arc::new(AppState {
        metrics: SecurityMetricsService::new(
            storage,
            detections.clone(),
            config.media_bucket.clone(),
        ),
        detections,
        jwt_secret: config.jwt_secret.clone(),
    });

    let router = routes::build_router(state, &config.cors_origins)?;
    server::start_server(&config, router).await?;

    Ok(())
}
