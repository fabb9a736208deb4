mod consumer;

use std::sync::Arc;

use quillpress_core::Config;
use quillpress_db::PgDetectionRepository;
use quillpress_scan::{HeuristicDetector, ScanOrchestrator};
use quillpress_storage::S3ObjectStorage;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::consumer::SqsConsumer;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let queue_url = config
        .scan_queue_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("SCAN_QUEUE_URL must be set for the scan worker"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await?;
    quillpress_db::MIGRATOR.run(&pool).await?;

    let storage = S3ObjectStorage::new(config.s3_region.clone(), config.s3_endpoint.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;

    let orchestrator = Arc::new(ScanOrchestrator::new(
        Arc::new(storage),
        Arc::new(PgDetectionRepository::new(pool)),
        Arc::new(HeuristicDetector::new()),
        config.scanner_settings(),
    ));

    let shared_aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let sqs_client = aws_sdk_sqs::Client::new(&shared_aws_config);

    let consumer = SqsConsumer::new(sqs_client, queue_url, orchestrator);
    consumer.run().await;

    Ok(())
}
