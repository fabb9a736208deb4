//! Configuration module
//!
//! Explicit configuration for the scanning pipeline and the security API.
//! Everything is resolved once from the environment at startup and passed
//! by value to the components that need it; business logic never reads
//! ambient process state.

use std::env;

const DEFAULT_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SCAN_FETCH_TIMEOUT_SECS: u64 = 30;

/// Key prefix under which user-uploaded media lives in the media bucket.
/// Keys look like `media/{user_id}/{filename}`.
pub const MEDIA_KEY_PREFIX: &str = "media/";

/// Scanner-specific settings, consumed by the orchestrator and the
/// metrics aggregator.
#[derive(Clone, Debug)]
pub struct ScannerSettings {
    /// Bucket that receives user uploads. Notifications for any other
    /// bucket are ignored.
    pub media_bucket: String,
    /// Per-item timeout applied to each notification while scanning a batch.
    pub fetch_timeout_secs: u64,
}

/// Application configuration shared by the API server and the scan worker.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    // Object storage
    pub media_bucket: String,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub s3_endpoint: Option<String>,
    // Scan worker
    pub scan_queue_url: Option<String>,
    pub scan_fetch_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            media_bucket: env::var("MEDIA_BUCKET")
                .map_err(|_| anyhow::anyhow!("MEDIA_BUCKET must be set"))?,
            s3_region: env::var("S3_REGION").ok().or(env::var("AWS_REGION").ok()),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            scan_queue_url: env::var("SCAN_QUEUE_URL").ok(),
            scan_fetch_timeout_secs: env::var("SCAN_FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| SCAN_FETCH_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(SCAN_FETCH_TIMEOUT_SECS),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Scanner settings derived from this configuration.
    pub fn scanner_settings(&self) -> ScannerSettings {
        ScannerSettings {
            media_bucket: self.media_bucket.clone(),
            fetch_timeout_secs: self.scan_fetch_timeout_secs,
        }
    }
}
