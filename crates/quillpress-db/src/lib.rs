//! QuillPress database layer
//!
//! Repositories for the security pipeline's durable records. The detection
//! store is append-only: the orchestrator inserts, the dashboard reads,
//! nothing updates or deletes.

pub mod detections;

pub use detections::{
    DetectionRepository, InMemoryDetectionRepository, PgDetectionRepository,
};

/// Embedded sqlx migrations for the detection store.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
