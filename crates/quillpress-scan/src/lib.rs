//! QuillPress scanning pipeline
//!
//! Everything between an upload notification and a dashboard number:
//! the heuristic threat detector, S3 event parsing, the scan orchestrator
//! (fetch, classify, persist) and the security metrics aggregator.

pub mod detector;
pub mod events;
pub mod metrics;
pub mod orchestrator;

pub use detector::{Detector, HeuristicDetector, ThreatMatch, ThreatSignature};
pub use events::parse_s3_event;
pub use metrics::SecurityMetricsService;
pub use orchestrator::ScanOrchestrator;
