//! Data models for the security pipeline
//!
//! This module contains the data structures shared across the scanning
//! pipeline, organized by domain.

mod detection;
mod notification;
mod security;

// Re-export all models for convenient imports
pub use detection::*;
pub use notification::*;
pub use security::*;
