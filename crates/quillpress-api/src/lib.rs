//! QuillPress security API
//!
//! Axum service exposing the admin security dashboard: aggregated metrics
//! and the raw detection listing, both gated on an admin-role JWT.

pub mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
