//! Caller authorization
//!
//! The platform's identity layer issues the JWT; this surface only verifies
//! it and gates on the admin role. Missing or invalid token is 401, a valid
//! non-admin token is 403.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use quillpress_core::AppError;
use serde::{Deserialize, Serialize};

use crate::error::HttpAppError;
use crate::state::AppState;

/// JWT claims as issued by the platform's identity layer
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Principal id
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// "admin", "author", or "reader"
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Extractor proving the caller holds an admin-level capability.
#[derive(Debug)]
pub struct AdminUser {
    pub user_id: String,
    pub email: Option<String>,
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?
        .claims;

        if claims.role != "admin" {
            return Err(AppError::Forbidden("Admin access required".to_string()).into());
        }

        Ok(AdminUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
