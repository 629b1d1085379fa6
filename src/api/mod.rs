//! API handlers for Stockroom REST endpoints
//!
//! Identity and role resolution live in an external collaborator; the
//! gateway forwards the resolved caller as `X-Actor-Id` / `X-Actor-Role`
//! headers, which the [`Actor`] extractor turns into explicit parameters
//! for the lifecycle engine.

pub mod health;
pub mod items;
pub mod openapi;
pub mod requests;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, models::enums::Role, AppState};

/// Caller identity forwarded by the gateway
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: i32,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-actor-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i32>().ok())
            .ok_or_else(|| {
                AppError::InsufficientPrivilege("Missing or invalid X-Actor-Id header".to_string())
            })?;

        let role = parts
            .headers
            .get("x-actor-role")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Role>().ok())
            .ok_or_else(|| {
                AppError::InsufficientPrivilege("Missing or invalid X-Actor-Role header".to_string())
            })?;

        Ok(Actor { id, role })
    }
}
