//! HTTP handlers.

pub mod accounts;
pub mod audit;
pub mod auth;
pub mod health;

use serde::Serialize;
use utoipa::ToSchema;

/// Simple message envelope for operations with no richer payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}
