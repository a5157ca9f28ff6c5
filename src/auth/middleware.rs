//! Axum middleware for request authentication.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::api::error::ApiError;
use crate::auth::gate::Gate;

pub type GateState = Arc<Gate>;

/// Middleware entry point that authenticates requests using the configured
/// [`Gate`] and injects the resolved [`crate::auth::models::AuthContext`]
/// into request extensions for downstream handlers.
pub async fn authenticate(
    State(gate): State<GateState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header =
        request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()).unwrap_or("");

    match gate.check(header).await {
        Ok(context) => {
            request.extensions_mut().insert(context);
            Ok(next.run(request).await)
        }
        Err(err) => {
            warn!(
                method = %request.method(),
                path = %request.uri().path(),
                error = %err,
                "authentication failed"
            );
            Err(ApiError::from(err))
        }
    }
}
