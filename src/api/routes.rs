//! Router construction and middleware wiring.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::gate::Gate;
use crate::auth::middleware::authenticate;
use crate::auth::service::AuthService;
use crate::storage::repositories::AuditLogRepository;

use super::{
    docs,
    handlers::{accounts, audit, auth, health},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub auth_service: Arc<AuthService>,
    pub gate: Arc<Gate>,
    pub audit_log: Arc<AuditLogRepository>,
}

/// Build the application router: a public surface (login, health, OpenAPI)
/// plus the protected subtree wrapped by the authentication gate.
pub fn build_router(state: ApiState) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.gate.clone(), authenticate);

    let protected = Router::new()
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/change-password", post(auth::change_password))
        .route("/api/v1/accounts/me", get(accounts::profile))
        .route("/api/v1/accounts/active", get(accounts::active_accounts))
        .route("/api/v1/accounts/kick", post(accounts::kick))
        .route("/api/v1/accounts/reset-attempts", post(accounts::reset_attempts))
        .route("/api/v1/audit", get(audit::list_audit))
        .route_layer(auth_layer);

    Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .route("/api/v1/auth/login", post(auth::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
