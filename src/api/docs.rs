//! OpenAPI document for the HTTP surface.

use axum::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::change_password,
        crate::api::handlers::accounts::profile,
        crate::api::handlers::accounts::active_accounts,
        crate::api::handlers::accounts::kick,
        crate::api::handlers::accounts::reset_attempts,
        crate::api::handlers::audit::list_audit,
        crate::api::handlers::health::health,
    ),
    components(schemas(
        crate::auth::service::LoginRequest,
        crate::auth::service::LoginOutcome,
        crate::auth::account::Principal,
        crate::api::handlers::auth::ChangePasswordBody,
        crate::api::handlers::accounts::KickBody,
        crate::api::handlers::accounts::ResetAttemptsBody,
        crate::api::handlers::MessageResponse,
        crate::api::handlers::health::HealthResponse,
        crate::storage::repositories::audit_log::AuditAction,
        crate::storage::repositories::audit_log::AuditEntry,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login, logout, and credential rotation"),
        (name = "accounts", description = "Principal profile and session administration"),
        (name = "audit", description = "Append-only audit trail"),
        (name = "health", description = "Liveness")
    ),
    info(
        title = "Gatehouse API",
        description = "Credential verification and session validity service"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build(),
            ),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
