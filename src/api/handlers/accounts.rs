//! Account endpoints: own profile, active sessions, administrative
//! kick and failed-attempt reset.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::handlers::MessageResponse;
use crate::api::routes::ApiState;
use crate::auth::account::Principal;
use crate::auth::models::AuthContext;
use crate::domain::AccountId;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KickBody {
    /// Email of the principal whose session is forcibly ended
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetAttemptsBody {
    /// Account whose failed-attempt counter is zeroed
    #[validate(length(min = 1))]
    pub account_id: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/me",
    responses(
        (status = 200, description = "Caller's account", body = Principal),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearerAuth" = [])),
    tag = "accounts"
)]
pub async fn profile(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<Principal>, ApiError> {
    let principal = state.auth_service.profile(&context).await?;
    Ok(Json(principal))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/active",
    responses(
        (status = 200, description = "Accounts with a valid session", body = [Principal]),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearerAuth" = [])),
    tag = "accounts"
)]
pub async fn active_accounts(
    State(state): State<ApiState>,
) -> Result<Json<Vec<Principal>>, ApiError> {
    let principals = state.auth_service.active_accounts().await?;
    Ok(Json(principals))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/kick",
    request_body = KickBody,
    responses(
        (status = 200, description = "Session revoked", body = MessageResponse),
        (status = 404, description = "No such account"),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearerAuth" = [])),
    tag = "accounts"
)]
pub async fn kick(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(body): Json<KickBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    body.validate().map_err(|err| ApiError::bad_request(err.to_string()))?;
    state.auth_service.kick(&body.email, &context).await?;
    Ok(Json(MessageResponse::new(format!("Session revoked for {}", body.email))))
}

#[utoipa::path(
    post,
    path = "/api/v1/accounts/reset-attempts",
    request_body = ResetAttemptsBody,
    responses(
        (status = 200, description = "Counter reset", body = MessageResponse),
        (status = 404, description = "No such account"),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearerAuth" = [])),
    tag = "accounts"
)]
pub async fn reset_attempts(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(body): Json<ResetAttemptsBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    body.validate().map_err(|err| ApiError::bad_request(err.to_string()))?;
    let target = AccountId::from_string(body.account_id);
    state.auth_service.reset_failed_attempts(&target, &context).await?;
    Ok(Json(MessageResponse::new("Failed attempts reset")))
}
