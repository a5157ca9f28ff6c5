//! Authentication endpoints: login, logout, change password.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::handlers::MessageResponse;
use crate::api::routes::ApiState;
use crate::auth::models::AuthContext;
use crate::auth::service::{LoginOutcome, LoginRequest};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    #[validate(length(min = 1, max = 512))]
    pub old_password: String,
    #[validate(length(min = 1, max = 512))]
    pub new_password: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginOutcome),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials or inactive account"),
        (status = 503, description = "Account store unavailable")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<ApiState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginOutcome>, ApiError> {
    body.validate().map_err(|err| ApiError::bad_request(err.to_string()))?;
    let outcome = state.auth_service.login(&body).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearerAuth" = [])),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.logout(&context).await?;
    Ok(Json(MessageResponse::new("Logout successful")))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/change-password",
    request_body = ChangePasswordBody,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 401, description = "Incorrect old password"),
        (status = 404, description = "Account no longer exists")
    ),
    security(("bearerAuth" = [])),
    tag = "auth"
)]
pub async fn change_password(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(body): Json<ChangePasswordBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    body.validate().map_err(|err| ApiError::bad_request(err.to_string()))?;
    state.auth_service.change_password(&context, &body.old_password, &body.new_password).await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
