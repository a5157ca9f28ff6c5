//! Audit trail listing endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::domain::AccountId;
use crate::storage::repositories::AuditEntry;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Clone, Deserialize, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    /// Restrict to entries keyed by this account
    pub account_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/audit",
    params(AuditQuery),
    responses(
        (status = 200, description = "Audit entries, newest first", body = [AuditEntry]),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearerAuth" = [])),
    tag = "audit"
)]
pub async fn list_audit(
    State(state): State<ApiState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let entries = match query.account_id {
        Some(account_id) => {
            let account_id = AccountId::from_string(account_id);
            state.audit_log.list_for_account(&account_id, limit, offset).await?
        }
        None => state.audit_log.list_recent(limit, offset).await?,
    };
    Ok(Json(entries))
}
