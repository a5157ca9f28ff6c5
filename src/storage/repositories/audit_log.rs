//! Audit log repository: append-only record of security-relevant events.
//!
//! Writes are treated as fire-and-forget by callers — a failed append is
//! logged operationally and never changes the outcome of the primary
//! operation. Entries are never mutated or deleted.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use tracing::instrument;
use utoipa::ToSchema;

use crate::domain::AccountId;
use crate::errors::Result;
use crate::storage::repositories::account::DEFAULT_STORE_DEADLINE;
use crate::storage::{guarded, DbPool};

/// Action tag attached to every audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    LoginFailed,
    Logout,
    ChangePassword,
    KickUser,
    ResetFailedAttempts,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::LoginFailed => "LOGIN_FAILED",
            AuditAction::Logout => "LOGOUT",
            AuditAction::ChangePassword => "CHANGE_PASSWORD",
            AuditAction::KickUser => "KICK_USER",
            AuditAction::ResetFailedAttempts => "RESET_FAILED_ATTEMPTS",
        }
    }
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = AuditActionParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "LOGIN" => Ok(AuditAction::Login),
            "LOGIN_FAILED" => Ok(AuditAction::LoginFailed),
            "LOGOUT" => Ok(AuditAction::Logout),
            "CHANGE_PASSWORD" => Ok(AuditAction::ChangePassword),
            "KICK_USER" => Ok(AuditAction::KickUser),
            "RESET_FAILED_ATTEMPTS" => Ok(AuditAction::ResetFailedAttempts),
            other => Err(AuditActionParseError(other.to_string())),
        }
    }
}

/// Error returned when audit action parsing fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid audit action: {0}")]
pub struct AuditActionParseError(pub String);

/// Immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: i64,
    pub account_id: AccountId,
    pub action: AuditAction,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct AuditRow {
    id: i64,
    account_id: String,
    action: String,
    detail: String,
    created_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_entry(self) -> Result<AuditEntry> {
        let action = self
            .action
            .parse::<AuditAction>()
            .map_err(|err| crate::errors::Error::validation(err.to_string()))?;
        Ok(AuditEntry {
            id: self.id,
            account_id: AccountId::from_string(self.account_id),
            action,
            detail: self.detail,
            created_at: self.created_at,
        })
    }
}

/// Repository for the append-only audit log.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: DbPool,
    deadline: Duration,
}

impl AuditLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool, deadline: DEFAULT_STORE_DEADLINE }
    }

    pub fn with_deadline(pool: DbPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    /// Append an entry keyed by the acting principal.
    #[instrument(skip(self, detail), fields(account_id = %account_id, action = %action), name = "db_append_audit")]
    pub async fn append(
        &self,
        account_id: &AccountId,
        action: AuditAction,
        detail: &str,
    ) -> Result<()> {
        guarded("append_audit", self.deadline, || {
            sqlx::query(
                "INSERT INTO audit_log (account_id, action, detail, created_at) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(account_id.as_str())
            .bind(action.as_str())
            .bind(detail)
            .bind(Utc::now())
            .execute(&self.pool)
        })
        .await?;
        Ok(())
    }

    /// Recent entries for one principal, newest first.
    #[instrument(skip(self), fields(account_id = %account_id), name = "db_list_audit_for_account")]
    pub async fn list_for_account(
        &self,
        account_id: &AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditEntry>> {
        let rows = guarded("list_audit_for_account", self.deadline, || {
            sqlx::query_as::<_, AuditRow>(
                "SELECT id, account_id, action, detail, created_at FROM audit_log \
                 WHERE account_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            )
            .bind(account_id.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
        })
        .await?;
        rows.into_iter().map(AuditRow::into_entry).collect()
    }

    /// Recent entries across all principals, newest first.
    #[instrument(skip(self), name = "db_list_audit_recent")]
    pub async fn list_recent(&self, limit: i64, offset: i64) -> Result<Vec<AuditEntry>> {
        let rows = guarded("list_audit_recent", self.deadline, || {
            sqlx::query_as::<_, AuditRow>(
                "SELECT id, account_id, action, detail, created_at FROM audit_log \
                 ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
        })
        .await?;
        rows.into_iter().map(AuditRow::into_entry).collect()
    }
}
