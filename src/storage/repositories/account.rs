//! Account repository: point lookups and conditional single-row updates.
//!
//! Every mutating operation is one conditional statement so concurrent
//! logins, logouts, and kicks against the same account compose through the
//! store's own row atomicity; the repository holds no locks of its own.
//! All calls run under the bounded deadline in [`crate::storage::guarded`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

use crate::auth::account::{Account, NewAccount};
use crate::auth::credential::StoredCredential;
use crate::domain::AccountId;
use crate::errors::{Error, Result};
use crate::storage::{guarded, DbPool};

/// Default per-call store deadline when none is configured.
pub const DEFAULT_STORE_DEADLINE: Duration = Duration::from_secs(5);

const ACCOUNT_COLUMNS: &str = "id, email, name, active, logged_in, session_epoch, \
     failed_attempts, last_login, last_logout, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
struct AccountRow {
    id: String,
    email: String,
    name: String,
    active: bool,
    logged_in: bool,
    session_epoch: i64,
    failed_attempts: i64,
    last_login: Option<DateTime<Utc>>,
    last_logout: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: AccountId::from_string(row.id),
            email: row.email,
            name: row.name,
            active: row.active,
            logged_in: row.logged_in,
            session_epoch: row.session_epoch,
            failed_attempts: row.failed_attempts,
            last_login: row.last_login,
            last_logout: row.last_logout,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct AccountWithCredentialRow {
    #[sqlx(flatten)]
    account: AccountRow,
    credential_kind: String,
    credential: String,
}

/// Persistence operations the auth subsystem needs from the account store.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Provision a new account (out-of-band tooling and tests).
    async fn create(&self, account: NewAccount) -> Result<Account>;

    /// Get an account by ID.
    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>>;

    /// Get an account by its case-sensitive email.
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Get an account together with its stored credential, for verification.
    async fn get_with_credential(&self, email: &str)
        -> Result<Option<(Account, StoredCredential)>>;

    /// Whether the account exists and is administratively enabled.
    async fn is_active(&self, id: &AccountId) -> Result<bool>;

    /// Replace the stored credential encoding.
    async fn update_credential(&self, id: &AccountId, credential: &StoredCredential) -> Result<()>;

    /// Establish a fresh valid session: sets `logged_in`, bumps
    /// `session_epoch`, zeroes `failed_attempts`, stamps `last_login`.
    /// Returns the new epoch.
    async fn mark_authenticated(&self, id: &AccountId) -> Result<i64>;

    /// Increment `failed_attempts` by exactly one; returns the
    /// post-increment count. Touches nothing else.
    async fn increment_failed_attempts(&self, id: &AccountId) -> Result<i64>;

    /// Reset `failed_attempts` to zero.
    async fn reset_failed_attempts(&self, id: &AccountId) -> Result<()>;

    /// Clear the session flag, conditional on the epoch the caller
    /// observed. Returns whether the update applied; `false` means a newer
    /// login superseded the observed session.
    async fn clear_session(&self, id: &AccountId, observed_epoch: i64) -> Result<bool>;

    /// Fresh read of `(logged_in, session_epoch)`.
    async fn session_state(&self, id: &AccountId) -> Result<Option<(bool, i64)>>;

    /// All accounts currently holding a valid session.
    async fn list_logged_in(&self) -> Result<Vec<Account>>;
}

/// SQLx-backed implementation of [`AccountRepository`].
#[derive(Debug, Clone)]
pub struct SqlxAccountRepository {
    pool: DbPool,
    deadline: Duration,
}

impl SqlxAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool, deadline: DEFAULT_STORE_DEADLINE }
    }

    pub fn with_deadline(pool: DbPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    #[instrument(skip(self, account), fields(email = %account.email), name = "db_create_account")]
    async fn create(&self, account: NewAccount) -> Result<Account> {
        let now = Utc::now();
        guarded("create_account", self.deadline, || {
            sqlx::query(
                "INSERT INTO accounts (id, email, name, credential_kind, credential, active, \
                 logged_in, session_epoch, failed_attempts, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, 0, 0, 0, $7, $7)",
            )
            .bind(account.id.as_str())
            .bind(&account.email)
            .bind(&account.name)
            .bind(account.credential.kind())
            .bind(account.credential.secret())
            .bind(account.active)
            .bind(now)
            .execute(&self.pool)
        })
        .await?;

        self.get_by_id(&account.id)
            .await?
            .ok_or_else(|| Error::internal("Account not found after creation"))
    }

    #[instrument(skip(self), fields(account_id = %id), name = "db_get_account")]
    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = guarded("get_by_id", self.deadline, || {
            sqlx::query_as::<_, AccountRow>(&sql).bind(id.as_str()).fetch_optional(&self.pool)
        })
        .await?;
        Ok(row.map(Account::from))
    }

    #[instrument(skip(self, email), name = "db_get_account_by_email")]
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let row = guarded("get_by_email", self.deadline, || {
            sqlx::query_as::<_, AccountRow>(&sql).bind(email).fetch_optional(&self.pool)
        })
        .await?;
        Ok(row.map(Account::from))
    }

    #[instrument(skip(self, email), name = "db_get_account_with_credential")]
    async fn get_with_credential(
        &self,
        email: &str,
    ) -> Result<Option<(Account, StoredCredential)>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS}, credential_kind, credential FROM accounts WHERE email = $1"
        );
        let row = guarded("get_with_credential", self.deadline, || {
            sqlx::query_as::<_, AccountWithCredentialRow>(&sql).bind(email).fetch_optional(&self.pool)
        })
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let credential = StoredCredential::from_parts(&row.credential_kind, row.credential)?;
        Ok(Some((Account::from(row.account), credential)))
    }

    #[instrument(skip(self), fields(account_id = %id), name = "db_is_active")]
    async fn is_active(&self, id: &AccountId) -> Result<bool> {
        let active = guarded("is_active", self.deadline, || {
            sqlx::query_scalar::<_, bool>("SELECT active FROM accounts WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
        })
        .await?;
        active.ok_or_else(|| Error::not_found("Account", id.as_str()))
    }

    #[instrument(skip(self, credential), fields(account_id = %id, kind = credential.kind()), name = "db_update_credential")]
    async fn update_credential(&self, id: &AccountId, credential: &StoredCredential) -> Result<()> {
        let result = guarded("update_credential", self.deadline, || {
            sqlx::query(
                "UPDATE accounts SET credential_kind = $1, credential = $2, updated_at = $3 \
                 WHERE id = $4",
            )
            .bind(credential.kind())
            .bind(credential.secret())
            .bind(Utc::now())
            .bind(id.as_str())
            .execute(&self.pool)
        })
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Account", id.as_str()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(account_id = %id), name = "db_mark_authenticated")]
    async fn mark_authenticated(&self, id: &AccountId) -> Result<i64> {
        let epoch = guarded("mark_authenticated", self.deadline, || {
            sqlx::query_scalar::<_, i64>(
                "UPDATE accounts SET logged_in = 1, session_epoch = session_epoch + 1, \
                 failed_attempts = 0, last_login = $1, updated_at = $1 \
                 WHERE id = $2 RETURNING session_epoch",
            )
            .bind(Utc::now())
            .bind(id.as_str())
            .fetch_optional(&self.pool)
        })
        .await?;
        epoch.ok_or_else(|| Error::not_found("Account", id.as_str()))
    }

    #[instrument(skip(self), fields(account_id = %id), name = "db_increment_failed_attempts")]
    async fn increment_failed_attempts(&self, id: &AccountId) -> Result<i64> {
        let attempts = guarded("increment_failed_attempts", self.deadline, || {
            sqlx::query_scalar::<_, i64>(
                "UPDATE accounts SET failed_attempts = failed_attempts + 1, updated_at = $1 \
                 WHERE id = $2 RETURNING failed_attempts",
            )
            .bind(Utc::now())
            .bind(id.as_str())
            .fetch_optional(&self.pool)
        })
        .await?;
        attempts.ok_or_else(|| Error::not_found("Account", id.as_str()))
    }

    #[instrument(skip(self), fields(account_id = %id), name = "db_reset_failed_attempts")]
    async fn reset_failed_attempts(&self, id: &AccountId) -> Result<()> {
        let result = guarded("reset_failed_attempts", self.deadline, || {
            sqlx::query("UPDATE accounts SET failed_attempts = 0, updated_at = $1 WHERE id = $2")
                .bind(Utc::now())
                .bind(id.as_str())
                .execute(&self.pool)
        })
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Account", id.as_str()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(account_id = %id, observed_epoch), name = "db_clear_session")]
    async fn clear_session(&self, id: &AccountId, observed_epoch: i64) -> Result<bool> {
        let result = guarded("clear_session", self.deadline, || {
            sqlx::query(
                "UPDATE accounts SET logged_in = 0, last_logout = $1, updated_at = $1 \
                 WHERE id = $2 AND session_epoch = $3",
            )
            .bind(Utc::now())
            .bind(id.as_str())
            .bind(observed_epoch)
            .execute(&self.pool)
        })
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(account_id = %id), name = "db_session_state")]
    async fn session_state(&self, id: &AccountId) -> Result<Option<(bool, i64)>> {
        guarded("session_state", self.deadline, || {
            sqlx::query_as::<_, (bool, i64)>(
                "SELECT logged_in, session_epoch FROM accounts WHERE id = $1",
            )
            .bind(id.as_str())
            .fetch_optional(&self.pool)
        })
        .await
    }

    #[instrument(skip(self), name = "db_list_logged_in")]
    async fn list_logged_in(&self) -> Result<Vec<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE logged_in = 1 ORDER BY email");
        let rows = guarded("list_logged_in", self.deadline, || {
            sqlx::query_as::<_, AccountRow>(&sql).fetch_all(&self.pool)
        })
        .await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }
}
