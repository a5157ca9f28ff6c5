//! Account domain models.
//!
//! The stored [`Account`] never carries credential material; repositories
//! return the credential separately so it cannot leak through serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::credential::StoredCredential;
use crate::domain::AccountId;

/// Stored representation of a principal account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    /// Administrative enable/disable, independent of session state.
    pub active: bool,
    /// Session-validity flag: outstanding bearer tokens are honored only
    /// while this is set and their epoch matches `session_epoch`.
    pub logged_in: bool,
    /// Monotonically increasing login generation; bumped by every
    /// successful login and embedded in minted tokens.
    pub session_epoch: i64,
    /// Consecutive failed verification count. Advisory only: tracked and
    /// resettable, never enforced as a lockout threshold.
    pub failed_attempts: i64,
    pub last_login: Option<DateTime<Utc>>,
    pub last_logout: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Check if the account may authenticate at all.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Caller-facing view of an account, safe to serialize in responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub active: bool,
    pub logged_in: bool,
    pub failed_attempts: i64,
    pub last_login: Option<DateTime<Utc>>,
    pub last_logout: Option<DateTime<Utc>>,
}

impl From<Account> for Principal {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            active: account.active,
            logged_in: account.logged_in,
            failed_attempts: account.failed_attempts,
            last_login: account.last_login,
            last_logout: account.last_logout,
        }
    }
}

/// Provisioning payload for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub credential: StoredCredential,
    pub active: bool,
}

impl NewAccount {
    /// Convenience constructor for an active account with a fresh ID.
    pub fn new(email: impl Into<String>, name: impl Into<String>, credential: StoredCredential) -> Self {
        Self {
            id: AccountId::new(),
            email: email.into(),
            name: name.into(),
            credential,
            active: true,
        }
    }
}
