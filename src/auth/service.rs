//! Auth service facade: Login, Logout, ChangePassword, plus the
//! administrative Kick and ResetFailedAttempts operations.
//!
//! Composes the credential verifier, the session authority, the token
//! signer, and the audit sink. Audit writes are fire-and-forget: a failed
//! append is logged at warn and never changes the outcome of the primary
//! operation.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::account::{Account, Principal};
use crate::auth::credential::{self, StoredCredential, Verification};
use crate::auth::models::{AuthContext, AuthError};
use crate::auth::session::SessionAuthority;
use crate::auth::token::TokenSigner;
use crate::config::AuthConfig;
use crate::domain::AccountId;
use crate::observability::metrics;
use crate::storage::repositories::{
    AccountRepository, AuditAction, AuditLogRepository, SqlxAccountRepository,
};
use crate::storage::DbPool;

/// Pre-computed dummy hash for timing-safe user enumeration prevention.
/// When a non-existent email is used, we still run Argon2 verification
/// against this hash so the response time matches real verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    credential::rehash("dummy_startup_value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=768,t=1,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

/// Login request payload.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 512))]
    pub password: String,
}

/// Successful login result: the bearer token and the sanitized principal.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub principal: Principal,
}

/// Service for credential verification and session lifecycle operations.
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    audit_log: Arc<AuditLogRepository>,
    session: SessionAuthority,
    tokens: Arc<TokenSigner>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        audit_log: Arc<AuditLogRepository>,
        tokens: Arc<TokenSigner>,
    ) -> Self {
        let session = SessionAuthority::new(accounts.clone());
        Self { accounts, audit_log, session, tokens }
    }

    /// Wire the service against a SQLx pool with the configured deadlines.
    pub fn with_sqlx(pool: DbPool, config: &AuthConfig) -> Self {
        let deadline = config.store_deadline();
        let accounts: Arc<dyn AccountRepository> =
            Arc::new(SqlxAccountRepository::with_deadline(pool.clone(), deadline));
        let audit_log = Arc::new(AuditLogRepository::with_deadline(pool, deadline));
        let tokens =
            Arc::new(TokenSigner::new(config.token_secret.as_bytes(), config.token_ttl_hours));
        Self::new(accounts, audit_log, tokens)
    }

    pub fn session_authority(&self) -> &SessionAuthority {
        &self.session
    }

    pub fn token_signer(&self) -> Arc<TokenSigner> {
        self.tokens.clone()
    }

    /// Authenticate a principal by email and password.
    ///
    /// On success mints a bearer token bound to the new session epoch. A
    /// matching legacy credential is rewritten to the hashed encoding before
    /// the response completes; if that rewrite fails the login still
    /// succeeds and the failure is only logged.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, AuthError> {
        let (account, stored) = match self.accounts.get_with_credential(&request.email).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                // Prevent timing-based user enumeration: perform dummy hash
                // verification so response time matches real verification
                let dummy = StoredCredential::Hashed(DUMMY_HASH.clone());
                if let Err(err) = credential::verify(&dummy, &request.password) {
                    warn!(error = %err, "dummy hash verification failed unexpectedly");
                }
                warn!(email = %request.email, "login attempt for non-existent account");
                metrics::record_authentication("invalid_credentials");
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => {
                metrics::record_authentication("store_error");
                return Err(err.into());
            }
        };

        if !account.is_active() {
            warn!(account_id = %account.id, "login attempt for inactive account");
            metrics::record_authentication("account_inactive");
            return Err(AuthError::AccountInactive);
        }

        let verification = credential::verify(&stored, &request.password).map_err(AuthError::from)?;

        let needs_migration = match verification {
            Verification::NoMatch => {
                let attempts = self.session.mark_failed_attempt(&account.id).await?;
                warn!(account_id = %account.id, attempts, "login attempt with incorrect password");
                metrics::record_authentication("invalid_credentials");
                self.record_audit(
                    &account.id,
                    AuditAction::LoginFailed,
                    format!("Wrong password. Attempt: {attempts}"),
                )
                .await;
                return Err(AuthError::InvalidCredentials);
            }
            Verification::Match { needs_migration } => needs_migration,
        };

        if needs_migration {
            self.migrate_credential(&account, &request.password).await;
        }

        let epoch = self.session.mark_authenticated(&account.id).await?;
        let minted =
            self.tokens.mint(&account.email, &account.name, epoch).map_err(AuthError::from)?;

        self.record_audit(&account.id, AuditAction::Login, "User logged in".to_string()).await;
        metrics::record_authentication("success");
        info!(account_id = %account.id, session_epoch = epoch, "principal logged in");

        // Reflect the state the login just established; the pre-login
        // snapshot would otherwise report a stale session flag.
        let mut account = account;
        account.logged_in = true;
        account.session_epoch = epoch;
        account.failed_attempts = 0;
        account.last_login = Some(Utc::now());

        Ok(LoginOutcome {
            token: minted.token,
            expires_at: minted.expires_at,
            principal: Principal::from(account),
        })
    }

    /// End the caller's own session. Idempotent: logging out an
    /// already-logged-out account succeeds silently.
    #[instrument(skip(self, context), fields(account_id = %context.account_id))]
    pub async fn logout(&self, context: &AuthContext) -> Result<(), AuthError> {
        self.session.mark_logged_out(&context.account_id, context.session_epoch).await?;
        self.record_audit(&context.account_id, AuditAction::Logout, "User logged out".to_string())
            .await;
        Ok(())
    }

    /// Rotate the caller's credential after verifying the old one.
    ///
    /// Never alters session state: outstanding tokens for this account stay
    /// valid after the rotation.
    #[instrument(skip(self, context, old_password, new_password), fields(account_id = %context.account_id))]
    pub async fn change_password(
        &self,
        context: &AuthContext,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let (account, stored) = self
            .accounts
            .get_with_credential(&context.email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let verification = credential::verify(&stored, old_password).map_err(AuthError::from)?;
        if !verification.is_match() {
            warn!(account_id = %account.id, "password change with incorrect old password");
            return Err(AuthError::IncorrectOldPassword);
        }

        let hash = credential::rehash(new_password).map_err(AuthError::from)?;
        self.accounts.update_credential(&account.id, &StoredCredential::Hashed(hash)).await?;

        self.record_audit(
            &account.id,
            AuditAction::ChangePassword,
            "Password changed successfully".to_string(),
        )
        .await;
        info!(account_id = %account.id, "password changed");
        Ok(())
    }

    /// Forcibly end another principal's session (administrative).
    ///
    /// The audit entry is attributed to the acting principal with the
    /// target named in the detail.
    #[instrument(skip(self, actor), fields(target = %target_email, actor_id = %actor.account_id))]
    pub async fn kick(&self, target_email: &str, actor: &AuthContext) -> Result<(), AuthError> {
        let target =
            self.accounts.get_by_email(target_email).await?.ok_or(AuthError::UserNotFound)?;

        self.session.mark_logged_out(&target.id, target.session_epoch).await?;
        metrics::record_session_revocation("kick");

        self.record_audit(
            &actor.account_id,
            AuditAction::KickUser,
            format!("Forced logout for {target_email}"),
        )
        .await;
        info!(target_id = %target.id, actor_id = %actor.account_id, "session kicked");
        Ok(())
    }

    /// Zero a principal's failed-attempt counter (administrative).
    #[instrument(skip(self, actor), fields(target_id = %target_id, actor_id = %actor.account_id))]
    pub async fn reset_failed_attempts(
        &self,
        target_id: &AccountId,
        actor: &AuthContext,
    ) -> Result<(), AuthError> {
        let target = self.accounts.get_by_id(target_id).await?.ok_or(AuthError::UserNotFound)?;

        self.session.reset_failed_attempts(&target.id).await?;
        self.record_audit(
            &actor.account_id,
            AuditAction::ResetFailedAttempts,
            format!("Reset failed attempts for account {}", target.id),
        )
        .await;
        Ok(())
    }

    /// The caller's own sanitized account.
    pub async fn profile(&self, context: &AuthContext) -> Result<Principal, AuthError> {
        let account =
            self.accounts.get_by_id(&context.account_id).await?.ok_or(AuthError::UserNotFound)?;
        Ok(Principal::from(account))
    }

    /// All accounts currently holding a valid session, sanitized.
    pub async fn active_accounts(&self) -> Result<Vec<Principal>, AuthError> {
        let accounts = self.accounts.list_logged_in().await?;
        Ok(accounts.into_iter().map(Principal::from).collect())
    }

    async fn migrate_credential(&self, account: &Account, password: &str) {
        match credential::rehash(password) {
            Ok(hash) => {
                if let Err(err) = self
                    .accounts
                    .update_credential(&account.id, &StoredCredential::Hashed(hash))
                    .await
                {
                    warn!(
                        account_id = %account.id,
                        error = %err,
                        "failed to persist migrated credential"
                    );
                } else {
                    info!(account_id = %account.id, "migrated legacy credential to hashed encoding");
                }
            }
            Err(err) => {
                warn!(account_id = %account.id, error = %err, "failed to rehash legacy credential");
            }
        }
    }

    async fn record_audit(&self, account_id: &AccountId, action: AuditAction, detail: String) {
        if let Err(err) = self.audit_log.append(account_id, action, &detail).await {
            warn!(
                account_id = %account_id,
                action = %action,
                error = %err,
                "failed to write audit entry"
            );
        }
    }
}
