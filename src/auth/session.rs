//! Session authority: the sole writer of per-account session state.
//!
//! Session validity lives in the account store, not in the bearer token:
//! `logged_in` plus a monotonically increasing `session_epoch`. Every
//! successful login bumps the epoch and mints tokens against it; logout and
//! kick clear the flag conditionally on the epoch they observed, so a stale
//! clear can never stomp a newer login. Validity checks read the store fresh
//! on every call — a kick takes effect on the kicked principal's very next
//! request.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::AccountId;
use crate::errors::Result;
use crate::storage::repositories::AccountRepository;

#[derive(Clone)]
pub struct SessionAuthority {
    accounts: Arc<dyn AccountRepository>,
}

impl SessionAuthority {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Establish a fresh valid session for the account.
    ///
    /// Sets `logged_in`, bumps `session_epoch`, zeroes `failed_attempts`,
    /// and stamps `last_login`. Returns the new epoch for token minting.
    /// Safe under repeated calls: each call simply begins a new generation.
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn mark_authenticated(&self, id: &AccountId) -> Result<i64> {
        let epoch = self.accounts.mark_authenticated(id).await?;
        info!(account_id = %id, session_epoch = epoch, "session established");
        Ok(epoch)
    }

    /// Record one failed verification attempt.
    ///
    /// Increments `failed_attempts` by exactly one and touches nothing
    /// else. The counter is advisory: no code path rejects a login once it
    /// crosses any threshold.
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn mark_failed_attempt(&self, id: &AccountId) -> Result<i64> {
        self.accounts.increment_failed_attempts(id).await
    }

    /// Clear the session flag, used by voluntary logout and administrative
    /// kick alike.
    ///
    /// Conditional on `observed_epoch`: if a newer login superseded the
    /// observed session the update is a no-op — the observed session's
    /// tokens are already invalid by epoch mismatch — and that still counts
    /// as success for the caller.
    #[instrument(skip(self), fields(account_id = %id, observed_epoch))]
    pub async fn mark_logged_out(&self, id: &AccountId, observed_epoch: i64) -> Result<bool> {
        let applied = self.accounts.clear_session(id, observed_epoch).await?;
        if applied {
            info!(account_id = %id, session_epoch = observed_epoch, "session cleared");
        } else {
            info!(
                account_id = %id,
                session_epoch = observed_epoch,
                "session clear skipped, observed epoch superseded"
            );
        }
        Ok(applied)
    }

    /// Reset the failed-attempt counter to zero.
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn reset_failed_attempts(&self, id: &AccountId) -> Result<()> {
        self.accounts.reset_failed_attempts(id).await
    }

    /// Whether a token minted at `token_epoch` is still honored.
    ///
    /// Reads `(logged_in, session_epoch)` fresh from the store on every
    /// call — no caching.
    #[instrument(skip(self), fields(account_id = %id, token_epoch))]
    pub async fn is_session_valid(&self, id: &AccountId, token_epoch: i64) -> Result<bool> {
        match self.accounts.session_state(id).await? {
            Some((logged_in, session_epoch)) => Ok(logged_in && session_epoch == token_epoch),
            None => Ok(false),
        }
    }
}
