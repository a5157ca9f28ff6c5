//! Request-time enforcement point for bearer credentials.
//!
//! The gate is stateless: it derives the principal from the token's claims
//! and re-checks current session validity against the account store on
//! every call. It fails closed — a store failure during resolution or the
//! validity check rejects the request rather than letting it through.

use std::sync::Arc;

use tracing::warn;

use crate::auth::models::{AuthContext, AuthError};
use crate::auth::session::SessionAuthority;
use crate::auth::token::TokenSigner;
use crate::observability::metrics;
use crate::storage::repositories::AccountRepository;

#[derive(Clone)]
pub struct Gate {
    accounts: Arc<dyn AccountRepository>,
    session: SessionAuthority,
    tokens: Arc<TokenSigner>,
}

impl Gate {
    pub fn new(accounts: Arc<dyn AccountRepository>, tokens: Arc<TokenSigner>) -> Self {
        let session = SessionAuthority::new(accounts.clone());
        Self { accounts, session, tokens }
    }

    /// Resolve an `Authorization` header value to an authenticated context.
    ///
    /// Rejections, in order: missing header, malformed or expired token,
    /// unknown principal (also the fail-closed path for store failures),
    /// revoked or superseded session.
    pub async fn check(&self, header: &str) -> Result<AuthContext, AuthError> {
        let header = header.trim();
        if header.is_empty() {
            metrics::record_session_check("missing_bearer");
            return Err(AuthError::MissingBearer);
        }

        let token = header.strip_prefix("Bearer ").unwrap_or(header);
        let claims = self.tokens.decode(token).inspect_err(|err| {
            let outcome = match err {
                AuthError::ExpiredToken => "expired",
                _ => "malformed",
            };
            metrics::record_session_check(outcome);
        })?;

        let account = match self.accounts.get_by_email(&claims.sub).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                metrics::record_session_check("unknown_principal");
                return Err(AuthError::PrincipalNotFound);
            }
            Err(err) => {
                // Fail closed: an unreachable store must never admit a request.
                warn!(error = %err, "account store unavailable during gate check");
                metrics::record_session_check("store_error");
                return Err(AuthError::PrincipalNotFound);
            }
        };

        let valid = match self.session.is_session_valid(&account.id, claims.epoch).await {
            Ok(valid) => valid,
            Err(err) => {
                warn!(error = %err, "account store unavailable during validity check");
                metrics::record_session_check("store_error");
                return Err(AuthError::PrincipalNotFound);
            }
        };

        if !valid {
            metrics::record_session_check("revoked");
            return Err(AuthError::SessionRevoked);
        }

        metrics::record_session_check("success");
        Ok(AuthContext {
            account_id: account.id,
            email: account.email,
            name: account.name,
            session_epoch: claims.epoch,
        })
    }
}
