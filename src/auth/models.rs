//! Shared auth types: the request-scoped context and the error vocabulary
//! returned across the authentication boundary.

use thiserror::Error;

use crate::domain::AccountId;
use crate::errors::Error as StoreError;

/// Request-scoped authentication context derived from a valid bearer token.
///
/// Inserted into request extensions by the authentication gate; downstream
/// handlers read the resolved principal from here.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account_id: AccountId,
    pub email: String,
    pub name: String,
    /// The session generation the presented token was minted for.
    pub session_epoch: i64,
}

/// Errors returned by the auth service and the authentication gate.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password, intentionally conflated for the caller.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    /// Only surfaced for operations already scoped to an authenticated
    /// identity (e.g. change password, kick).
    #[error("user not found")]
    UserNotFound,

    #[error("incorrect old password")]
    IncorrectOldPassword,

    #[error("unauthorized: bearer token missing")]
    MissingBearer,

    #[error("unauthorized: malformed bearer token")]
    MalformedBearer,

    #[error("unauthorized: token has expired")]
    ExpiredToken,

    /// The token resolved to no known account, or the gate failed closed.
    #[error("unauthorized: unknown principal")]
    PrincipalNotFound,

    /// Well-formed credential, but the session flag has been cleared or
    /// superseded by a newer login.
    #[error("session expired or revoked")]
    SessionRevoked,

    #[error("credential store unavailable")]
    StoreUnavailable,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Persistence(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        if err.is_unavailable() {
            return AuthError::StoreUnavailable;
        }
        match err {
            StoreError::Hashing(message) => AuthError::Hashing(message),
            other => AuthError::Persistence(other),
        }
    }
}
