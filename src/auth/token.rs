//! Bearer token minting and validation.
//!
//! Tokens are HS256-signed claims with an expiry. The signature stops casual
//! forgery and the `exp` claim bounds token lifetime, but revocation truth
//! stays in the account store: the embedded `epoch` must still match the
//! account's current session generation at request time.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::models::AuthError;
use crate::errors::{Error, Result};

/// Claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal email
    pub sub: String,
    /// Display name, echoed into the request context
    pub name: String,
    /// Session generation this token was minted for
    pub epoch: i64,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration (seconds since epoch)
    pub exp: i64,
}

/// A minted token plus its expiry, returned to the caller on login.
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and validates bearer tokens with a shared secret.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        let mut validation = Validation::default();
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Mint a token for the given principal and session generation.
    pub fn mint(&self, email: &str, name: &str, epoch: i64) -> Result<MintedToken> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: email.to_string(),
            name: name.to_string(),
            epoch,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| Error::internal(format!("failed to sign bearer token: {err}")))?;
        Ok(MintedToken { token, expires_at })
    }

    /// Validate a token string and return its claims.
    ///
    /// Signature or structural failures are malformed; an expired `exp` is
    /// its own kind so the gate can report it distinctly.
    pub fn decode(&self, token: &str) -> std::result::Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::MalformedBearer,
            })
    }
}
