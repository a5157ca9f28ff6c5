//! Credential encodings and verification.
//!
//! Stored secrets come in two encodings: `Hashed` (Argon2id PHC string) and
//! `Legacy` (comparable plaintext pending migration). Verification is a pure
//! decision: it reports whether the supplied password matches and whether the
//! stored encoding still needs migration. Persisting a migrated encoding is
//! the caller's job; encodings only ever move from `Legacy` to `Hashed`.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};

use crate::errors::{Error, Result};

/// Stored credential material, tagged by encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredCredential {
    /// Argon2id PHC string
    Hashed(String),
    /// Plaintext secret pending migration
    Legacy(String),
}

impl StoredCredential {
    /// Database tag for this encoding.
    pub fn kind(&self) -> &'static str {
        match self {
            StoredCredential::Hashed(_) => "argon2",
            StoredCredential::Legacy(_) => "plaintext",
        }
    }

    /// Reassemble an encoding from its database columns.
    pub fn from_parts(kind: &str, secret: String) -> Result<Self> {
        match kind {
            "argon2" => Ok(StoredCredential::Hashed(secret)),
            "plaintext" => Ok(StoredCredential::Legacy(secret)),
            other => Err(Error::validation(format!("Unknown credential kind '{other}'"))),
        }
    }

    /// The raw stored secret (hash or plaintext).
    pub fn secret(&self) -> &str {
        match self {
            StoredCredential::Hashed(secret) | StoredCredential::Legacy(secret) => secret,
        }
    }
}

/// Outcome of verifying a supplied password against a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Match {
        /// The stored encoding is `Legacy` and must be rewritten to
        /// `Hashed` before the response completes.
        needs_migration: bool,
    },
    NoMatch,
}

impl Verification {
    pub fn is_match(&self) -> bool {
        matches!(self, Verification::Match { .. })
    }
}

pub fn password_hasher() -> Argon2<'static> {
    // Tuned for interactive API calls: Argon2id with moderate memory and a
    // single iteration keeps verification under 10ms on development hardware
    // while retaining side-channel protections.
    const MEMORY_COST_KIB: u32 = 768;
    const ITERATIONS: u32 = 1;
    const PARALLELISM: u32 = 1;
    let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, Some(32))
        .expect("valid Argon2 parameters");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Decide whether `supplied` matches the stored credential.
///
/// `Hashed` runs the Argon2 comparison and is authoritative. `Legacy`
/// compares by exact value; a legacy match carries `needs_migration` so the
/// caller rewrites the stored encoding. No side effects.
pub fn verify(stored: &StoredCredential, supplied: &str) -> Result<Verification> {
    match stored {
        StoredCredential::Hashed(hash) => {
            let parsed = PasswordHash::new(hash)
                .map_err(|err| Error::hashing(format!("stored credential hash is malformed: {err}")))?;
            match password_hasher().verify_password(supplied.as_bytes(), &parsed) {
                Ok(()) => Ok(Verification::Match { needs_migration: false }),
                Err(argon2::password_hash::Error::Password) => Ok(Verification::NoMatch),
                Err(err) => Err(Error::hashing(format!("credential verification failed: {err}"))),
            }
        }
        StoredCredential::Legacy(plaintext) => {
            if plaintext == supplied {
                Ok(Verification::Match { needs_migration: true })
            } else {
                Ok(Verification::NoMatch)
            }
        }
    }
}

/// Whether the stored encoding still needs migration to `Hashed`.
pub fn needs_migration(stored: &StoredCredential) -> bool {
    matches!(stored, StoredCredential::Legacy(_))
}

/// Produce a fresh hashed encoding of `supplied` for migration or rotation.
///
/// Fails only on resource exhaustion inside Argon2.
pub fn rehash(supplied: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    password_hasher()
        .hash_password(supplied.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::hashing(format!("password hashing failed: {err}")))
}
