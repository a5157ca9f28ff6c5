//! # Gatehouse
//!
//! Gatehouse is a credential-verification and session-validity service for
//! multi-user applications. It authenticates principals by email/password,
//! mints signed bearer tokens, and re-checks store-resident session state on
//! every protected request — so an operator can forcibly end a live session
//! without any cooperation from the token holder.
//!
//! ## Architecture
//!
//! ```text
//! REST API Layer → Auth Service ─┬→ Credential Verifier
//!      ↓                         ├→ Session Authority ─→ Account Store
//! Authentication Gate ───────────┘                    └→ Audit Sink
//! ```
//!
//! ## Core Components
//!
//! - **Credential Verifier**: pure decisions over the tagged credential
//!   encoding (Argon2 hashed vs legacy plaintext), including migration
//!   signaling
//! - **Session Authority**: sole writer of per-account session state,
//!   epoch-guarded so revocation and re-login compose safely
//! - **Authentication Gate**: axum middleware resolving bearer tokens and
//!   failing closed against the account store
//! - **Auth Service**: Login/Logout/ChangePassword plus administrative
//!   Kick and ResetFailedAttempts, with audit wiring
//! - **Persistence Layer**: SQLx with SQLite, bounded store deadlines, and
//!   embedded migrations

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use observability::init_tracing;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
