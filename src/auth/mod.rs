//! Authentication and session-validity module entry point.
//!
//! Exposes the credential verifier, the session authority, the bearer-token
//! signer, the request gate plus its axum middleware, and the auth service
//! facade that ties them together.

pub mod account;
pub mod credential;
pub mod gate;
pub mod middleware;
pub mod models;
pub mod service;
pub mod session;
pub mod token;

pub use account::{Account, NewAccount, Principal};
pub use gate::Gate;
pub use models::{AuthContext, AuthError};
pub use service::{AuthService, LoginOutcome, LoginRequest};
pub use session::SessionAuthority;
pub use token::TokenSigner;
