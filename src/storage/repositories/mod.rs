//! Repository implementations over the SQLx pool.

pub mod account;
pub mod audit_log;

pub use account::{AccountRepository, SqlxAccountRepository, DEFAULT_STORE_DEADLINE};
pub use audit_log::{AuditAction, AuditEntry, AuditLogRepository};
