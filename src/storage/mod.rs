//! Storage layer: connection pooling, migrations, and repositories.

pub mod migrations;
pub mod pool;
pub mod repositories;

use std::future::Future;
use std::time::Duration;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool};

use crate::errors::{is_connectivity_error, Error, Result};

/// Run a store operation under a bounded deadline.
///
/// Every repository call goes through this wrapper: the query future is
/// raced against `deadline` and an expiry surfaces as [`Error::Timeout`]
/// instead of blocking the caller indefinitely. Connectivity-class failures
/// (pool exhausted/closed, I/O) are retried exactly once, immediately; all
/// other failures are returned as-is — a rejected operation must never be
/// silently retried.
pub(crate) async fn guarded<T, F, Fut>(
    operation: &'static str,
    deadline: Duration,
    run: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(deadline, run()).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) if is_connectivity_error(&err) => {
            tracing::warn!(operation, error = %err, "store connectivity failure, retrying once");
            match tokio::time::timeout(deadline, run()).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(Error::Database {
                    source: err,
                    context: format!("{operation} failed after retry"),
                }),
                Err(_) => Err(Error::timeout(operation, deadline)),
            }
        }
        Ok(Err(err)) => {
            Err(Error::Database { source: err, context: format!("{operation} failed") })
        }
        Err(_) => Err(Error::timeout(operation, deadline)),
    }
}
