//! # Database Migration Management
//!
//! Schema evolution via SQL migrations embedded in the binary and executed
//! in version order on startup when `auto_migrate` is enabled. Applied
//! versions are tracked in a `schema_migrations` table so reruns are no-ops.

use chrono::Utc;
use sqlx::Row;
use tracing::info;

use crate::errors::{Error, Result};
use crate::storage::DbPool;

const MIGRATIONS: &[(i64, &str, &str)] =
    &[(1, "initial accounts and audit_log schema", include_str!("../../migrations/0001_initial.sql"))];

/// Run all pending migrations against the given pool.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations ( \
            version INTEGER PRIMARY KEY, \
            description TEXT NOT NULL, \
            installed_on TEXT NOT NULL \
        )",
    )
    .execute(pool)
    .await
    .map_err(|err| Error::Database {
        source: err,
        context: "Failed to create schema_migrations table".to_string(),
    })?;

    for (version, description, sql) in MIGRATIONS {
        let applied = sqlx::query("SELECT version FROM schema_migrations WHERE version = $1")
            .bind(*version)
            .fetch_optional(pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: format!("Failed to check migration {version}"),
            })?;

        if applied.is_some() {
            continue;
        }

        // Simple statement-per-semicolon execution; the embedded DDL keeps
        // semicolons out of literals.
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(pool).await.map_err(|err| Error::Database {
                source: err,
                context: format!("Migration {version} ({description}) failed"),
            })?;
        }

        sqlx::query(
            "INSERT INTO schema_migrations (version, description, installed_on) VALUES ($1, $2, $3)",
        )
        .bind(*version)
        .bind(*description)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: format!("Failed to record migration {version}"),
        })?;

        info!(version, description, "Applied database migration");
    }

    Ok(())
}

/// List applied migration versions, newest last.
pub async fn applied_versions(pool: &DbPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list applied migrations".to_string(),
        })?;
    Ok(rows.iter().map(|row| row.get::<i64, _>("version")).collect())
}
