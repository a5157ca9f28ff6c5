use std::sync::Arc;

use gatehouse::{
    api::{start_api_server, ApiState},
    auth::{AuthService, Gate},
    config::AppConfig,
    observability::init_tracing,
    storage::{
        create_pool,
        repositories::{AuditLogRepository, SqlxAccountRepository},
    },
    Result, APP_NAME, VERSION,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing).
    // This must happen before any config is read from environment.
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let config = AppConfig::from_env()?;
    init_tracing(&config.observability)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting Gatehouse session service");

    let pool = create_pool(&config.database).await?;

    let deadline = config.auth.store_deadline();
    let auth_service = Arc::new(AuthService::with_sqlx(pool.clone(), &config.auth));

    let accounts = Arc::new(SqlxAccountRepository::with_deadline(pool.clone(), deadline));
    let gate = Arc::new(Gate::new(accounts, auth_service.token_signer()));
    let audit_log = Arc::new(AuditLogRepository::with_deadline(pool, deadline));

    let state = ApiState { auth_service, gate, audit_log };

    start_api_server(config.api, state).await?;

    info!("Gatehouse shutdown completed");
    Ok(())
}
