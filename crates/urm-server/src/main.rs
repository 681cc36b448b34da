//! URM Server: Application entry point.

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use urm_auth::ensure_default_permissions;
use urm_db::DbManager;
use urm_server::{AppState, ServerConfig, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("urm=info")),
        )
        .json()
        .init();

    tracing::info!("Starting URM server...");

    let config = ServerConfig::load().context("loading configuration")?;
    let auth_config = config.resolved_auth().context("loading JWT keys")?;

    let db = DbManager::connect(&config.database)
        .await
        .context("connecting to SurrealDB")?;
    urm_db::run_migrations(db.client())
        .await
        .context("running migrations")?;

    let state = AppState::new(db.client().clone(), auth_config);
    ensure_default_permissions(&state.permissions)
        .await
        .context("seeding default permissions")?;
    if let Some(admin) = &config.bootstrap_admin {
        state
            .auth
            .ensure_admin(&admin.email, &admin.password)
            .await
            .context("provisioning bootstrap admin")?;
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("URM server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
