//! Clinica Server — Application entry point.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clinica_db::{DbManager, run_migrations};
use clinica_server::settings::Settings;
use clinica_server::{AppState, build_router, logging, mail};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    let _log_guard = logging::init(&settings.logging).context("failed to initialise logging")?;

    info!("Starting Clinica server...");

    let auth = settings.auth_config().context("invalid auth settings")?;
    let db = DbManager::connect(&settings.db_config())
        .await
        .context("failed to connect to SurrealDB")?;
    run_migrations(db.client())
        .await
        .context("failed to apply schema migrations")?;

    let mailer = mail::from_settings(&settings.mail).context("invalid mail settings")?;
    let state = AppState::new(db.client().clone(), auth, mailer).shared();
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;
    info!(%addr, "Clinica server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Clinica server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
