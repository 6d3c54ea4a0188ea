use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use email_trigger_service::auth::GoogleOAuthClient;
use email_trigger_service::config::Settings;
use email_trigger_service::email::GmailTransport;
use email_trigger_service::server::{create_app, AppState};
use email_trigger_service::storage::create_storage_backend;
use email_trigger_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing; the guard flushes spans on exit
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!("Configuration loaded");

    let store = create_storage_backend(&settings.database).await?;
    tracing::info!(backend = store.backend_type(), "Storage initialized");

    let oauth = Arc::new(GoogleOAuthClient::new(
        settings.oauth.clone(),
        settings.oauth_redirect_uri(),
    )?);
    let transport = Arc::new(GmailTransport::new(&settings.gmail)?);

    let addr = settings.server_addr();
    let state = AppState::new(settings, store, oauth, transport);
    tracing::info!("Application state initialized");

    let app = create_app(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
