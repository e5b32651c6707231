//! HTTP server lifecycle: startup, serving and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::api::create_router;
use crate::config::{Environment, Settings};
use crate::db::establish_async_connection_pool;
use crate::repositories::PgUserStore;
use crate::services::SystemClock;
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
    environment: Environment,
}

impl Server {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    /// Run until Ctrl+C or SIGTERM.
    pub async fn run(self) -> anyhow::Result<()> {
        let shutdown = CancellationToken::new();
        tokio::spawn(forward_shutdown_signal(shutdown.clone()));
        self.run_until(shutdown).await
    }

    /// Run until `shutdown` is cancelled, then drain in-flight requests.
    ///
    /// # Errors
    /// - Connection pool initialization errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run_until(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let settings = &self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            environment = %self.environment,
            "Application starting"
        );

        // URL omitted, it may carry credentials
        tracing::info!(
            max_connections = settings.database.max_connections,
            min_connections = settings.database.min_connections,
            connection_timeout = settings.database.connection_timeout,
            query_timeout = settings.database.query_timeout,
            "Database configuration loaded"
        );

        let pool = establish_async_connection_pool(&settings.database).await?;
        let store = Arc::new(PgUserStore::new(pool, settings.database.query_timeout()));
        let state = AppState::new(store, Arc::new(SystemClock));
        let router = create_router(state);

        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Cancels `token` on Ctrl+C or SIGTERM.
async fn forward_shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = token.cancelled() => {}
    }

    token.cancel();
}
