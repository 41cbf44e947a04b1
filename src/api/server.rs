//! Server setup and lifecycle management

use crate::api::router::create_router;
use crate::api::state::AppState;
use crate::config::TomlConfig;
use crate::core::service::ResourceService;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_socket_addr, Validate};
use axum::Router;
use tokio::net::TcpListener;

/// HaaS API server. Owns the one ledger and registry of the process.
pub struct Server {
    config: TomlConfig,
    service: ResourceService,
}

impl Server {
    pub fn new(config: TomlConfig) -> Result<Self> {
        config.validate()?;
        let service = ResourceService::from_config(&config)?;
        Ok(Self { config, service })
    }

    pub fn service(&self) -> &ResourceService {
        &self.service
    }

    pub fn router(&self) -> Result<Router> {
        create_router(
            AppState::new(self.service.clone()),
            self.config.allowed_origins(),
        )
    }

    pub async fn run(self) -> Result<()> {
        let addr = validate_socket_addr("server.bind_addr", self.config.bind_addr())?;
        let app = self.router()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("🚀 HaaS API listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HaaS API shutting down");
        if !self.service.ledger().is_conserved() {
            tracing::error!("Ledger totals did not balance at shutdown");
        }

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
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
