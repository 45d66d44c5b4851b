use std::sync::Arc;

use anyhow::{Context, Result};
use chronolog_domain::EventBuffer;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::MessageService;
use crate::http::{build_router, AppState};

#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

/// The HTTP API module: owns the router and serves it until cancelled.
pub struct ChronologApi {
    state: AppState,
    config: HttpServerConfig,
}

impl ChronologApi {
    pub fn new(
        messages: Arc<MessageService>,
        buffer: Arc<EventBuffer>,
        default_tenant: String,
        config: HttpServerConfig,
    ) -> Self {
        let state = AppState {
            messages,
            buffer,
            default_tenant: Arc::new(default_tenant),
        };
        Self { state, config }
    }

    pub async fn run(self, ctx: CancellationToken) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
        info!(addr = %addr, "HTTP API listening");

        let router = build_router(self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { ctx.cancelled().await })
            .await
            .context("HTTP server error")?;

        info!("HTTP API stopped gracefully");
        Ok(())
    }
}
