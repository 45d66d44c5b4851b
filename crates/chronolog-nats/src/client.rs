use std::time::Duration;

use anyhow::{Context, Result};
use async_nats::jetstream::{self, stream::Config as StreamConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ConnectError;

/// Queue broker connection settings.
///
/// Retries use a fixed interval by design: faster operator feedback over
/// backoff sophistication.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub url: String,
    pub stream: String,
    pub subject: String,
    pub max_connect_attempts: u32,
    pub connect_retry_delay: Duration,
    pub connect_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            stream: "datetime_queue".to_string(),
            subject: "datetime_queue.events".to_string(),
            max_connect_attempts: 10,
            connect_retry_delay: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

pub struct NatsClient {
    client: async_nats::Client,
    jetstream: jetstream::Context,
}

impl NatsClient {
    /// Single connection attempt with a connection timeout.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let client = async_nats::ConnectOptions::new()
            .connection_timeout(timeout)
            .connect(url)
            .await
            .context("Failed to connect to NATS")?;

        let jetstream = jetstream::new(client.clone());

        Ok(Self { client, jetstream })
    }

    /// Idempotently declares the durable intake stream. A no-op when the
    /// stream already exists; creation failure (including incompatible
    /// existing configuration) surfaces to the caller.
    ///
    /// The stream captures `<name>.*`, so the intake subject and the
    /// dead-letter subject share one stream.
    pub async fn ensure_stream(&self, stream_name: &str) -> Result<()> {
        match self.jetstream.get_stream(stream_name).await {
            Ok(_) => {
                info!(stream = stream_name, "Stream already exists");
            }
            Err(_) => {
                let stream_config = StreamConfig {
                    name: stream_name.to_string(),
                    subjects: vec![format!("{}.*", stream_name)],
                    description: Some("Durable intake queue for datetime events".to_string()),
                    ..Default::default()
                };
                self.jetstream
                    .create_stream(stream_config)
                    .await
                    .context("Failed to create stream")?;
                info!(stream = stream_name, "Created stream");
            }
        }
        Ok(())
    }

    pub fn jetstream(&self) -> &jetstream::Context {
        &self.jetstream
    }

    pub async fn close(self) {
        info!("Closing NATS connection");
        drop(self.client);
    }
}

/// Connects to the broker and declares the intake stream, retrying with a
/// fixed delay up to the configured attempt budget.
///
/// Stream declaration failure consumes a retry like a connection failure.
/// The backoff sleep is cancellable; shutdown interrupts the loop cleanly.
pub async fn connect_with_retry(
    config: &QueueConfig,
    ctx: &CancellationToken,
) -> Result<NatsClient, ConnectError> {
    let budget = config.max_connect_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match try_connect(config).await {
            Ok(client) => {
                info!(attempt, budget, "Connected to queue broker");
                return Ok(client);
            }
            Err(e) => {
                warn!(
                    attempt,
                    budget,
                    error = %e,
                    "Queue connection attempt failed"
                );
                if attempt >= budget {
                    return Err(ConnectError::RetriesExhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
                tokio::select! {
                    _ = ctx.cancelled() => return Err(ConnectError::Cancelled),
                    _ = tokio::time::sleep(config.connect_retry_delay) => {}
                }
            }
        }
    }
}

async fn try_connect(config: &QueueConfig) -> Result<NatsClient> {
    let client = NatsClient::connect(&config.url, config.connect_timeout).await?;
    client.ensure_stream(&config.stream).await?;
    Ok(client)
}
