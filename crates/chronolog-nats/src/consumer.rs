use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_nats::jetstream::{self, consumer::PullConsumer};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Processes one delivered payload. The consumer acknowledges every
/// delivery after `handle` returns, whatever the outcome — containment of
/// malformed payloads is the handler's concern, redelivery control is the
/// consumer's.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]);
}

/// Publishes payloads that could not be processed, for the dead-letter
/// malformed-payload policy.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeadLetterPublisher: Send + Sync {
    async fn publish(&self, payload: Bytes) -> Result<()>;
}

/// JetStream-backed dead-letter publisher.
pub struct JetStreamDeadLetterPublisher {
    jetstream: jetstream::Context,
    subject: String,
}

impl JetStreamDeadLetterPublisher {
    pub fn new(jetstream: jetstream::Context, subject: String) -> Self {
        Self { jetstream, subject }
    }
}

#[async_trait]
impl DeadLetterPublisher for JetStreamDeadLetterPublisher {
    async fn publish(&self, payload: Bytes) -> Result<()> {
        self.jetstream
            .publish(self.subject.clone(), payload)
            .await
            .context("Failed to publish dead-letter payload")?
            .await
            .context("Dead-letter publish was not acknowledged")?;
        Ok(())
    }
}

/// Durable pull consumer over the intake stream.
///
/// Fetches batches until cancelled; each delivery is handed to the
/// [`MessageHandler`] and then acknowledged exactly once.
pub struct IntakeConsumer {
    consumer: PullConsumer,
    batch_size: usize,
    max_wait: Duration,
    handler: Arc<dyn MessageHandler>,
}

impl IntakeConsumer {
    pub async fn new(
        jetstream: &jetstream::Context,
        stream_name: &str,
        consumer_name: &str,
        subject_filter: &str,
        batch_size: usize,
        max_wait_secs: u64,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self> {
        debug!(
            stream = stream_name,
            consumer = consumer_name,
            subject = subject_filter,
            "Creating JetStream consumer"
        );

        let consumer = jetstream
            .create_consumer_on_stream(
                jetstream::consumer::pull::Config {
                    name: Some(consumer_name.to_string()),
                    durable_name: Some(consumer_name.to_string()),
                    filter_subject: subject_filter.to_string(),
                    ack_policy: jetstream::consumer::AckPolicy::Explicit,
                    ..Default::default()
                },
                stream_name,
            )
            .await
            .context("Failed to create consumer")?;

        info!(
            stream = stream_name,
            consumer = consumer_name,
            "Consumer created"
        );

        Ok(Self {
            consumer,
            batch_size,
            max_wait: Duration::from_secs(max_wait_secs),
            handler,
        })
    }

    pub async fn run(&self, ctx: CancellationToken) -> Result<()> {
        info!("Starting intake loop");

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("Received shutdown signal, stopping intake loop");
                    break;
                }
                result = self.fetch_and_process() => {
                    if let Err(e) = result {
                        error!(error = %e, "Error processing batch");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        info!("Intake loop stopped gracefully");
        Ok(())
    }

    async fn fetch_and_process(&self) -> Result<()> {
        let mut batch = self
            .consumer
            .fetch()
            .max_messages(self.batch_size)
            .expires(self.max_wait)
            .messages()
            .await
            .context("Failed to fetch message batch")?;

        while let Some(message) = batch.next().await {
            let message = match message {
                Ok(message) => message,
                Err(e) => {
                    error!(error = %e, "Failed to receive message from batch");
                    continue;
                }
            };

            self.handler.handle(&message.payload).await;

            // Eager ack: prevents unbounded redelivery even for payloads
            // the handler dropped.
            if let Err(e) = message.ack().await {
                error!(error = %e, "Failed to acknowledge message");
            }
        }

        Ok(())
    }
}
