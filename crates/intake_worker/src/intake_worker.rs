use std::sync::Arc;

use chronolog_domain::EventBuffer;
use chronolog_nats::{
    DeadLetterPublisher, IntakeConsumer, JetStreamDeadLetterPublisher, NatsClient,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::handler::{EventIntakeHandler, MalformedPolicy};

pub struct IntakeWorkerConfig {
    pub stream: String,
    pub subject: String,
    pub consumer_name: String,
    pub batch_size: usize,
    pub batch_wait_secs: u64,
    pub malformed_policy: MalformedPolicy,
    pub dead_letter_subject: String,
}

/// Consumes the intake stream into the shared display buffer.
pub struct IntakeWorker {
    consumer: IntakeConsumer,
}

impl IntakeWorker {
    pub async fn new(
        nats_client: Arc<NatsClient>,
        buffer: Arc<EventBuffer>,
        config: IntakeWorkerConfig,
    ) -> anyhow::Result<Self> {
        info!("Initializing intake worker");

        let dead_letter: Option<Arc<dyn DeadLetterPublisher>> = match config.malformed_policy {
            MalformedPolicy::DeadLetter => Some(Arc::new(JetStreamDeadLetterPublisher::new(
                nats_client.jetstream().clone(),
                config.dead_letter_subject.clone(),
            ))),
            MalformedPolicy::Ack => None,
        };

        let handler = Arc::new(EventIntakeHandler::new(
            buffer,
            config.malformed_policy,
            dead_letter,
        ));

        let consumer = IntakeConsumer::new(
            nats_client.jetstream(),
            &config.stream,
            &config.consumer_name,
            &config.subject,
            config.batch_size,
            config.batch_wait_secs,
            handler,
        )
        .await?;

        info!("Intake worker initialized");
        Ok(Self { consumer })
    }

    pub async fn run(&self, ctx: CancellationToken) -> anyhow::Result<()> {
        self.consumer.run(ctx).await
    }
}
