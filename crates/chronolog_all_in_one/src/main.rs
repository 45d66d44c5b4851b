mod config;
mod runner;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use chronolog_api::domain::MessageService;
use chronolog_api::{ChronologApi, HttpServerConfig};
use chronolog_domain::EventBuffer;
use chronolog_nats::{connect_with_retry, run_demo_producer, DemoProducerConfig};
use chronolog_postgres::{PostgresClient, PostgresMessageRepository, PostgresTenantProvisioner};
use intake_worker::{IntakeWorker, IntakeWorkerConfig, MalformedPolicy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use config::ServiceConfig;
use runner::{spawn_signal_handler, Supervisor};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = telemetry::init_telemetry(&config.log_level) {
        eprintln!("Failed to initialize telemetry: {}", e);
        std::process::exit(1);
    }

    info!("Starting chronolog all-in-one service");
    debug!("Configuration: {:?}", config);

    let malformed_policy = match config.malformed_policy.parse::<MalformedPolicy>() {
        Ok(policy) => policy,
        Err(e) => {
            error!(error = %e, "Invalid malformed-payload policy");
            std::process::exit(1);
        }
    };

    // Signal handling is wired before any long-running startup work so the
    // connector's retry loop is interruptible.
    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    // Queue connector: bounded fixed-interval retry
    let queue_config = config.queue();
    let nats_client = match connect_with_retry(&queue_config, &shutdown).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "Queue connection failed");
            std::process::exit(1);
        }
    };

    // PostgreSQL
    info!("Initializing PostgreSQL...");
    let postgres_client = match PostgresClient::new(&config.postgres()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create PostgreSQL pool");
            std::process::exit(1);
        }
    };
    if let Err(e) = postgres_client.ping().await {
        error!(error = %e, "PostgreSQL connection failed");
        std::process::exit(1);
    }

    let provisioner = Arc::new(PostgresTenantProvisioner::new(postgres_client.clone()));
    let repository = Arc::new(PostgresMessageRepository::new(postgres_client));
    let message_service = Arc::new(MessageService::new(provisioner, repository));

    // Shared display buffer: owned here, injected into the intake loop and
    // the HTTP readers
    let buffer = Arc::new(EventBuffer::new());

    let intake_worker = match IntakeWorker::new(
        nats_client.clone(),
        buffer.clone(),
        IntakeWorkerConfig {
            stream: config.queue_stream.clone(),
            subject: config.queue_subject.clone(),
            consumer_name: config.consumer_name.clone(),
            batch_size: config.nats_batch_size,
            batch_wait_secs: config.nats_batch_wait_secs,
            malformed_policy,
            dead_letter_subject: config.dead_letter_subject.clone(),
        },
    )
    .await
    {
        Ok(worker) => worker,
        Err(e) => {
            error!(error = %e, "Failed to initialize intake worker");
            std::process::exit(1);
        }
    };

    let api = ChronologApi::new(
        message_service,
        buffer.clone(),
        config.default_tenant.clone(),
        HttpServerConfig {
            host: config.http_host.clone(),
            port: config.http_port,
        },
    );

    let mut supervisor = Supervisor::new(shutdown.clone())
        .with_process("intake_worker", move |ctx| async move {
            intake_worker.run(ctx).await
        })
        .with_process("http_api", move |ctx| api.run(ctx));

    if config.demo_producer_enabled {
        let producer_client = nats_client.clone();
        let producer_config = DemoProducerConfig {
            subject: config.queue_subject.clone(),
            interval: Duration::from_millis(config.demo_producer_interval_ms),
        };
        supervisor = supervisor.with_process("demo_producer", move |ctx| {
            run_demo_producer(producer_client, producer_config, ctx)
        });
    }

    supervisor = supervisor.with_closer(async move {
        info!("Running cleanup tasks...");
        if let Ok(client) = Arc::try_unwrap(nats_client) {
            client.close().await;
        }
        info!("Cleanup complete");
        Ok(())
    });

    supervisor.run().await;
}
