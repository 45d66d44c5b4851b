use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use chronolog_domain::QueueMessage;
use serde_json::json;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::client::NatsClient;

/// Configuration for the demo producer
#[derive(Debug, Clone)]
pub struct DemoProducerConfig {
    pub subject: String,
    pub interval: Duration,
}

impl DemoProducerConfig {
    /// Publish loop tick period. `tokio::time::interval` panics on a zero
    /// period, so a misconfigured interval is clamped to 1ms.
    pub fn tick_period(&self) -> Duration {
        self.interval.max(Duration::from_millis(1))
    }
}

/// Publishes sample datetime messages onto the intake subject at a fixed
/// interval, for local runs without an external producer.
pub async fn run_demo_producer(
    client: Arc<NatsClient>,
    config: DemoProducerConfig,
    ctx: CancellationToken,
) -> Result<()> {
    info!(
        subject = %config.subject,
        interval_ms = config.interval.as_millis() as u64,
        "Starting demo producer"
    );

    let mut ticker = interval(config.tick_period());
    let mut counter: u64 = 0;

    loop {
        tokio::select! {
            _ = ctx.cancelled() => {
                info!("Demo producer stopping");
                return Ok(());
            }
            _ = ticker.tick() => {
                let message = QueueMessage {
                    // The producer wire format: UTC without offset
                    timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                    data: json!({ "source": "demo-producer", "counter": counter }),
                };
                let payload =
                    serde_json::to_vec(&message).context("Failed to encode demo message")?;

                client
                    .jetstream()
                    .publish(config.subject.clone(), payload.into())
                    .await
                    .context("Failed to publish demo message")?
                    .await
                    .context("Demo publish was not acknowledged")?;

                info!(subject = %config.subject, counter, "Published demo message");
                counter += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_is_clamped_to_a_nonzero_tick_period() {
        let config = DemoProducerConfig {
            subject: "datetime_queue.events".to_string(),
            interval: Duration::ZERO,
        };
        assert_eq!(config.tick_period(), Duration::from_millis(1));
    }

    #[test]
    fn configured_intervals_pass_through_unchanged() {
        let config = DemoProducerConfig {
            subject: "datetime_queue.events".to_string(),
            interval: Duration::from_secs(5),
        };
        assert_eq!(config.tick_period(), Duration::from_secs(5));
    }
}
