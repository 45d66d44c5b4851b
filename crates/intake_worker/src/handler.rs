use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chronolog_domain::{BufferedEvent, EventBuffer, QueueMessage};
use chronolog_nats::{DeadLetterPublisher, MessageHandler};
use tracing::{debug, error, warn};

/// Policy for payloads that fail to decode. The delivery is acknowledged
/// either way; only the payload's fate differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Drop the payload: forward progress over delivery-loss safety.
    #[default]
    Ack,
    /// Publish the raw payload to the dead-letter subject, then drop.
    DeadLetter,
}

impl FromStr for MalformedPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ack" => Ok(Self::Ack),
            "dead_letter" => Ok(Self::DeadLetter),
            other => Err(anyhow::anyhow!(
                "unknown malformed-payload policy '{other}' (expected 'ack' or 'dead_letter')"
            )),
        }
    }
}

/// Decodes queue payloads into the shared display buffer.
///
/// Valid payloads append `{timestamp, data}` verbatim, in delivery order.
/// Malformed payloads are logged with the raw payload and handled per
/// [`MalformedPolicy`]; the buffer is never touched for them.
pub struct EventIntakeHandler {
    buffer: Arc<EventBuffer>,
    policy: MalformedPolicy,
    dead_letter: Option<Arc<dyn DeadLetterPublisher>>,
}

impl EventIntakeHandler {
    pub fn new(
        buffer: Arc<EventBuffer>,
        policy: MalformedPolicy,
        dead_letter: Option<Arc<dyn DeadLetterPublisher>>,
    ) -> Self {
        Self {
            buffer,
            policy,
            dead_letter,
        }
    }
}

#[async_trait]
impl MessageHandler for EventIntakeHandler {
    async fn handle(&self, payload: &[u8]) {
        match serde_json::from_slice::<QueueMessage>(payload) {
            Ok(message) => {
                debug!(timestamp = %message.timestamp, "Buffered queue message");
                self.buffer.append(BufferedEvent::from(message));
            }
            Err(e) => {
                warn!(
                    error = %e,
                    payload = %String::from_utf8_lossy(payload),
                    "Malformed queue payload"
                );
                if self.policy == MalformedPolicy::DeadLetter {
                    if let Some(publisher) = &self.dead_letter {
                        if let Err(e) = publisher.publish(Bytes::copy_from_slice(payload)).await {
                            error!(error = %e, "Failed to dead-letter malformed payload");
                        }
                    }
                }
            }
        }
    }
}
