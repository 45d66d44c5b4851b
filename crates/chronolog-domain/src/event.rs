use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Wire form of a queue message: a timestamp plus an arbitrary JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub timestamp: String,
    pub data: serde_json::Value,
}

/// A decoded message held in the display buffer until restart or clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferedEvent {
    pub timestamp: String,
    pub data: serde_json::Value,
}

impl From<QueueMessage> for BufferedEvent {
    fn from(message: QueueMessage) -> Self {
        Self {
            timestamp: message.timestamp,
            data: message.data,
        }
    }
}

/// Shared, append-only buffer of decoded events.
///
/// Owned explicitly and passed (`Arc`-wrapped) to both the intake loop and
/// any reader. Append order is delivery order. A single mutex suffices:
/// operations are short and never held across await points.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Mutex<Vec<BufferedEvent>>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, event: BufferedEvent) {
        self.lock().push(event);
    }

    /// Returns a point-in-time copy of the buffer contents, in delivery order.
    pub fn snapshot(&self) -> Vec<BufferedEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Truncates the buffer. Idempotent; always succeeds.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<BufferedEvent>> {
        // A panicked appender cannot leave a Vec in a torn state, so a
        // poisoned lock is still safe to reuse.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(timestamp: &str) -> BufferedEvent {
        BufferedEvent {
            timestamp: timestamp.to_string(),
            data: json!({"seq": timestamp}),
        }
    }

    #[test]
    fn append_preserves_delivery_order() {
        let buffer = EventBuffer::new();
        buffer.append(event("t1"));
        buffer.append(event("t2"));
        buffer.append(event("t3"));

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].timestamp, "t1");
        assert_eq!(snapshot[1].timestamp, "t2");
        assert_eq!(snapshot[2].timestamp, "t3");
    }

    #[test]
    fn clear_is_idempotent() {
        let buffer = EventBuffer::new();
        buffer.append(event("t1"));
        buffer.clear();
        assert!(buffer.is_empty());
        buffer.clear();
        assert!(buffer.snapshot().is_empty());
    }

    #[test]
    fn decoded_wire_message_converts_verbatim() {
        let payload = r#"{"timestamp":"2024-01-01 00:00:00","data":{"k":1}}"#;
        let message: QueueMessage = serde_json::from_str(payload).unwrap();
        let buffered = BufferedEvent::from(message);
        assert_eq!(buffered.timestamp, "2024-01-01 00:00:00");
        assert_eq!(buffered.data, json!({"k": 1}));
    }
}
