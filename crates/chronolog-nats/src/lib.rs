mod client;
mod consumer;
mod demo_producer;
mod error;

pub use client::{connect_with_retry, NatsClient, QueueConfig};
pub use consumer::{
    DeadLetterPublisher, IntakeConsumer, JetStreamDeadLetterPublisher, MessageHandler,
};
pub use demo_producer::{run_demo_producer, DemoProducerConfig};
pub use error::ConnectError;

#[cfg(any(test, feature = "testing"))]
pub use consumer::{MockDeadLetterPublisher, MockMessageHandler};
