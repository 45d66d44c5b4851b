use std::fmt;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use chronolog_nats::QueueConfig;
use chronolog_postgres::PostgresConfig;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Durable intake stream name
    #[serde(default = "default_queue_stream")]
    pub queue_stream: String,

    /// Subject the intake consumer filters on
    #[serde(default = "default_queue_subject")]
    pub queue_subject: String,

    /// Durable consumer name
    #[serde(default = "default_consumer_name")]
    pub consumer_name: String,

    /// Connection attempt budget for the queue connector
    #[serde(default = "default_connect_max_attempts")]
    pub connect_max_attempts: u32,

    /// Fixed delay between connection attempts in seconds
    #[serde(default = "default_connect_retry_delay_secs")]
    pub connect_retry_delay_secs: u64,

    /// Timeout for a single connection attempt in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Batch size for the intake consumer
    #[serde(default = "default_nats_batch_size")]
    pub nats_batch_size: usize,

    /// Max wait time for batches in seconds
    #[serde(default = "default_nats_batch_wait_secs")]
    pub nats_batch_wait_secs: u64,

    /// What to do with payloads that fail to decode: "ack" or "dead_letter"
    #[serde(default = "default_malformed_policy")]
    pub malformed_policy: String,

    /// Subject malformed payloads are published to under the dead-letter policy
    #[serde(default = "default_dead_letter_subject")]
    pub dead_letter_subject: String,

    // PostgreSQL configuration
    /// PostgreSQL host
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    /// PostgreSQL port
    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    /// PostgreSQL database name
    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    /// PostgreSQL username
    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    /// PostgreSQL password
    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    /// Maximum number of pooled connections
    #[serde(default = "default_postgres_max_pool_size")]
    pub postgres_max_pool_size: usize,

    /// Per-statement timeout in milliseconds
    #[serde(default = "default_postgres_statement_timeout_ms")]
    pub postgres_statement_timeout_ms: u64,

    // HTTP configuration
    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Tenant used when a request carries no x-tenant-id header
    #[serde(default = "default_tenant")]
    pub default_tenant: String,

    // Demo producer
    /// Publish sample messages onto the intake subject (local runs)
    #[serde(default)]
    pub demo_producer_enabled: bool,

    /// Demo producer publish interval in milliseconds
    #[serde(default = "default_demo_producer_interval_ms")]
    pub demo_producer_interval_ms: u64,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::default())
            .build()?
            .try_deserialize()
    }

    pub fn queue(&self) -> QueueConfig {
        QueueConfig {
            url: self.nats_url.clone(),
            stream: self.queue_stream.clone(),
            subject: self.queue_subject.clone(),
            max_connect_attempts: self.connect_max_attempts,
            connect_retry_delay: Duration::from_secs(self.connect_retry_delay_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    pub fn postgres(&self) -> PostgresConfig {
        PostgresConfig {
            host: self.postgres_host.clone(),
            port: self.postgres_port,
            database: self.postgres_database.clone(),
            username: self.postgres_username.clone(),
            password: self.postgres_password.clone(),
            max_pool_size: self.postgres_max_pool_size,
            statement_timeout_ms: self.postgres_statement_timeout_ms,
        }
    }
}

// Manual Debug so the startup config echo never prints the database
// password.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("log_level", &self.log_level)
            .field("nats_url", &self.nats_url)
            .field("queue_stream", &self.queue_stream)
            .field("queue_subject", &self.queue_subject)
            .field("consumer_name", &self.consumer_name)
            .field("connect_max_attempts", &self.connect_max_attempts)
            .field("connect_retry_delay_secs", &self.connect_retry_delay_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("nats_batch_size", &self.nats_batch_size)
            .field("nats_batch_wait_secs", &self.nats_batch_wait_secs)
            .field("malformed_policy", &self.malformed_policy)
            .field("dead_letter_subject", &self.dead_letter_subject)
            .field("postgres_host", &self.postgres_host)
            .field("postgres_port", &self.postgres_port)
            .field("postgres_database", &self.postgres_database)
            .field("postgres_username", &self.postgres_username)
            .field("postgres_password", &"<redacted>")
            .field("postgres_max_pool_size", &self.postgres_max_pool_size)
            .field(
                "postgres_statement_timeout_ms",
                &self.postgres_statement_timeout_ms,
            )
            .field("http_host", &self.http_host)
            .field("http_port", &self.http_port)
            .field("default_tenant", &self.default_tenant)
            .field("demo_producer_enabled", &self.demo_producer_enabled)
            .field(
                "demo_producer_interval_ms",
                &self.demo_producer_interval_ms,
            )
            .finish()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_queue_stream() -> String {
    "datetime_queue".to_string()
}

fn default_queue_subject() -> String {
    "datetime_queue.events".to_string()
}

fn default_consumer_name() -> String {
    "chronolog-intake".to_string()
}

fn default_connect_max_attempts() -> u32 {
    10
}

fn default_connect_retry_delay_secs() -> u64 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_nats_batch_size() -> usize {
    100
}

fn default_nats_batch_wait_secs() -> u64 {
    5
}

fn default_malformed_policy() -> String {
    "ack".to_string()
}

fn default_dead_letter_subject() -> String {
    "datetime_queue.dead_letter".to_string()
}

fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "chronolog".to_string()
}

fn default_postgres_username() -> String {
    "chronolog".to_string()
}

fn default_postgres_password() -> String {
    "chronolog".to_string()
}

fn default_postgres_max_pool_size() -> usize {
    10
}

fn default_postgres_statement_timeout_ms() -> u64 {
    10_000
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_tenant() -> String {
    "default-tenant".to_string()
}

fn default_demo_producer_interval_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_postgres_password() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"postgres_password": "s3cret-value"}"#).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret-value"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("postgres_username"));
    }
}
