mod client;
mod config;
mod message_repository;
mod models;
mod provisioner;

pub use client::PostgresClient;
pub use config::PostgresConfig;
pub use message_repository::PostgresMessageRepository;
pub use models::MessageRow;
pub use provisioner::PostgresTenantProvisioner;
