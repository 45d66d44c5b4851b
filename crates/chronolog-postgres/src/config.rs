use serde::{Deserialize, Serialize};

/// PostgreSQL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_pool_size: usize,
    /// Per-statement timeout applied to every pooled connection; closes the
    /// original design's missing-timeout gap.
    pub statement_timeout_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "chronolog".to_string(),
            username: "chronolog".to_string(),
            password: "chronolog".to_string(),
            max_pool_size: 10,
            statement_timeout_ms: 10_000,
        }
    }
}
