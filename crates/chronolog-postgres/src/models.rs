use chrono::{DateTime, Utc};
use chronolog_domain::MessageRecord;
use tokio_postgres::Row;

/// Row shape of `<namespace>.messages`
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub datetime: DateTime<Utc>,
    pub environment: String,
    pub created_at: DateTime<Utc>,
}

impl MessageRow {
    /// Expects columns in order: id, datetime, environment, created_at
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: row.get(0),
            datetime: row.get(1),
            environment: row.get(2),
            created_at: row.get(3),
        }
    }
}

impl From<MessageRow> for MessageRecord {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            datetime: row.datetime,
            environment: row.environment,
            created_at: row.created_at,
        }
    }
}
