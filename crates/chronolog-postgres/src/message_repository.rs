use async_trait::async_trait;
use chronolog_domain::{
    DomainError, DomainResult, MessageRecord, MessageRepository, NewMessage, TenantNamespace,
    TenantStats,
};
use tracing::debug;

use crate::client::PostgresClient;
use crate::models::MessageRow;

/// PostgreSQL implementation of the MessageRepository trait
#[derive(Clone)]
pub struct PostgresMessageRepository {
    client: PostgresClient,
}

impl PostgresMessageRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }

    async fn schema_exists(
        &self,
        conn: &deadpool_postgres::Client,
        namespace: &TenantNamespace,
    ) -> DomainResult<bool> {
        let row = conn
            .query_one(
                "SELECT EXISTS (
                    SELECT 1 FROM information_schema.schemata
                    WHERE schema_name = $1
                )",
                &[&namespace.as_str()],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;
        Ok(row.get(0))
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn insert_message(
        &self,
        namespace: &TenantNamespace,
        message: NewMessage,
    ) -> DomainResult<MessageRecord> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_one(
                format!(
                    "INSERT INTO {namespace}.messages (datetime, environment)
                     VALUES ($1, $2)
                     RETURNING id, datetime, environment, created_at"
                )
                .as_str(),
                &[&message.datetime, &message.environment],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let record: MessageRecord = MessageRow::from_row(&row).into();
        debug!(
            namespace = %namespace,
            message_id = record.id,
            environment = %record.environment,
            "Message stored"
        );
        Ok(record)
    }

    async fn query_messages(
        &self,
        namespace: &TenantNamespace,
        environment: &str,
        limit: i64,
    ) -> DomainResult<Vec<MessageRecord>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        // Absence of a tenant is a valid "no data yet" state
        if !self.schema_exists(&conn, namespace).await? {
            return Ok(Vec::new());
        }

        let rows = conn
            .query(
                format!(
                    "SELECT id, datetime, environment, created_at
                     FROM {namespace}.messages
                     WHERE environment = $1
                     ORDER BY created_at DESC, id DESC
                     LIMIT $2"
                )
                .as_str(),
                &[&environment, &limit],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        debug!(
            namespace = %namespace,
            environment = %environment,
            count = rows.len(),
            "Messages retrieved"
        );

        Ok(rows
            .iter()
            .map(|row| MessageRow::from_row(row).into())
            .collect())
    }

    async fn aggregate_stats(&self, namespace: &TenantNamespace) -> DomainResult<TenantStats> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        // Same absent-namespace policy as query_messages: zero-valued
        // stats, never a fault.
        if !self.schema_exists(&conn, namespace).await? {
            return Ok(TenantStats::empty());
        }

        let row = conn
            .query_one(
                format!(
                    "SELECT
                        COUNT(*) AS total_messages,
                        COUNT(*) FILTER (WHERE environment = 'prod') AS prod_messages,
                        COUNT(*) FILTER (WHERE environment = 'test') AS test_messages,
                        MAX(created_at) AS last_message
                     FROM {namespace}.messages"
                )
                .as_str(),
                &[],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(TenantStats {
            total_messages: row.get(0),
            prod_messages: row.get(1),
            test_messages: row.get(2),
            last_message: row.get(3),
        })
    }
}
