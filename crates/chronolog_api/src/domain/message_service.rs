use std::sync::Arc;

use chronolog_domain::{
    validate_environment, DomainResult, MessageRecord, MessageRepository, NewMessage,
    TenantNamespace, TenantProvisioner, TenantStats, DEFAULT_ENVIRONMENT,
};
use tracing::info;

const DEFAULT_QUERY_LIMIT: i64 = 100;
const MAX_QUERY_LIMIT: i64 = 1000;

/// Orchestrates the per-tenant message protocol: validate input, lazily
/// provision the tenant's namespace, then defer row operations to the
/// repository.
pub struct MessageService {
    provisioner: Arc<dyn TenantProvisioner>,
    repository: Arc<dyn MessageRepository>,
}

impl MessageService {
    pub fn new(
        provisioner: Arc<dyn TenantProvisioner>,
        repository: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            provisioner,
            repository,
        }
    }

    /// Validates, provisions storage if needed, and persists one message.
    pub async fn store_message(
        &self,
        tenant_id: &str,
        datetime: Option<&str>,
        environment: Option<&str>,
    ) -> DomainResult<MessageRecord> {
        let namespace = TenantNamespace::derive(tenant_id)?;
        let message = NewMessage::parse(datetime, environment)?;

        self.provisioner.ensure_tenant_storage(&namespace).await?;
        let record = self.repository.insert_message(&namespace, message).await?;

        info!(
            tenant_id,
            message_id = record.id,
            environment = %record.environment,
            "Message stored for tenant"
        );
        Ok(record)
    }

    /// Lists a tenant's messages, newest first. Unknown tenants yield an
    /// empty list.
    pub async fn list_messages(
        &self,
        tenant_id: &str,
        environment: Option<&str>,
        limit: Option<i64>,
    ) -> DomainResult<Vec<MessageRecord>> {
        let namespace = TenantNamespace::derive(tenant_id)?;
        let environment = match environment {
            Some(env) => validate_environment(env)?,
            None => DEFAULT_ENVIRONMENT.to_string(),
        };
        let limit = limit.unwrap_or(DEFAULT_QUERY_LIMIT).clamp(1, MAX_QUERY_LIMIT);

        self.repository
            .query_messages(&namespace, &environment, limit)
            .await
    }

    /// Aggregate statistics for a tenant; unknown tenants yield the
    /// zero-valued stats.
    pub async fn tenant_stats(&self, tenant_id: &str) -> DomainResult<TenantStats> {
        let namespace = TenantNamespace::derive(tenant_id)?;
        self.repository.aggregate_stats(&namespace).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronolog_domain::{DomainError, MockMessageRepository, MockTenantProvisioner};

    fn record_from(message: &NewMessage) -> MessageRecord {
        MessageRecord {
            id: 1,
            datetime: message.datetime,
            environment: message.environment.clone(),
            created_at: message.datetime,
        }
    }

    #[tokio::test]
    async fn store_provisions_before_inserting() {
        let mut provisioner = MockTenantProvisioner::new();
        provisioner
            .expect_ensure_tenant_storage()
            .times(1)
            .returning(|_| Ok(()));

        let mut repository = MockMessageRepository::new();
        repository
            .expect_insert_message()
            .times(1)
            .returning(|_, message| Ok(record_from(&message)));

        let service = MessageService::new(Arc::new(provisioner), Arc::new(repository));
        let record = service
            .store_message("acme-1", Some("2024-01-01T00:00:00Z"), None)
            .await
            .unwrap();

        assert_eq!(record.environment, DEFAULT_ENVIRONMENT);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_storage() {
        let mut provisioner = MockTenantProvisioner::new();
        provisioner.expect_ensure_tenant_storage().times(0);
        let mut repository = MockMessageRepository::new();
        repository.expect_insert_message().times(0);

        let service = MessageService::new(Arc::new(provisioner), Arc::new(repository));

        let missing = service.store_message("acme-1", None, None).await;
        assert!(matches!(missing, Err(DomainError::MissingDatetime)));

        let bad_env = service
            .store_message("acme-1", Some("2024-01-01T00:00:00Z"), Some("not valid!"))
            .await;
        assert!(matches!(bad_env, Err(DomainError::InvalidEnvironment(_))));
    }

    #[tokio::test]
    async fn list_defaults_and_clamps_the_limit() {
        let provisioner = MockTenantProvisioner::new();
        let mut repository = MockMessageRepository::new();
        repository
            .expect_query_messages()
            .withf(|_, environment, limit| environment == "prod" && *limit == 100)
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        repository
            .expect_query_messages()
            .withf(|_, _, limit| *limit == 1000)
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));

        let service = MessageService::new(Arc::new(provisioner), Arc::new(repository));
        service.list_messages("acme-1", None, None).await.unwrap();
        service
            .list_messages("acme-1", Some("prod"), Some(50_000))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn stats_pass_through_for_valid_tenants() {
        let provisioner = MockTenantProvisioner::new();
        let mut repository = MockMessageRepository::new();
        repository
            .expect_aggregate_stats()
            .times(1)
            .returning(|_| Ok(TenantStats::empty()));

        let service = MessageService::new(Arc::new(provisioner), Arc::new(repository));
        let stats = service.tenant_stats("acme-1").await.unwrap();
        assert_eq!(stats, TenantStats::empty());

        let invalid = service.tenant_stats("  ").await;
        assert!(matches!(invalid, Err(DomainError::InvalidTenantId(_))));
    }
}
