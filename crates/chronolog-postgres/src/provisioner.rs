use async_trait::async_trait;
use chronolog_domain::{DomainError, DomainResult, TenantNamespace, TenantProvisioner};
use tracing::debug;

use crate::client::PostgresClient;

/// Lazily creates a tenant's schema and messages table.
///
/// Both statements use CREATE-IF-NOT-EXISTS semantics; correctness under
/// concurrent provisioning relies on Postgres's idempotent-create
/// guarantee, with no application-level locking.
#[derive(Clone)]
pub struct PostgresTenantProvisioner {
    client: PostgresClient,
}

impl PostgresTenantProvisioner {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TenantProvisioner for PostgresTenantProvisioner {
    async fn ensure_tenant_storage(&self, namespace: &TenantNamespace) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        // Identifiers cannot be bound as parameters; TenantNamespace is
        // restricted to [a-z0-9_] so interpolation is safe here.
        conn.execute(
            format!("CREATE SCHEMA IF NOT EXISTS {namespace}").as_str(),
            &[],
        )
        .await
        .map_err(|e| DomainError::ProvisioningError(e.to_string()))?;

        conn.execute(
            format!(
                "CREATE TABLE IF NOT EXISTS {namespace}.messages (
                    id BIGSERIAL PRIMARY KEY,
                    datetime TIMESTAMPTZ NOT NULL,
                    environment VARCHAR(16) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )"
            )
            .as_str(),
            &[],
        )
        .await
        .map_err(|e| DomainError::ProvisioningError(e.to_string()))?;

        debug!(namespace = %namespace, "Tenant storage ensured");
        Ok(())
    }
}
