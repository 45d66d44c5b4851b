use async_trait::async_trait;

use crate::error::DomainResult;
use crate::message::{MessageRecord, NewMessage, TenantStats};
use crate::tenant::TenantNamespace;

/// Owns namespace lifecycle: idempotent create-if-absent of a tenant's
/// schema and record table. Infrastructure (chronolog-postgres) implements
/// this trait.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TenantProvisioner: Send + Sync {
    /// Ensures the namespace and its messages table exist.
    ///
    /// Safe to call concurrently and repeatedly; errors are not retried.
    async fn ensure_tenant_storage(&self, namespace: &TenantNamespace) -> DomainResult<()>;
}

/// Owns row lifecycle within an existing tenant namespace.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Inserts a message; `id` and `created_at` are assigned by storage.
    async fn insert_message(
        &self,
        namespace: &TenantNamespace,
        message: NewMessage,
    ) -> DomainResult<MessageRecord>;

    /// Returns up to `limit` records for the environment, newest first.
    /// An absent namespace is a valid "no data yet" state: empty, not an error.
    async fn query_messages(
        &self,
        namespace: &TenantNamespace,
        environment: &str,
        limit: i64,
    ) -> DomainResult<Vec<MessageRecord>>;

    /// Aggregate counts and the most recent `created_at`.
    /// An absent namespace yields the zero-valued stats, consistent with
    /// `query_messages`.
    async fn aggregate_stats(&self, namespace: &TenantNamespace) -> DomainResult<TenantStats>;
}
