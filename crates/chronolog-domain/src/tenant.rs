use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::{DomainError, DomainResult};

const NAMESPACE_PREFIX: &str = "tenant_";
const HASH_SUFFIX_LEN: usize = 8;
// Keeps prefix + base + '_' + suffix well under Postgres's 63-byte
// identifier limit.
const MAX_SANITIZED_LEN: usize = 40;

/// An isolated storage namespace (Postgres schema name) for one tenant.
///
/// Derivation is deterministic and injection-safe: the tenant id is
/// lowercased and mapped onto `[a-z0-9_]`, then a fixed-length SHA-256
/// suffix of the original id is appended so that tenants differing only in
/// disallowed characters never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantNamespace(String);

impl TenantNamespace {
    pub fn derive(tenant_id: &str) -> DomainResult<Self> {
        let tenant_id = tenant_id.trim();
        if tenant_id.is_empty() {
            return Err(DomainError::InvalidTenantId(
                "tenant id must be non-empty".to_string(),
            ));
        }

        let sanitized: String = tenant_id
            .chars()
            .map(|c| match c.to_ascii_lowercase() {
                c @ ('a'..='z' | '0'..='9' | '_') => c,
                _ => '_',
            })
            .take(MAX_SANITIZED_LEN)
            .collect();

        let digest = Sha256::digest(tenant_id.as_bytes());
        let suffix = &hex::encode(digest)[..HASH_SUFFIX_LEN];

        Ok(Self(format!("{NAMESPACE_PREFIX}{sanitized}_{suffix}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
