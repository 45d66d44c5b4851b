use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid tenant id: {0}")]
    InvalidTenantId(String),

    #[error("datetime is required")]
    MissingDatetime,

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("Storage provisioning error: {0}")]
    ProvisioningError(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
