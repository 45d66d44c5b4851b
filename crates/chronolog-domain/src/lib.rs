pub mod error;
pub mod event;
pub mod message;
pub mod repository;
pub mod tenant;

pub use error::{DomainError, DomainResult};
pub use event::{BufferedEvent, EventBuffer, QueueMessage};
pub use message::{
    parse_datetime, validate_environment, MessageRecord, NewMessage, TenantStats,
    DEFAULT_ENVIRONMENT,
};
pub use repository::{MessageRepository, TenantProvisioner};
pub use tenant::TenantNamespace;

#[cfg(any(test, feature = "testing"))]
pub use repository::{MockMessageRepository, MockTenantProvisioner};
