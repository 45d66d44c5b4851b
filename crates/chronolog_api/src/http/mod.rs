mod error;
mod handlers;
mod router;

pub use handlers::{AppState, TENANT_HEADER};
pub use router::build_router;
