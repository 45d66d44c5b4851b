mod handler;
mod intake_worker;

pub use handler::{EventIntakeHandler, MalformedPolicy};
pub use intake_worker::{IntakeWorker, IntakeWorkerConfig};
