use thiserror::Error;

/// Terminal outcomes of the queue connector.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("queue connection failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("queue connection cancelled during retry backoff")]
    Cancelled,
}
