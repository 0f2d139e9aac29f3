//! Routing engine error types.

/// Errors from calls to the routing engine.
///
/// Every variant renders as "routing engine error: ..." followed by the
/// underlying cause.
#[derive(Debug, thiserror::Error)]
pub enum ValhallaError {
    /// No complete response within the configured timeout
    #[error("routing engine error: request timed out ({0})")]
    Timeout(#[source] reqwest::Error),

    /// Connection failure or other transport error
    #[error("routing engine error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The engine answered with a non-success status
    #[error("routing engine error: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The client could not be built or is shutting down
    #[error("routing engine error: {0}")]
    Client(String),
}

impl ValhallaError {
    /// Whether the call failed because it ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ValhallaError::Timeout(_))
    }
}

impl From<reqwest::Error> for ValhallaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ValhallaError::Timeout(err)
        } else {
            ValhallaError::Transport(err)
        }
    }
}
