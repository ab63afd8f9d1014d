use thiserror::Error;

/// Maximum number of characters of an error response body kept in the error.
pub const ERROR_BODY_LIMIT: usize = 300;

/// Errors from the completion endpoint.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The request never produced an HTTP response (connect failure,
    /// timeout, broken transport).
    #[error("completion request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status. The body is truncated
    /// to [`ERROR_BODY_LIMIT`] characters.
    #[error("completion endpoint returned {status}: {body}")]
    Http { status: u16, body: String },
}

impl CompletionError {
    /// Build an `Http` error, truncating the body on a char boundary.
    pub fn http(status: u16, body: &str) -> Self {
        let body = match body.char_indices().nth(ERROR_BODY_LIMIT) {
            Some((idx, _)) => body[..idx].to_string(),
            None => body.to_string(),
        };
        Self::Http { status, body }
    }
}

/// Errors from durable state storage.
#[derive(Debug, Error)]
pub enum StateError {
    /// The storage backend cannot be used at all (e.g. the data directory
    /// cannot be created in a restricted context).
    #[error("state storage unavailable: {0}")]
    Unavailable(String),

    /// A single read or write operation failed.
    #[error("state io error: {0}")]
    Io(String),
}
