use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl NetError {
    /// Truncate a response body to avoid dragging large payloads into logs
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Classify a failing HTTP status into an error, quoting a truncated
    /// body. Used at install time, where a non-success manifest fetch is
    /// fatal to the new version.
    pub fn from_status(status: u16, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status {
            401 => NetError::Unauthorized,
            403 => NetError::AccessDenied(truncated),
            404 => NetError::NotFound(truncated),
            429 => NetError::RateLimited,
            500..=599 => NetError::ServerError(truncated),
            _ => NetError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}
