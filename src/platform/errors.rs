use thiserror::Error;

/// Errors surfaced by the platform API boundary.
///
/// Remote failure messages are carried verbatim; flows display them without
/// rewording so the platform's own wording reaches the user.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success HTTP status; `message` is extracted from the response body
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The platform answered 200 but reported the operation unsuccessful
    #[error("{0}")]
    Rejected(String),

    /// Transport or decoding failure
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// Whether the failure message indicates an identifier collision.
    /// Duplicate detection is by message-content inspection; the platform
    /// does not expose a structured conflict code.
    pub fn is_conflict(&self) -> bool {
        let message = self.to_string().to_lowercase();
        message.contains("already exists") || message.contains("duplicate")
    }
}
