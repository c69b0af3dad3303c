use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while talking to the remote similarity service
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Service unavailable: {message} (retries: {retries})")]
    NetworkUnavailable { message: String, retries: u32 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Request rejected: {status} - {message}")]
    RemoteRejected { status: u16, message: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CollaboratorError {
    /// Whether the failure happened at the transport level (no usable response).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CollaboratorError::NetworkUnavailable { .. }
                | CollaboratorError::Timeout { .. }
                | CollaboratorError::Http(_)
        )
    }

    /// Whether a retry of the same idempotent request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CollaboratorError::RemoteRejected { status, .. } => *status >= 500 || *status == 429,
            CollaboratorError::MalformedResponse { .. } | CollaboratorError::NotFound { .. } => {
                false
            }
            _ => self.is_network(),
        }
    }
}

/// Errors raised by the aggregation and review logic
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReviewError {
    #[error("Degenerate input: {message}")]
    DegenerateInput { message: String },

    #[error("Similarity out of range [0, 100]: {value}")]
    InvalidSimilarity { value: f64 },

    #[error("Unknown session: {session_id}")]
    UnknownSession { session_id: String },

    #[error("Unknown document: {file_name}")]
    UnknownDocument { file_name: String },

    #[error("Invalid transition: {message}")]
    InvalidTransition { message: String },

    #[error("Validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for collaborator operations
pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Result type alias for review logic
pub type ReviewResult<T> = Result<T, ReviewError>;
