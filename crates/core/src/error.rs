//! Transport error model.

use thiserror::Error;

/// Result type returned by every call that crosses the HTTP boundary.
pub type ApiResult<T> = Result<T, ApiError>;

/// How the client reacts to a failed request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials are no longer accepted. The session is torn down, no retry.
    SessionFatal,
    /// The request failed for another reason. Cached state is kept and the
    /// user re-triggers the action manually.
    Transient,
    /// The server could not be reached or is down. Reported globally.
    Connectivity,
}

/// Failure of a request made through the transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// HTTP 401.
    #[error("unauthorized")]
    Unauthorized,

    /// Network unreachable, timed out, or a gateway-class status (>= 502).
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            s if s >= 502 => Self::Connectivity(format!("server returned {s}")),
            s => Self::Status {
                status: s,
                message: message.into(),
            },
        }
    }

    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::SessionFatal,
            Self::Connectivity(_) => ErrorKind::Connectivity,
            Self::Status { .. } | Self::Decode(_) => ErrorKind::Transient,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
