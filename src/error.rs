use thiserror::Error;

/// Coarse classification of a failed generation, used by callers to pick a
/// status code or a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Unconfigured,
    Unreachable,
    UpstreamFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Unconfigured => "unconfigured",
            ErrorKind::Unreachable => "unreachable",
            ErrorKind::UpstreamFailure => "upstream_failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Nothing was sent; the request itself is unusable.
    #[error("{0}")]
    InvalidInput(String),
    /// A cloud model was requested but no credential is configured.
    #[error("{0}")]
    Unconfigured(String),
    /// No response was received from the backend.
    #[error("{0}")]
    Unreachable(String),
    /// The backend answered with an error status or a body we could not use.
    #[error("{0}")]
    UpstreamFailure(String),
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::InvalidInput(_) => ErrorKind::InvalidInput,
            BackendError::Unconfigured(_) => ErrorKind::Unconfigured,
            BackendError::Unreachable(_) => ErrorKind::Unreachable,
            BackendError::UpstreamFailure(_) => ErrorKind::UpstreamFailure,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BackendError::InvalidInput(m)
            | BackendError::Unconfigured(m)
            | BackendError::Unreachable(m)
            | BackendError::UpstreamFailure(m) => m,
        }
    }

    /// Classify a `reqwest` failure. Timeouts are unreachable even when they fire
    /// mid-body; otherwise a body we failed to read or decode is the upstream's
    /// fault and anything before a response arrived is unreachable.
    pub fn from_transport(backend: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Unreachable(format!("{backend}: request timed out: {err}"))
        } else if err.is_decode() || err.is_body() {
            BackendError::UpstreamFailure(format!("{backend}: unreadable response: {err}"))
        } else if err.is_connect() {
            BackendError::Unreachable(format!("{backend}: connection failed: {err}"))
        } else {
            BackendError::Unreachable(format!("{backend}: request failed: {err}"))
        }
    }
}
