//! Error types for manifest loading and advisory transport.
//!
//! Everything above these two boundaries uses `anyhow`.

/// Failure to read or parse a manifest document.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest is empty")]
    Empty,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("manifest root must be a JSON object")]
    NotAnObject,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Failure to complete an HTTP round trip to the advisory source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request was cancelled or exceeded its deadline.
    #[error("request timed out")]
    Timeout,

    /// The request could not be sent (DNS, connect, TLS, ...).
    #[error("{0}")]
    Request(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() || err.is_request() {
            TransportError::Request(error_chain(&err))
        } else {
            TransportError::Other(error_chain(&err))
        }
    }
}

/// Joins an error and all of its sources, outermost first.
///
/// reqwest's own `Display` stops at "error sending request for url (...)";
/// the cause (refused connection, DNS failure, TLS) lives further down.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
