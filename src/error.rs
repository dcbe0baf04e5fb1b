//! Error types for the provisioning harness

use std::fmt;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the provisioning harness
#[derive(Debug)]
pub enum Error {
    /// Transport-level failure (connect, timeout, body read)
    Transport(reqwest::Error),
    /// Server answered 404 for the given path
    NotFound { path: String },
    /// Server answered with any other non-success status
    Http {
        status: u16,
        path: String,
        body: String,
    },
    /// JSON encode/decode errors
    Serialization(String),
    /// Configuration errors
    Config(String),
    /// Fixture invariant violated during setup
    Fixture(String),
    /// Scenario check failed
    Assertion {
        what: String,
        expected: String,
        actual: String,
    },
}

impl Error {
    /// True when the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound { .. } => Some(404),
            Error::Http { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn assertion(
        what: impl Into<String>,
        expected: impl fmt::Debug,
        actual: impl fmt::Debug,
    ) -> Self {
        Error::Assertion {
            what: what.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::NotFound { path } => write!(f, "Not found: {}", path),
            Error::Http { status, path, body } => {
                write!(f, "HTTP {} from {}: {}", status, path, body)
            }
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Fixture(msg) => write!(f, "Fixture error: {}", msg),
            Error::Assertion {
                what,
                expected,
                actual,
            } => write!(
                f,
                "Assertion failed on {}: expected {}, got {}",
                what, expected, actual
            ),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Serialization(e.to_string())
        } else {
            Error::Transport(e)
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
