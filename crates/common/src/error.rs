//! Per-request error types shared across crates.

use http::Version;
use thiserror::Error;

/// Errors surfaced to a caller as an HTTP status.
///
/// Variants map to HTTP status codes:
/// - [`ServiceError::ProtocolMismatch`] → 505
/// - [`ServiceError::NotFound`] → 404
///
/// None of them affect the connection: the next request on it is served normally.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request arrived over a protocol version the route does not accept.
    #[error("Only HTTP/{expected} is supported")]
    ProtocolMismatch { expected: u8, actual: Version },

    /// No route is registered for the path.
    #[error("no route for {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::ProtocolMismatch { .. } => 505,
            ServiceError::NotFound(_) => 404,
        }
    }
}

/// Major version of a negotiated HTTP protocol, `None` for versions the
/// `http` crate may add later.
pub fn major_version(version: Version) -> Option<u8> {
    match version {
        Version::HTTP_09 => Some(0),
        Version::HTTP_10 | Version::HTTP_11 => Some(1),
        Version::HTTP_2 => Some(2),
        Version::HTTP_3 => Some(3),
        _ => None,
    }
}

/// Check that a request was negotiated at exactly `expected`.
///
/// # Errors
///
/// Returns [`ServiceError::ProtocolMismatch`] for any other version.
pub fn require_major_version(actual: Version, expected: u8) -> Result<(), ServiceError> {
    if major_version(actual) == Some(expected) {
        Ok(())
    } else {
        Err(ServiceError::ProtocolMismatch { expected, actual })
    }
}
