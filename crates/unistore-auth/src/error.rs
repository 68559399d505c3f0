//! Error types for SigV4 signing.
//!
//! All signing failures are represented by [`AuthError`].

/// Errors that can occur while signing or presigning a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request URI has no authority to derive the `host` header from.
    #[error("Request URI has no host: {0}")]
    MissingHost(String),

    /// A header value is not visible ASCII and cannot be canonicalized.
    #[error("Header {0} has a non-ASCII value")]
    InvalidHeaderValue(String),

    /// A computed header value could not be stored on the request.
    #[error("Invalid computed header value for {0}")]
    InvalidComputedHeader(&'static str),

    /// The presigned URI could not be rebuilt.
    #[error("Invalid presigned URI: {0}")]
    InvalidUri(String),

    /// The presign expiry is outside the 1 second to 7 days window.
    #[error("Presign expiry must be between 1 and 604800 seconds, got {0}")]
    InvalidExpiry(u64),
}
