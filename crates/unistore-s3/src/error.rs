//! Conversion of S3 failures into [`unistore_core::Error`].
//!
//! HTTP statuses are classified into an [`ErrorKind`] and the response body
//! is kept on the error for diagnostics.

use std::io::Read;

use bytes::Bytes;
use http::{Response, StatusCode};
use unistore_auth::AuthError;
use unistore_core::{Error, ErrorKind, Operation};
use unistore_s3_xml::{ErrorDocument, XmlError, from_xml};

use crate::config::ConfigError;
use crate::transport::{HttpBody, TransportError};

/// Largest error body kept on an error.
const MAX_ERROR_BODY: u64 = 64 * 1024;

/// Map an unexpected HTTP status to an error kind.
#[must_use]
pub fn classify_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::FORBIDDEN => ErrorKind::PermissionDenied,
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => ErrorKind::Interrupted,
        _ => ErrorKind::Other,
    }
}

/// Map the `<Error><Code>` of a document returned with a success status to
/// an error kind. Only throttling and server faults are retryable.
#[must_use]
pub fn classify_code(code: &str) -> ErrorKind {
    match code {
        "InternalError" | "SlowDown" | "ServiceUnavailable" => ErrorKind::Interrupted,
        _ => ErrorKind::Other,
    }
}

/// Build the error of a response with an unexpected status, consuming its body.
pub(crate) fn parse_error(op: Operation, path: &str, resp: Response<HttpBody>) -> Error {
    let status = resp.status();
    let mut body = Vec::new();
    // A body that cannot be read is dropped; the status still classifies.
    let _ = resp.into_body().take(MAX_ERROR_BODY).read_to_end(&mut body);

    let message = match from_xml::<ErrorDocument>(&body) {
        Ok(doc) if !doc.code.is_empty() => {
            format!("unexpected status {status}: {} ({})", doc.message, doc.code)
        }
        _ => format!("unexpected status {status}"),
    };
    Error::new(classify_status(status), message)
        .with_operation(op)
        .with_path(path)
        .with_body(Bytes::from(body))
}

/// Build the error of an `<Error>` document returned with a success status.
pub(crate) fn error_document(op: Operation, path: &str, body: Bytes) -> Error {
    match from_xml::<ErrorDocument>(&body) {
        Ok(doc) => Error::new(classify_code(&doc.code), format!("{}: {}", doc.code, doc.message))
            .with_operation(op)
            .with_path(path)
            .with_body(body),
        Err(err) => xml_error(op, path, err).with_body(body),
    }
}

pub(crate) fn transport_error(op: Operation, path: &str, err: TransportError) -> Error {
    let kind = if err.is_transient() {
        ErrorKind::Interrupted
    } else {
        ErrorKind::Other
    };
    Error::new(kind, "request failed")
        .with_operation(op)
        .with_path(path)
        .with_source(err)
}

pub(crate) fn auth_error(op: Operation, path: &str, err: AuthError) -> Error {
    Error::new(ErrorKind::Other, "cannot sign request")
        .with_operation(op)
        .with_path(path)
        .with_source(err)
}

pub(crate) fn xml_error(op: Operation, path: &str, err: XmlError) -> Error {
    Error::new(ErrorKind::Other, "malformed response body")
        .with_operation(op)
        .with_path(path)
        .with_source(err)
}

pub(crate) fn build_error(op: Operation, path: &str, err: http::Error) -> Error {
    Error::new(ErrorKind::Other, "cannot build request")
        .with_operation(op)
        .with_path(path)
        .with_source(err)
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::new(ErrorKind::Other, "invalid s3 configuration").with_source(err)
    }
}
