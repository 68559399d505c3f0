//! Query parameters of presigned URLs.
//!
//! Presigned URLs carry authentication in the query string instead of an
//! `Authorization` header:
//!
//! - `X-Amz-Algorithm` - Always `AWS4-HMAC-SHA256`
//! - `X-Amz-Credential` - `AKID/date/region/service/aws4_request`
//! - `X-Amz-Date` - ISO 8601 basic format timestamp (`YYYYMMDDTHHMMSSZ`)
//! - `X-Amz-Expires` - Validity duration in seconds
//! - `X-Amz-SignedHeaders` - Semicolon-separated signed header names
//! - `X-Amz-Security-Token` - Session token, only for temporary credentials
//! - `X-Amz-Signature` - The hex-encoded signature, appended last
//!
//! The payload hash of a presigned request is always `UNSIGNED-PAYLOAD`.

use crate::canonical::uri_encode;
use crate::sigv4::ALGORITHM;

/// The payload hash value used for presigned and unsigned-payload requests.
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// The longest validity a presigned URL may have: seven days.
pub const MAX_EXPIRES_SECS: u64 = 604_800;

/// Build the presign query string, without the signature.
///
/// # Examples
///
/// ```
/// use unistore_auth::presign::build_presign_query;
///
/// let query = build_presign_query("AKID/20130524/us-east-1/s3/aws4_request", "20130524T000000Z", 60, "host", None);
/// assert!(query.starts_with("X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Credential=AKID%2F20130524"));
/// assert!(query.ends_with("X-Amz-SignedHeaders=host"));
/// ```
#[must_use]
pub fn build_presign_query(
    credential: &str,
    timestamp: &str,
    expires_secs: u64,
    signed_headers: &str,
    session_token: Option<&str>,
) -> String {
    let mut params = vec![
        ("X-Amz-Algorithm", ALGORITHM.to_owned()),
        ("X-Amz-Credential", uri_encode(credential)),
        ("X-Amz-Date", timestamp.to_owned()),
        ("X-Amz-Expires", expires_secs.to_string()),
    ];
    if let Some(token) = session_token {
        params.push(("X-Amz-Security-Token", uri_encode(token)));
    }
    params.push(("X-Amz-SignedHeaders", uri_encode(signed_headers)));

    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_encode_session_token_and_signed_headers() {
        let query = build_presign_query(
            "AKID/20240101/eu-west-1/s3/aws4_request",
            "20240101T000000Z",
            3600,
            "host;x-amz-server-side-encryption-customer-key",
            Some("a+b/c="),
        );
        assert!(query.contains("X-Amz-Expires=3600"));
        assert!(query.contains("X-Amz-Security-Token=a%2Bb%2Fc%3D"));
        assert!(query.contains(
            "X-Amz-SignedHeaders=host%3Bx-amz-server-side-encryption-customer-key"
        ));
    }
}
