//! Endpoint normalization and bucket region discovery.

use bytes::Bytes;
use http::{Method, Request, StatusCode};
use tracing::{debug, info};
use unistore_core::{Operation, Result};

use crate::error::{build_error, parse_error, transport_error};
use crate::transport::HttpClient;

/// Region assumed when the service does not report one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Header reporting the region a bucket lives in.
const X_AMZ_BUCKET_REGION: &str = "x-amz-bucket-region";

/// Bring a configured endpoint into `scheme://host[:port]` form.
///
/// An endpoint without a scheme gets `https://`. A virtual-host prefix for
/// `bucket` is stripped, as is any trailing `/`.
///
/// # Examples
///
/// ```
/// use unistore_s3::region::normalize_endpoint;
///
/// assert_eq!(normalize_endpoint("s3.amazonaws.com", "b"), "https://s3.amazonaws.com");
/// assert_eq!(
///     normalize_endpoint("https://b.s3.us-west-2.amazonaws.com/", "b"),
///     "https://s3.us-west-2.amazonaws.com"
/// );
/// assert_eq!(normalize_endpoint("http://127.0.0.1:9000", "b"), "http://127.0.0.1:9000");
/// ```
#[must_use]
pub fn normalize_endpoint(endpoint: &str, bucket: &str) -> String {
    let endpoint = endpoint.trim();
    let endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_owned()
    } else {
        format!("https://{endpoint}")
    };
    let endpoint = endpoint.replacen(&format!("//{bucket}."), "//", 1);
    endpoint.trim_end_matches('/').to_owned()
}

/// Address `bucket` on a normalized endpoint.
///
/// # Examples
///
/// ```
/// use unistore_s3::region::bucket_endpoint;
///
/// assert_eq!(bucket_endpoint("https://s3.amazonaws.com", "b", false), "https://s3.amazonaws.com/b");
/// assert_eq!(bucket_endpoint("https://s3.amazonaws.com", "b", true), "https://b.s3.amazonaws.com");
/// ```
#[must_use]
pub fn bucket_endpoint(endpoint: &str, bucket: &str, virtual_host: bool) -> String {
    if virtual_host {
        endpoint.replacen("//", &format!("//{bucket}."), 1)
    } else {
        format!("{endpoint}/{bucket}")
    }
}

/// Ask the service which region `bucket` lives in.
///
/// Sends an unsigned `HEAD {endpoint}/{bucket}`. Both 200 and 403 carry the
/// region header; a missing header means [`DEFAULT_REGION`].
///
/// # Errors
///
/// Fails with a `DetectRegionFailed` error on any other status or when the
/// request cannot be sent.
pub fn detect_region(client: &dyn HttpClient, endpoint: &str, bucket: &str) -> Result<String> {
    let op = Operation::DetectRegion;
    let url = format!("{endpoint}/{bucket}");
    let req = Request::builder()
        .method(Method::HEAD)
        .uri(url.as_str())
        .body(Bytes::new())
        .map_err(|e| build_error(op, &url, e))?;

    let resp = client
        .send(req)
        .map_err(|e| transport_error(op, &url, e))?;

    match resp.status() {
        StatusCode::OK | StatusCode::FORBIDDEN => {
            let region = resp
                .headers()
                .get(X_AMZ_BUCKET_REGION)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .unwrap_or(DEFAULT_REGION)
                .to_owned();
            info!(bucket, region = %region, "Detected bucket region");
            Ok(region)
        }
        status => {
            debug!(bucket, %status, "Region detection failed");
            Err(parse_error(op, &url, resp))
        }
    }
}

#[cfg(test)]
mod tests {
    use unistore_core::ErrorKind;

    use super::*;
    use crate::transport::TransportError;
    use crate::transport::mock::{MockClient, Reply};

    #[test]
    fn test_should_add_scheme_and_strip_virtual_host() {
        assert_eq!(
            normalize_endpoint("bucket.s3.amazonaws.com", "bucket"),
            "https://s3.amazonaws.com"
        );
        assert_eq!(
            normalize_endpoint("https://other.s3.amazonaws.com", "bucket"),
            "https://other.s3.amazonaws.com"
        );
    }

    #[test]
    fn test_should_read_region_header() {
        let client =
            MockClient::new([Reply::status(200).with_header("x-amz-bucket-region", "eu-west-1")]);
        let region = detect_region(&client, "https://s3.amazonaws.com", "b").unwrap();
        assert_eq!(region, "eu-west-1");

        let req = client.last_request();
        assert_eq!(req.method(), Method::HEAD);
        assert_eq!(req.uri().to_string(), "https://s3.amazonaws.com/b");
        assert!(!req.headers().contains_key("authorization"));
    }

    #[test]
    fn test_should_accept_forbidden_and_default_region() {
        let client = MockClient::new([
            Reply::status(403).with_header("x-amz-bucket-region", "ap-south-1"),
            Reply::status(200),
        ]);
        assert_eq!(
            detect_region(&client, "https://s3.amazonaws.com", "b").unwrap(),
            "ap-south-1"
        );
        assert_eq!(
            detect_region(&client, "https://s3.amazonaws.com", "b").unwrap(),
            DEFAULT_REGION
        );
    }

    #[test]
    fn test_should_fail_detection_on_other_status() {
        let client = MockClient::new([Reply::status(404), Reply::status(301)]);

        let err = detect_region(&client, "https://s3.amazonaws.com", "b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.failure_name(), Some("DetectRegionFailed"));

        let err = detect_region(&client, "https://s3.amazonaws.com", "b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_should_map_transport_failure() {
        let client = MockClient::new([Reply::Fail(TransportError::Connect("refused".into()))]);
        let err = detect_region(&client, "https://s3.amazonaws.com", "b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Interrupted);
    }
}
