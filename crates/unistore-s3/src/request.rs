//! Request construction and dispatch shared by the S3 backend and lister.
//!
//! Every S3 call goes through three steps: build an `http::Request<Bytes>`
//! addressing the object, sign it, send it through the [`HttpClient`]. The
//! builders here do the first step; [`S3Core::send`] does the other two.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED, RANGE};
use http::request::Builder;
use http::{HeaderMap, Method, Request, Response};
use tracing::debug;
use unistore_auth::Signer;
use unistore_auth::canonical::uri_encode;
use unistore_core::path::{build_abs_path, encode_path};
use unistore_core::{
    Error, ErrorKind, ObjectMetadata, ObjectMode, ObjectPart, Operation, PresignedRequest,
    RangeBounds, Result,
};
use unistore_s3_xml::{CompleteMultipartUpload, CompletedPart, to_xml};

use crate::config::{ConfigError, S3Config};
use crate::error::{auth_error, build_error, transport_error, xml_error};
use crate::transport::{HttpBody, HttpClient};

/// `x-amz-server-side-encryption`.
pub const X_AMZ_SSE: &str = "x-amz-server-side-encryption";
/// `x-amz-server-side-encryption-aws-kms-key-id`.
pub const X_AMZ_SSE_KMS_KEY_ID: &str = "x-amz-server-side-encryption-aws-kms-key-id";
/// `x-amz-server-side-encryption-customer-algorithm`.
pub const X_AMZ_SSE_CUSTOMER_ALGORITHM: &str = "x-amz-server-side-encryption-customer-algorithm";
/// `x-amz-server-side-encryption-customer-key`.
pub const X_AMZ_SSE_CUSTOMER_KEY: &str = "x-amz-server-side-encryption-customer-key";
/// `x-amz-server-side-encryption-customer-key-MD5`, lowercased as on the wire.
pub const X_AMZ_SSE_CUSTOMER_KEY_MD5: &str = "x-amz-server-side-encryption-customer-key-md5";

/// Server side encryption headers, split by the requests they apply to.
#[derive(Debug, Clone, Default)]
struct SseHeaders {
    /// Sent on requests that store data.
    write: Vec<(&'static str, String)>,
    /// Sent on every object request.
    customer: Vec<(&'static str, String)>,
}

impl SseHeaders {
    fn from_config(config: &S3Config) -> Result<Self, ConfigError> {
        let mut headers = Self::default();
        if let Some(v) = &config.server_side_encryption {
            headers.write.push((X_AMZ_SSE, v.clone()));
        }
        if let Some(v) = &config.server_side_encryption_aws_kms_key_id {
            headers.write.push((X_AMZ_SSE_KMS_KEY_ID, v.clone()));
        }
        if let Some(v) = &config.server_side_encryption_customer_algorithm {
            headers.customer.push((X_AMZ_SSE_CUSTOMER_ALGORITHM, v.clone()));
        }
        if let Some(v) = &config.server_side_encryption_customer_key {
            headers.customer.push((X_AMZ_SSE_CUSTOMER_KEY, v.clone()));
        }
        if let Some(v) = config.customer_key_md5()? {
            headers.customer.push((X_AMZ_SSE_CUSTOMER_KEY_MD5, v));
        }
        Ok(headers)
    }

    fn apply(&self, mut builder: Builder, is_write: bool) -> Builder {
        if is_write {
            for (name, value) in &self.write {
                builder = builder.header(*name, value.as_str());
            }
        }
        for (name, value) in &self.customer {
            builder = builder.header(*name, value.as_str());
        }
        builder
    }
}

/// Connection state of one bucket.
#[derive(Debug)]
pub(crate) struct S3Core {
    pub(crate) bucket: String,
    /// Bucket-addressed endpoint, without a trailing `/`.
    pub(crate) endpoint: String,
    pub(crate) root: String,
    pub(crate) region: String,
    signer: Box<dyn Signer>,
    client: Arc<dyn HttpClient>,
    sse: SseHeaders,
}

impl S3Core {
    pub(crate) fn new(
        config: &S3Config,
        endpoint: String,
        root: String,
        region: String,
        signer: Box<dyn Signer>,
        client: Arc<dyn HttpClient>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            bucket: config.bucket.clone(),
            endpoint,
            root,
            region,
            signer,
            client,
            sse: SseHeaders::from_config(config)?,
        })
    }

    /// URL of the object at `path`.
    fn object_url(&self, op: Operation, path: &str) -> Result<String> {
        let abs = build_abs_path(&self.root, path).map_err(|e| e.with_operation(op))?;
        Ok(format!("{}/{}", self.endpoint, encode_path(&abs)))
    }

    /// `GetObject`, limited to `range` when it is not the whole object.
    pub(crate) fn get_object_request(
        &self,
        op: Operation,
        path: &str,
        range: RangeBounds,
    ) -> Result<Request<Bytes>> {
        let url = self.object_url(op, path)?;
        let mut builder = Request::builder().method(Method::GET).uri(url);
        if let Some(value) = range.header_value() {
            builder = builder.header(RANGE, value);
        }
        let builder = self.sse.apply(builder, false);
        finish(op, path, builder, Bytes::new())
    }

    /// `PutObject`. Without a body no `content-length` is set, which is what
    /// a presigned upload needs.
    pub(crate) fn put_object_request(
        &self,
        op: Operation,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Request<Bytes>> {
        let url = self.object_url(op, path)?;
        let mut builder = Request::builder().method(Method::PUT).uri(url);
        if let Some(body) = &body {
            builder = builder.header(CONTENT_LENGTH, body.len());
        }
        let builder = self.sse.apply(builder, true);
        finish(op, path, builder, body.unwrap_or_default())
    }

    pub(crate) fn head_object_request(&self, op: Operation, path: &str) -> Result<Request<Bytes>> {
        let url = self.object_url(op, path)?;
        let builder = self
            .sse
            .apply(Request::builder().method(Method::HEAD).uri(url), false);
        finish(op, path, builder, Bytes::new())
    }

    pub(crate) fn delete_object_request(
        &self,
        op: Operation,
        path: &str,
    ) -> Result<Request<Bytes>> {
        let url = self.object_url(op, path)?;
        let builder = Request::builder().method(Method::DELETE).uri(url);
        finish(op, path, builder, Bytes::new())
    }

    /// One page of `ListObjectsV2` below `path`, split on `/`.
    pub(crate) fn list_objects_request(
        &self,
        op: Operation,
        path: &str,
        continuation_token: Option<&str>,
    ) -> Result<Request<Bytes>> {
        let mut prefix = build_abs_path(&self.root, path).map_err(|e| e.with_operation(op))?;
        // The root maps to a bare prefix; listing it must not match siblings.
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        let mut url = format!(
            "{}?list-type=2&delimiter=/&prefix={}",
            self.endpoint,
            encode_path(&prefix)
        );
        if let Some(token) = continuation_token.filter(|t| !t.is_empty()) {
            url.push_str("&continuation-token=");
            url.push_str(&uri_encode(token));
        }
        let builder = Request::builder().method(Method::GET).uri(url);
        finish(op, path, builder, Bytes::new())
    }

    pub(crate) fn initiate_multipart_request(
        &self,
        op: Operation,
        path: &str,
    ) -> Result<Request<Bytes>> {
        let url = format!("{}?uploads", self.object_url(op, path)?);
        let builder = self
            .sse
            .apply(Request::builder().method(Method::POST).uri(url), true);
        finish(op, path, builder, Bytes::new())
    }

    /// `UploadPart`. Like [`Self::put_object_request`], no body means no
    /// `content-length`.
    pub(crate) fn upload_part_request(
        &self,
        op: Operation,
        path: &str,
        upload_id: &str,
        part_number: u32,
        body: Option<Bytes>,
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}?partNumber={part_number}&uploadId={}",
            self.object_url(op, path)?,
            uri_encode(upload_id)
        );
        let mut builder = Request::builder().method(Method::PUT).uri(url);
        if let Some(body) = &body {
            builder = builder.header(CONTENT_LENGTH, body.len());
        }
        let builder = self.sse.apply(builder, false);
        finish(op, path, builder, body.unwrap_or_default())
    }

    /// `CompleteMultipartUpload` with the part manifest as XML body.
    pub(crate) fn complete_multipart_request(
        &self,
        op: Operation,
        path: &str,
        upload_id: &str,
        parts: &[ObjectPart],
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}?uploadId={}",
            self.object_url(op, path)?,
            uri_encode(upload_id)
        );
        let manifest = CompleteMultipartUpload {
            parts: parts
                .iter()
                .map(|p| CompletedPart {
                    part_number: p.part_number,
                    etag: p.etag.clone(),
                })
                .collect(),
        };
        let body = to_xml("CompleteMultipartUpload", &manifest)
            .map_err(|e| xml_error(op, path, e))?;

        let builder = Request::builder()
            .method(Method::POST)
            .uri(url)
            .header(CONTENT_LENGTH, body.len())
            .header(CONTENT_TYPE, "application/xml");
        finish(op, path, builder, Bytes::from(body))
    }

    pub(crate) fn abort_multipart_request(
        &self,
        op: Operation,
        path: &str,
        upload_id: &str,
    ) -> Result<Request<Bytes>> {
        let url = format!(
            "{}?uploadId={}",
            self.object_url(op, path)?,
            uri_encode(upload_id)
        );
        let builder = Request::builder().method(Method::DELETE).uri(url);
        finish(op, path, builder, Bytes::new())
    }

    /// Sign `req` with its payload hash and send it.
    pub(crate) fn send(
        &self,
        op: Operation,
        path: &str,
        mut req: Request<Bytes>,
    ) -> Result<Response<HttpBody>> {
        self.signer
            .sign(&mut req, true)
            .map_err(|e| auth_error(op, path, e))?;
        debug!(operation = op.as_str(), method = %req.method(), uri = %req.uri(), "Sending S3 request");

        let resp = self
            .client
            .send(req)
            .map_err(|e| transport_error(op, path, e))?;
        debug!(operation = op.as_str(), status = %resp.status(), "Received S3 response");
        Ok(resp)
    }

    /// Turn `req` into a presigned request valid for `expire`.
    pub(crate) fn presign(
        &self,
        op: Operation,
        path: &str,
        mut req: Request<Bytes>,
        expire: Duration,
    ) -> Result<PresignedRequest> {
        self.signer
            .presign(&mut req, expire)
            .map_err(|e| auth_error(op, path, e))?;
        let (parts, _) = req.into_parts();
        Ok(PresignedRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            expire,
        })
    }
}

fn finish(op: Operation, path: &str, builder: Builder, body: Bytes) -> Result<Request<Bytes>> {
    builder.body(body).map_err(|e| build_error(op, path, e))
}

/// Drain a response body.
pub(crate) fn read_body(op: Operation, path: &str, resp: Response<HttpBody>) -> Result<Bytes> {
    let mut body = Vec::new();
    resp.into_body()
        .read_to_end(&mut body)
        .map_err(|e| Error::from(e).with_operation(op).with_path(path))?;
    Ok(Bytes::from(body))
}

/// Object metadata from the headers of a `HeadObject` response.
pub(crate) fn parse_metadata(
    op: Operation,
    path: &str,
    headers: &HeaderMap,
) -> Result<ObjectMetadata> {
    let invalid = |name: &str| {
        Error::new(ErrorKind::Other, format!("invalid {name} header"))
            .with_operation(op)
            .with_path(path)
    };

    let mode = ObjectMode::from_path(path);
    let mut meta = ObjectMetadata::new(mode);
    if let Some(value) = headers.get(CONTENT_LENGTH) {
        let length = value
            .to_str()
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| invalid("content-length"))?;
        meta = meta.with_content_length(length);
    } else if mode == ObjectMode::Dir {
        meta = meta.with_content_length(0);
    }
    if let Some(value) = headers.get(ETAG) {
        let etag = value.to_str().map_err(|_| invalid("etag"))?;
        meta = meta.with_etag(etag);
    }
    if let Some(value) = headers.get(LAST_MODIFIED) {
        let modified = value
            .to_str()
            .ok()
            .and_then(parse_http_date)
            .ok_or_else(|| invalid("last-modified"))?;
        meta = meta.with_last_modified(modified);
    }
    Ok(meta)
}

/// Parse an HTTP date (`Wed, 21 Oct 2015 07:28:00 GMT`).
pub(crate) fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
