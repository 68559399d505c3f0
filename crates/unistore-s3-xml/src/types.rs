//! Typed S3 XML bodies exchanged by the client.

use chrono::{DateTime, Utc};

/// Body of a `ListObjectsV2` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBucketResult {
    /// Whether more results follow this page. `None` when the element is absent.
    pub is_truncated: Option<bool>,
    /// Token requesting the next page.
    pub next_continuation_token: Option<String>,
    /// Number of keys returned on this page.
    pub key_count: Option<u64>,
    /// The objects of this page.
    pub contents: Vec<ListedObject>,
    /// The common prefixes of this page, rolled up by the delimiter.
    pub common_prefixes: Vec<String>,
}

/// One `<Contents>` element of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListedObject {
    /// The object key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Entity tag, with its surrounding quotes.
    pub etag: Option<String>,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Body of a `CreateMultipartUpload` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitiateMultipartUploadResult {
    /// The bucket of the upload.
    pub bucket: String,
    /// The object key of the upload.
    pub key: String,
    /// The upload id.
    pub upload_id: String,
}

/// An S3 `<Error>` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDocument {
    /// Machine readable error code, e.g. `NoSuchKey`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// The resource the error refers to.
    pub resource: Option<String>,
    /// The request id assigned by the service.
    pub request_id: Option<String>,
}

/// Body of a `CompleteMultipartUpload` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompleteMultipartUpload {
    /// The uploaded parts, ordered by part number.
    pub parts: Vec<CompletedPart>,
}

/// One `<Part>` of a [`CompleteMultipartUpload`] body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// The part number.
    pub part_number: u32,
    /// The entity tag returned when the part was uploaded.
    pub etag: String,
}
