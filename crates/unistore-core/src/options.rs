//! Per-operation argument structs of the backend contract.

use std::fmt;
use std::time::Duration;

use http::{HeaderMap, Method, Uri};

use crate::metadata::{ObjectMode, ObjectPart, RangeBounds};

/// Arguments of [`Accessor::create`](crate::Accessor::create).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CreateOptions {
    /// Mode of the object to create, derived from the path by the facade.
    pub mode: ObjectMode,
}

impl CreateOptions {
    /// Options for creating `path`, with the mode inferred from its suffix.
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        Self {
            mode: ObjectMode::from_path(path),
        }
    }
}

/// Arguments of [`Accessor::read`](crate::Accessor::read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// Start offset.
    pub offset: Option<u64>,
    /// Number of bytes to read.
    pub size: Option<u64>,
}

impl ReadOptions {
    /// The requested window as [`RangeBounds`].
    #[must_use]
    pub fn range(&self) -> RangeBounds {
        RangeBounds::new(self.offset, self.size)
    }
}

impl From<RangeBounds> for ReadOptions {
    fn from(range: RangeBounds) -> Self {
        Self {
            offset: range.offset(),
            size: range.size(),
        }
    }
}

/// Arguments of [`Accessor::write`](crate::Accessor::write).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Size of the body in bytes.
    pub size: u64,
}

/// Arguments of [`Accessor::stat`](crate::Accessor::stat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatOptions;

/// Arguments of [`Accessor::delete`](crate::Accessor::delete).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOptions;

/// Arguments of [`Accessor::list`](crate::Accessor::list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions;

/// The operation a presigned request performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreSignOperation {
    /// Download the object, optionally a window of it.
    Read {
        /// Window to download.
        range: RangeBounds,
    },
    /// Upload the whole object.
    Write,
    /// Upload one part of a multipart upload.
    WriteMultipart {
        /// Upload id from `create_multipart`.
        upload_id: String,
        /// 1-based part number.
        part_number: u32,
    },
}

impl PreSignOperation {
    /// A short label for log lines.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Write => "write",
            Self::WriteMultipart { .. } => "write_multipart",
        }
    }
}

impl fmt::Display for PreSignOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of [`Accessor::presign`](crate::Accessor::presign).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreSignOptions {
    /// What the request will do.
    pub operation: PreSignOperation,
    /// How long the signature stays valid.
    pub expire: Duration,
}

/// A signed, time-limited request for a third party to execute later.
#[derive(Debug, Clone)]
pub struct PresignedRequest {
    /// HTTP method to use.
    pub method: Method,
    /// Full URI, signature included in the query string.
    pub uri: Uri,
    /// Headers the executor must send unchanged.
    pub headers: HeaderMap,
    /// Validity duration of the signature.
    pub expire: Duration,
}

/// Arguments of [`Accessor::create_multipart`](crate::Accessor::create_multipart).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CreateMultipartOptions;

/// Arguments of [`Accessor::write_multipart`](crate::Accessor::write_multipart).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteMultipartOptions {
    /// Upload id from `create_multipart`.
    pub upload_id: String,
    /// 1-based part number.
    pub part_number: u32,
    /// Size of the part body in bytes.
    pub size: u64,
}

/// Arguments of [`Accessor::complete_multipart`](crate::Accessor::complete_multipart).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteMultipartOptions {
    /// Upload id from `create_multipart`.
    pub upload_id: String,
    /// Every uploaded part, in order.
    pub parts: Vec<ObjectPart>,
}

/// Arguments of [`Accessor::abort_multipart`](crate::Accessor::abort_multipart).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortMultipartOptions {
    /// Upload id from `create_multipart`.
    pub upload_id: String,
}
