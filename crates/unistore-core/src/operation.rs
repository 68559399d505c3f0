//! Operation identifiers used for diagnostics and error context.

use std::fmt;

/// Every operation a backend can be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Query the backend's own metadata.
    Metadata,
    /// Create a file or directory.
    Create,
    /// Read object content.
    Read,
    /// Write object content.
    Write,
    /// Stat an object.
    Stat,
    /// Delete an object.
    Delete,
    /// List a directory.
    List,
    /// Generate a presigned request.
    PreSign,
    /// Initiate a multipart upload.
    CreateMultipart,
    /// Upload one part of a multipart upload.
    WriteMultipart,
    /// Complete a multipart upload.
    CompleteMultipart,
    /// Abort a multipart upload.
    AbortMultipart,
    /// Discover the region of a bucket (S3 construction only).
    DetectRegion,
}

impl Operation {
    /// The snake_case identifier used in log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Create => "create",
            Self::Read => "read",
            Self::Write => "write",
            Self::Stat => "stat",
            Self::Delete => "delete",
            Self::List => "list",
            Self::PreSign => "presign",
            Self::CreateMultipart => "create_multipart",
            Self::WriteMultipart => "write_multipart",
            Self::CompleteMultipart => "complete_multipart",
            Self::AbortMultipart => "abort_multipart",
            Self::DetectRegion => "detect_region",
        }
    }

    /// The name of the failure wrapping an error of this operation.
    #[must_use]
    pub const fn failure_name(self) -> &'static str {
        match self {
            Self::Metadata => "MetadataFailed",
            Self::Create => "CreateFailed",
            Self::Read => "ReadFailed",
            Self::Write => "WriteFailed",
            Self::Stat => "StatFailed",
            Self::Delete => "DeleteFailed",
            Self::List => "ListFailed",
            Self::PreSign => "PreSignFailed",
            Self::CreateMultipart => "CreateMultipartFailed",
            Self::WriteMultipart => "WriteMultipartFailed",
            Self::CompleteMultipart => "CompleteMultipartFailed",
            Self::AbortMultipart => "AbortMultipartFailed",
            Self::DetectRegion => "DetectRegionFailed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
