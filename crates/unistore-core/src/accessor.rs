//! The backend contract.
//!
//! [`Accessor`] is the single polymorphic interface implemented by storage
//! drivers (S3, local filesystem) and by layers wrapping them. Handles are
//! shared as `Arc<dyn Accessor>`; implementations hold immutable
//! configuration and are safe to call concurrently.
//!
//! Every operation except [`Accessor::metadata`] has a default body returning
//! [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported), so a driver only
//! overrides what it supports and advertises the rest through its
//! [`Capability`].

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use bytes::Bytes;

use crate::capability::Capability;
use crate::error::{Error, Result};
use crate::metadata::{ObjectMetadata, ObjectPart};
use crate::operation::Operation;
use crate::options::{
    AbortMultipartOptions, CompleteMultipartOptions, CreateMultipartOptions, CreateOptions,
    DeleteOptions, ListOptions, PreSignOptions, PresignedRequest, ReadOptions, StatOptions,
    WriteMultipartOptions, WriteOptions,
};
use crate::stream::ObjectStream;

/// Blocking byte stream returned by [`Accessor::read`].
pub type Reader = Box<dyn Read + Send>;

/// Kind of storage behind an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// S3-compatible object storage.
    S3,
    /// Local filesystem.
    Fs,
    /// Any other backend.
    Custom(&'static str),
}

impl Scheme {
    /// Lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Fs => "fs",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of a backend instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorMetadata {
    /// Storage kind.
    pub scheme: Scheme,
    /// Canonical root (`/abc/def/`).
    pub root: String,
    /// Human readable name, such as the bucket.
    pub name: String,
    /// Supported operations.
    pub capability: Capability,
}

impl fmt::Display for AccessorMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scheme={} root={} name={} capability={}",
            self.scheme, self.root, self.name, self.capability
        )
    }
}

/// The uniform storage contract.
///
/// Paths are relative to the backend root and follow the conventions of
/// [`crate::path`]: a trailing `/` marks a directory and `/` alone is the root.
pub trait Accessor: Send + Sync + fmt::Debug + 'static {
    /// Describe this backend.
    fn metadata(&self) -> AccessorMetadata;

    /// Create an empty file, or a directory when the path ends with `/`.
    ///
    /// Creating an existing directory succeeds; creating an existing file
    /// truncates it.
    fn create(&self, path: &str, args: &CreateOptions) -> Result<()> {
        let _ = args;
        Err(Error::unsupported(Operation::Create).with_path(path))
    }

    /// Open the object (or a window of it) for reading.
    fn read(&self, path: &str, args: &ReadOptions) -> Result<Reader> {
        let _ = args;
        Err(Error::unsupported(Operation::Read).with_path(path))
    }

    /// Replace the object's content with `body`, returning the bytes written.
    fn write(&self, path: &str, args: &WriteOptions, body: Bytes) -> Result<u64> {
        let _ = (args, body);
        Err(Error::unsupported(Operation::Write).with_path(path))
    }

    /// Fetch the metadata of an object. The root always stats as a directory.
    fn stat(&self, path: &str, args: &StatOptions) -> Result<ObjectMetadata> {
        let _ = args;
        Err(Error::unsupported(Operation::Stat).with_path(path))
    }

    /// Delete an object. Deleting an absent object succeeds.
    fn delete(&self, path: &str, args: &DeleteOptions) -> Result<()> {
        let _ = args;
        Err(Error::unsupported(Operation::Delete).with_path(path))
    }

    /// List a directory. A missing directory yields an empty stream.
    fn list(&self, path: &str, args: &ListOptions) -> Result<ObjectStream> {
        let _ = args;
        Err(Error::unsupported(Operation::List).with_path(path))
    }

    /// Generate a presigned request. Requires [`Capability::PRESIGN`].
    fn presign(&self, path: &str, args: &PreSignOptions) -> Result<PresignedRequest> {
        let _ = args;
        Err(Error::unsupported(Operation::PreSign).with_path(path))
    }

    /// Start a multipart upload and return its opaque id.
    /// Requires [`Capability::MULTIPART`].
    fn create_multipart(&self, path: &str, args: &CreateMultipartOptions) -> Result<String> {
        let _ = args;
        Err(Error::unsupported(Operation::CreateMultipart).with_path(path))
    }

    /// Upload one part of a multipart upload.
    fn write_multipart(
        &self,
        path: &str,
        args: &WriteMultipartOptions,
        body: Bytes,
    ) -> Result<ObjectPart> {
        let _ = (args, body);
        Err(Error::unsupported(Operation::WriteMultipart).with_path(path))
    }

    /// Assemble the uploaded parts into the final object.
    fn complete_multipart(&self, path: &str, args: &CompleteMultipartOptions) -> Result<()> {
        let _ = args;
        Err(Error::unsupported(Operation::CompleteMultipart).with_path(path))
    }

    /// Discard a multipart upload and its parts.
    fn abort_multipart(&self, path: &str, args: &AbortMultipartOptions) -> Result<()> {
        let _ = args;
        Err(Error::unsupported(Operation::AbortMultipart).with_path(path))
    }
}

/// A decorator turning one accessor into another implementing the same contract.
pub trait Layer {
    /// Wrap `inner`.
    fn layer(&self, inner: Arc<dyn Accessor>) -> Arc<dyn Accessor>;
}
