//! The user-facing facade: [`Operator`] binds a backend, [`Object`] binds a path.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::accessor::{Accessor, AccessorMetadata, Layer, Reader};
use crate::error::{Error, ErrorKind, Result};
use crate::metadata::{ObjectMetadata, ObjectMode, ObjectPart, RangeBounds};
use crate::operation::Operation;
use crate::options::{
    AbortMultipartOptions, CompleteMultipartOptions, CreateMultipartOptions, CreateOptions,
    DeleteOptions, ListOptions, PreSignOperation, PreSignOptions, PresignedRequest, ReadOptions,
    StatOptions, WriteMultipartOptions, WriteOptions,
};
use crate::path::{name_from_path, normalize_path};
use crate::stream::ObjectStream;

/// Entry point of the crate: a backend plus the layers stacked on it.
///
/// ```no_run
/// # use unistore_core::{Accessor, Operator};
/// # fn demo(backend: impl Accessor) -> unistore_core::Result<()> {
/// let op = Operator::from_accessor(backend);
/// op.object("hello.txt").write("Hello,World!")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Operator {
    accessor: Arc<dyn Accessor>,
}

impl Operator {
    /// Wrap a shared accessor.
    #[must_use]
    pub fn new(accessor: Arc<dyn Accessor>) -> Self {
        Self { accessor }
    }

    /// Wrap an owned accessor.
    pub fn from_accessor(accessor: impl Accessor) -> Self {
        Self::new(Arc::new(accessor))
    }

    /// Stack a layer on top of the current accessor.
    #[must_use]
    pub fn layer(self, layer: impl Layer) -> Self {
        Self {
            accessor: layer.layer(self.accessor),
        }
    }

    /// Metadata of the underlying backend.
    #[must_use]
    pub fn metadata(&self) -> AccessorMetadata {
        self.accessor.metadata()
    }

    /// The outermost accessor.
    #[must_use]
    pub fn accessor(&self) -> &Arc<dyn Accessor> {
        &self.accessor
    }

    /// A handle on `path`, normalized.
    #[must_use]
    pub fn object(&self, path: &str) -> Object {
        Object::new(Arc::clone(&self.accessor), path)
    }
}

/// A handle on one path of a backend.
///
/// Creating a handle performs no I/O. Local validations (writing to or
/// reading from a directory path, listing a file path) fail before any
/// request is made.
#[derive(Debug, Clone)]
pub struct Object {
    accessor: Arc<dyn Accessor>,
    path: String,
}

impl Object {
    /// Bind `path` (normalized) to `accessor`.
    #[must_use]
    pub fn new(accessor: Arc<dyn Accessor>, path: &str) -> Self {
        Self {
            accessor,
            path: normalize_path(path),
        }
    }

    /// Root plus path, unique across objects of the same backend.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}{}", self.accessor.metadata().root, self.path)
    }

    /// Normalized path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of the path.
    #[must_use]
    pub fn name(&self) -> &str {
        name_from_path(&self.path)
    }

    /// Mode implied by the path.
    #[must_use]
    pub fn mode(&self) -> ObjectMode {
        ObjectMode::from_path(&self.path)
    }

    /// Create an empty file, or a directory when the path ends with `/`.
    pub fn create(&self) -> Result<()> {
        self.accessor
            .create(&self.path, &CreateOptions::for_path(&self.path))
    }

    /// Open the whole object for reading.
    pub fn read(&self) -> Result<Reader> {
        self.range_read(RangeBounds::full())
    }

    /// Open a window of the object for reading.
    pub fn range_read(&self, range: impl Into<RangeBounds>) -> Result<Reader> {
        self.ensure_file(Operation::Read)?;
        self.accessor
            .read(&self.path, &ReadOptions::from(range.into()))
    }

    /// Read the whole object into memory.
    pub fn read_to_end(&self) -> Result<Vec<u8>> {
        let mut reader = self.read()?;
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| Error::from(e).with_operation(Operation::Read).with_path(&self.path))?;
        Ok(buf)
    }

    /// Replace the object's content.
    pub fn write(&self, body: impl Into<Bytes>) -> Result<()> {
        self.ensure_file(Operation::Write)?;
        let body = body.into();
        let args = WriteOptions {
            size: body.len() as u64,
        };
        self.accessor.write(&self.path, &args, body)?;
        Ok(())
    }

    /// Delete the object. Missing objects are not an error.
    pub fn delete(&self) -> Result<()> {
        self.accessor.delete(&self.path, &DeleteOptions)
    }

    /// List the directory this handle points to.
    pub fn list(&self) -> Result<ObjectStream> {
        if !self.mode().is_dir() {
            return Err(Error::new(ErrorKind::NotADirectory, "not a directory")
                .with_operation(Operation::List)
                .with_path(&self.path));
        }
        self.accessor.list(&self.path, &ListOptions)
    }

    /// Fetch the object's metadata.
    pub fn metadata(&self) -> Result<ObjectMetadata> {
        self.accessor.stat(&self.path, &StatOptions)
    }

    /// Whether the object exists.
    pub fn is_exist(&self) -> Result<bool> {
        match self.metadata() {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Presign a download of `range`.
    pub fn presign_read(
        &self,
        range: impl Into<RangeBounds>,
        expire: Duration,
    ) -> Result<PresignedRequest> {
        self.ensure_file(Operation::PreSign)?;
        let operation = PreSignOperation::Read {
            range: range.into(),
        };
        self.presign(operation, expire)
    }

    /// Presign an upload of the whole object.
    pub fn presign_write(&self, expire: Duration) -> Result<PresignedRequest> {
        self.ensure_file(Operation::PreSign)?;
        self.presign(PreSignOperation::Write, expire)
    }

    /// Presign the upload of one part of a multipart upload.
    pub fn presign_write_multipart(
        &self,
        upload_id: &str,
        part_number: u32,
        expire: Duration,
    ) -> Result<PresignedRequest> {
        self.ensure_file(Operation::PreSign)?;
        self.presign(
            PreSignOperation::WriteMultipart {
                upload_id: upload_id.to_owned(),
                part_number,
            },
            expire,
        )
    }

    /// Start a multipart upload, returning its id.
    pub fn create_multipart(&self) -> Result<String> {
        self.ensure_file(Operation::CreateMultipart)?;
        self.accessor
            .create_multipart(&self.path, &CreateMultipartOptions)
    }

    /// Upload part `part_number` of upload `upload_id`.
    pub fn write_multipart(
        &self,
        upload_id: &str,
        part_number: u32,
        body: impl Into<Bytes>,
    ) -> Result<ObjectPart> {
        let body = body.into();
        let args = WriteMultipartOptions {
            upload_id: upload_id.to_owned(),
            part_number,
            size: body.len() as u64,
        };
        self.accessor.write_multipart(&self.path, &args, body)
    }

    /// Assemble `parts`, in order, into the final object.
    pub fn complete_multipart(&self, upload_id: &str, parts: Vec<ObjectPart>) -> Result<()> {
        let args = CompleteMultipartOptions {
            upload_id: upload_id.to_owned(),
            parts,
        };
        self.accessor.complete_multipart(&self.path, &args)
    }

    /// Abandon upload `upload_id`.
    pub fn abort_multipart(&self, upload_id: &str) -> Result<()> {
        let args = AbortMultipartOptions {
            upload_id: upload_id.to_owned(),
        };
        self.accessor.abort_multipart(&self.path, &args)
    }

    fn presign(&self, operation: PreSignOperation, expire: Duration) -> Result<PresignedRequest> {
        self.accessor
            .presign(&self.path, &PreSignOptions { operation, expire })
    }

    fn ensure_file(&self, operation: Operation) -> Result<()> {
        if self.mode().is_dir() {
            let message = match operation {
                Operation::Write => "cannot write to a directory",
                _ => "is a directory",
            };
            return Err(Error::new(ErrorKind::IsADirectory, message)
                .with_operation(operation)
                .with_path(&self.path));
        }
        Ok(())
    }
}
