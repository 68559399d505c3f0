//! The filesystem [`Accessor`].
//!
//! Object paths map onto a directory tree below the configured root. A path
//! ending with `/` addresses a directory and anything else a regular file;
//! when the on-disk type disagrees with the path, the object is treated as
//! absent.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;
use unistore_core::path::{build_abs_path, normalize_root};
use unistore_core::{
    Accessor, AccessorMetadata, Capability, CreateOptions, DeleteOptions, Error, ErrorKind,
    ListOptions, ObjectMetadata, ObjectMode, ObjectStream, Operation, ReadOptions, Reader, Result,
    Scheme, StatOptions, WriteOptions,
};

use crate::config::FsConfig;
use crate::lister::DirLister;

/// Local filesystem backend.
///
/// # Examples
///
/// ```
/// use unistore_core::Operator;
/// use unistore_fs::{FsBackend, FsConfig};
///
/// let dir = tempfile::tempdir().unwrap();
/// let backend = FsBackend::new(&FsConfig::builder().root(dir.path().display().to_string()).build());
/// let op = Operator::from_accessor(backend);
///
/// op.object("hello.txt").write("hi").unwrap();
/// assert_eq!(op.object("hello.txt").read_to_end().unwrap(), b"hi");
/// ```
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: String,
}

impl FsBackend {
    /// Create a backend rooted at `config.root`. No I/O happens here; the
    /// root directory is created on the first write.
    #[must_use]
    pub fn new(config: &FsConfig) -> Self {
        let root = normalize_root(&config.root);
        debug!(root = %root, "Created filesystem backend");
        Self { root }
    }

    /// Canonical root of this backend.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Resolve an object path to its location on disk.
    pub(crate) fn abs_path(&self, path: &str) -> Result<PathBuf> {
        Ok(PathBuf::from(format!("/{}", build_abs_path(&self.root, path)?)))
    }
}

/// Wrap an I/O failure with the operation and path it happened on.
pub(crate) fn fs_error(op: Operation, path: &str) -> impl FnOnce(io::Error) -> Error + '_ {
    move |err| Error::from(err).with_operation(op).with_path(path)
}

/// Convert on-disk metadata into object metadata.
pub(crate) fn object_metadata(meta: &fs::Metadata) -> ObjectMetadata {
    let mode = if meta.is_dir() {
        ObjectMode::Dir
    } else {
        ObjectMode::File
    };
    let mut result = ObjectMetadata::new(mode).with_content_length(meta.len());
    if let Ok(modified) = meta.modified() {
        result = result.with_last_modified(DateTime::<Utc>::from(modified));
    }
    result
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

impl Accessor for FsBackend {
    fn metadata(&self) -> AccessorMetadata {
        AccessorMetadata {
            scheme: Scheme::Fs,
            root: self.root.clone(),
            name: String::new(),
            capability: Capability::READ
                | Capability::WRITE
                | Capability::LIST
                | Capability::BLOCKING,
        }
    }

    fn create(&self, path: &str, args: &CreateOptions) -> Result<()> {
        let op = Operation::Create;
        let abs = self.abs_path(path).map_err(|e| e.with_operation(op))?;
        ensure_parent(&abs).map_err(fs_error(op, path))?;

        match args.mode {
            ObjectMode::Dir => fs::create_dir_all(&abs).map_err(fs_error(op, path)),
            ObjectMode::File => OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&abs)
                .map(drop)
                .map_err(fs_error(op, path)),
            ObjectMode::Unknown => Err(Error::new(
                ErrorKind::Other,
                "cannot create an object of unknown mode",
            )
            .with_operation(op)
            .with_path(path)),
        }
    }

    fn read(&self, path: &str, args: &ReadOptions) -> Result<Reader> {
        let op = Operation::Read;
        let abs = self.abs_path(path).map_err(|e| e.with_operation(op))?;
        let mut file = File::open(&abs).map_err(fs_error(op, path))?;

        if file.metadata().map_err(fs_error(op, path))?.is_dir() {
            return Err(Error::new(ErrorKind::IsADirectory, "is a directory")
                .with_operation(op)
                .with_path(path));
        }
        if let Some(offset) = args.offset {
            file.seek(SeekFrom::Start(offset))
                .map_err(fs_error(op, path))?;
        }

        Ok(match args.size {
            Some(size) => Box::new(file.take(size)),
            None => Box::new(file),
        })
    }

    fn write(&self, path: &str, _args: &WriteOptions, body: Bytes) -> Result<u64> {
        let op = Operation::Write;
        let abs = self.abs_path(path).map_err(|e| e.with_operation(op))?;
        ensure_parent(&abs).map_err(fs_error(op, path))?;

        let mut file = File::create(&abs).map_err(fs_error(op, path))?;
        file.write_all(&body).map_err(fs_error(op, path))?;
        file.flush().map_err(fs_error(op, path))?;
        Ok(body.len() as u64)
    }

    fn stat(&self, path: &str, _args: &StatOptions) -> Result<ObjectMetadata> {
        let op = Operation::Stat;
        if path == "/" {
            return Ok(ObjectMetadata::new(ObjectMode::Dir).with_content_length(0));
        }
        let abs = self.abs_path(path).map_err(|e| e.with_operation(op))?;
        let mismatch = || {
            Error::new(ErrorKind::NotFound, "object type mismatch")
                .with_operation(op)
                .with_path(path)
        };
        let meta = match fs::metadata(&abs) {
            Ok(meta) => meta,
            // A directory path crossing a regular file.
            Err(err) if err.kind() == io::ErrorKind::NotADirectory => {
                return Err(mismatch().with_source(err));
            }
            Err(err) => return Err(fs_error(op, path)(err)),
        };

        if meta.is_dir() != ObjectMode::from_path(path).is_dir() {
            return Err(mismatch());
        }
        Ok(object_metadata(&meta))
    }

    fn delete(&self, path: &str, _args: &DeleteOptions) -> Result<()> {
        let op = Operation::Delete;
        let abs = self.abs_path(path).map_err(|e| e.with_operation(op))?;
        let meta = match fs::metadata(&abs) {
            Ok(meta) => meta,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                return Ok(());
            }
            Err(err) => return Err(fs_error(op, path)(err)),
        };

        if meta.is_dir() != ObjectMode::from_path(path).is_dir() {
            debug!(path, "Skipping delete of object with mismatched type");
            return Ok(());
        }
        if meta.is_dir() {
            fs::remove_dir_all(&abs).map_err(fs_error(op, path))
        } else {
            fs::remove_file(&abs).map_err(fs_error(op, path))
        }
    }

    fn list(&self, path: &str, _args: &ListOptions) -> Result<ObjectStream> {
        let op = Operation::List;
        let abs = self.abs_path(path).map_err(|e| e.with_operation(op))?;
        let read_dir = match fs::read_dir(&abs) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(ObjectStream::empty()),
            Err(err) if err.kind() == io::ErrorKind::NotADirectory => {
                return Err(Error::new(ErrorKind::NotADirectory, "not a directory")
                    .with_operation(op)
                    .with_path(path)
                    .with_source(err));
            }
            Err(err) => return Err(fs_error(op, path)(err)),
        };

        let mut children = read_dir
            .collect::<io::Result<Vec<_>>>()
            .map_err(fs_error(op, path))?;
        children.sort_by_key(fs::DirEntry::file_name);

        let parent = if path == "/" { "" } else { path };
        let accessor: Arc<dyn Accessor> = Arc::new(self.clone());
        Ok(ObjectStream::new(DirLister::new(
            accessor,
            parent.to_owned(),
            children,
        )))
    }
}
