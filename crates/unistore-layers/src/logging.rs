//! Logging layer.
//!
//! [`LoggingAccessor`] emits one event before and one after every operation
//! of the wrapped backend, under the `unistore::service` target. Every event
//! carries `service`, `operation` and `path` as structured fields; the message
//! holds the call arguments and the outcome:
//!
//! ```text
//! offset=0 size=none -> starting service=s3 operation=read path=dir/a.txt
//! offset=0 size=none -> finished service=s3 operation=read path=dir/a.txt
//! -> failed: StatFailed (not found): ... service=s3 operation=stat path=missing
//! ```
//!
//! Inputs, outputs and errors pass through untouched.

use std::sync::Arc;

use bytes::Bytes;
use tracing::Level;
use typed_builder::TypedBuilder;
use unistore_core::{
    AbortMultipartOptions, Accessor, AccessorMetadata, CompleteMultipartOptions,
    CreateMultipartOptions, CreateOptions, DeleteOptions, ErrorKind, Layer, ListOptions,
    ObjectMetadata, ObjectPart, ObjectStream, Operation, PreSignOptions, PresignedRequest,
    ReadOptions, Reader, Result, Scheme, StatOptions, WriteMultipartOptions, WriteOptions,
};

/// Event levels used by [`LoggingLayer`].
///
/// # Examples
///
/// ```
/// use tracing::Level;
/// use unistore_layers::LoggingConfig;
///
/// let config = LoggingConfig::builder().error_level(Level::ERROR).build();
/// assert_eq!(config.start_level, Level::DEBUG);
/// ```
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct LoggingConfig {
    /// Level of the `-> starting` events.
    #[builder(default = Level::DEBUG)]
    pub start_level: Level,

    /// Level of the `-> finished` events.
    #[builder(default = Level::DEBUG)]
    pub finish_level: Level,

    /// Level of the `-> failed` events.
    #[builder(default = Level::WARN)]
    pub error_level: Level,

    /// Level of the `-> failed` events whose error is `NotFound`, which
    /// callers routinely expect (existence checks, idempotent deletes).
    #[builder(default = Level::DEBUG)]
    pub not_found_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Layer wrapping a backend in a [`LoggingAccessor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    config: LoggingConfig,
}

impl LoggingLayer {
    /// A layer with the default levels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A layer with custom levels.
    #[must_use]
    pub fn with_config(config: LoggingConfig) -> Self {
        Self { config }
    }
}

impl Layer for LoggingLayer {
    fn layer(&self, inner: Arc<dyn Accessor>) -> Arc<dyn Accessor> {
        let scheme = inner.metadata().scheme;
        Arc::new(LoggingAccessor {
            inner,
            scheme,
            config: self.config,
        })
    }
}

/// Backend decorator logging every operation.
#[derive(Debug)]
pub struct LoggingAccessor {
    inner: Arc<dyn Accessor>,
    scheme: Scheme,
    config: LoggingConfig,
}

fn emit(level: Level, scheme: Scheme, op: Operation, path: &str, message: &str) {
    macro_rules! at {
        ($lvl:expr) => {
            tracing::event!(
                target: "unistore::service",
                $lvl,
                service = %scheme,
                operation = %op,
                path = %path,
                "{}",
                message
            )
        };
    }

    if level == Level::ERROR {
        at!(Level::ERROR);
    } else if level == Level::WARN {
        at!(Level::WARN);
    } else if level == Level::INFO {
        at!(Level::INFO);
    } else if level == Level::DEBUG {
        at!(Level::DEBUG);
    } else {
        at!(Level::TRACE);
    }
}

fn opt(value: Option<u64>) -> String {
    value.map_or_else(|| "none".to_owned(), |v| v.to_string())
}

/// Join the non-empty message parts with single spaces.
fn message(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

impl LoggingAccessor {
    fn observe<T>(
        &self,
        op: Operation,
        path: &str,
        detail: &str,
        call: impl FnOnce() -> Result<T>,
        finished: impl FnOnce(&T) -> String,
    ) -> Result<T> {
        let scheme = self.scheme;
        emit(
            self.config.start_level,
            scheme,
            op,
            path,
            &message(&[detail, "-> starting"]),
        );

        match call() {
            Ok(value) => {
                let outcome = finished(&value);
                emit(
                    self.config.finish_level,
                    scheme,
                    op,
                    path,
                    &message(&[detail, &outcome, "-> finished"]),
                );
                Ok(value)
            }
            Err(err) => {
                let level = if err.kind() == ErrorKind::NotFound {
                    self.config.not_found_level
                } else {
                    self.config.error_level
                };
                emit(
                    level,
                    scheme,
                    op,
                    path,
                    &message(&[detail, &format!("-> failed: {err}")]),
                );
                Err(err)
            }
        }
    }
}

impl Accessor for LoggingAccessor {
    fn metadata(&self) -> AccessorMetadata {
        let scheme = self.scheme;
        let op = Operation::Metadata;
        emit(
            self.config.start_level,
            scheme,
            op,
            "",
            "-> starting",
        );
        let metadata = self.inner.metadata();
        emit(
            self.config.finish_level,
            scheme,
            op,
            "",
            &format!("-> finished: {metadata}"),
        );
        metadata
    }

    fn create(&self, path: &str, args: &CreateOptions) -> Result<()> {
        let detail = format!("mode={}", args.mode);
        self.observe(
            Operation::Create,
            path,
            &detail,
            || self.inner.create(path, args),
            |()| String::new(),
        )
    }

    fn read(&self, path: &str, args: &ReadOptions) -> Result<Reader> {
        let detail = format!("offset={} size={}", opt(args.offset), opt(args.size));
        self.observe(
            Operation::Read,
            path,
            &detail,
            || self.inner.read(path, args),
            |_| String::new(),
        )
    }

    fn write(&self, path: &str, args: &WriteOptions, body: Bytes) -> Result<u64> {
        let detail = format!("size={}", args.size);
        self.observe(
            Operation::Write,
            path,
            &detail,
            || self.inner.write(path, args, body),
            |written| format!("written={written}"),
        )
    }

    fn stat(&self, path: &str, args: &StatOptions) -> Result<ObjectMetadata> {
        self.observe(
            Operation::Stat,
            path,
            "",
            || self.inner.stat(path, args),
            |meta| format!("mode={} content_length={}", meta.mode, opt(meta.content_length)),
        )
    }

    fn delete(&self, path: &str, args: &DeleteOptions) -> Result<()> {
        self.observe(
            Operation::Delete,
            path,
            "",
            || self.inner.delete(path, args),
            |()| String::new(),
        )
    }

    fn list(&self, path: &str, args: &ListOptions) -> Result<ObjectStream> {
        self.observe(
            Operation::List,
            path,
            "",
            || self.inner.list(path, args),
            |_| String::new(),
        )
    }

    fn presign(&self, path: &str, args: &PreSignOptions) -> Result<PresignedRequest> {
        let detail = format!(
            "presign={} expire={}s",
            args.operation,
            args.expire.as_secs()
        );
        self.observe(
            Operation::PreSign,
            path,
            &detail,
            || self.inner.presign(path, args),
            |req| format!("method={}", req.method),
        )
    }

    fn create_multipart(&self, path: &str, args: &CreateMultipartOptions) -> Result<String> {
        self.observe(
            Operation::CreateMultipart,
            path,
            "",
            || self.inner.create_multipart(path, args),
            |upload_id| format!("upload_id={upload_id}"),
        )
    }

    fn write_multipart(
        &self,
        path: &str,
        args: &WriteMultipartOptions,
        body: Bytes,
    ) -> Result<ObjectPart> {
        let detail = format!(
            "upload_id={} part_number={} size={}",
            args.upload_id, args.part_number, args.size
        );
        self.observe(
            Operation::WriteMultipart,
            path,
            &detail,
            || self.inner.write_multipart(path, args, body),
            |part| format!("etag={}", part.etag),
        )
    }

    fn complete_multipart(&self, path: &str, args: &CompleteMultipartOptions) -> Result<()> {
        let detail = format!("upload_id={} parts={}", args.upload_id, args.parts.len());
        self.observe(
            Operation::CompleteMultipart,
            path,
            &detail,
            || self.inner.complete_multipart(path, args),
            |()| String::new(),
        )
    }

    fn abort_multipart(&self, path: &str, args: &AbortMultipartOptions) -> Result<()> {
        let detail = format!("upload_id={}", args.upload_id);
        self.observe(
            Operation::AbortMultipart,
            path,
            &detail,
            || self.inner.abort_multipart(path, args),
            |()| String::new(),
        )
    }
}
