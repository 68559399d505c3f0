//! Error model shared by every backend and layer.
//!
//! Failures are described by a closed [`ErrorKind`] plus a structured [`Error`]
//! value carrying the failing [`Operation`], the offending path, a message,
//! the response body (when a remote service produced one) and the original
//! underlying error. Callers match on [`Error::kind`] instead of comparing
//! error identities.

use std::fmt;
use std::io;

use bytes::Bytes;

use crate::operation::Operation;

/// Boxed underlying error kept as the source of an [`Error`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout unistore.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Body bytes rendered in `Display` before truncation.
const MAX_DISPLAY_BODY: usize = 256;

/// Classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The object does not exist.
    NotFound,
    /// The backend refused access.
    PermissionDenied,
    /// A transient failure; the operation may succeed when retried.
    Interrupted,
    /// The backend does not support the requested operation.
    Unsupported,
    /// A directory was used where a file is required.
    IsADirectory,
    /// A file was used where a directory is required.
    NotADirectory,
    /// Anything else.
    Other,
}

impl ErrorKind {
    /// A short human readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::Interrupted => "interrupted",
            Self::Unsupported => "unsupported method",
            Self::IsADirectory => "is a directory",
            Self::NotADirectory => "not a directory",
            Self::Other => "other",
        }
    }

    /// Whether an operation failing with this kind is worth retrying.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure with its diagnostic context.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    operation: Option<Operation>,
    path: String,
    body: Option<Bytes>,
    source: Option<BoxError>,
}

impl Error {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            operation: None,
            path: String::new(),
            body: None,
            source: None,
        }
    }

    /// The error returned by a backend lacking support for `operation`.
    #[must_use]
    pub fn unsupported(operation: Operation) -> Self {
        Self::new(
            ErrorKind::Unsupported,
            format!("operation {operation} is not supported by this backend"),
        )
        .with_operation(operation)
    }

    /// Attach the operation that failed.
    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Attach the path the operation was working on.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Attach a response body for diagnostics.
    #[must_use]
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The classified kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The failing operation, if known.
    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        self.operation
    }

    /// The offending path (empty when not tied to a path).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The response body returned by the remote service, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// The wrapper name of this failure, such as `ReadFailed`.
    #[must_use]
    pub fn failure_name(&self) -> Option<&'static str> {
        self.operation.map(Operation::failure_name)
    }

    /// Whether the failure is transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(op) = self.operation {
            write!(f, "{} ({})", op.failure_name(), self.kind)?;
        } else {
            write!(f, "{}", self.kind)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if !self.path.is_empty() {
            write!(f, ", path: {}", self.path)?;
        }
        if let Some(body) = self.body.as_ref().filter(|b| !b.is_empty()) {
            let shown = &body[..body.len().min(MAX_DISPLAY_BODY)];
            write!(f, ", body: {}", String::from_utf8_lossy(shown))?;
        }
        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            io::ErrorKind::Interrupted
            | io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => ErrorKind::Interrupted,
            io::ErrorKind::IsADirectory => ErrorKind::IsADirectory,
            io::ErrorKind::NotADirectory => ErrorKind::NotADirectory,
            io::ErrorKind::Unsupported => ErrorKind::Unsupported,
            _ => ErrorKind::Other,
        };
        Self::new(kind, err.to_string()).with_source(err)
    }
}
