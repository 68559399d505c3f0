//! Unified blocking access to object storage.
//!
//! unistore exposes one storage contract, the [`Accessor`] trait, over
//! several backends, and a convenient [`Operator`]/[`Object`] facade on top
//! of it. Cross-cutting behavior such as logging and retries is stacked
//! around any backend as a [`Layer`].
//!
//! # Backends
//!
//! - [`services::fs`] - A directory tree on the local filesystem
//! - [`services::s3`] - An S3 bucket, addressed path or virtual-host style
//!
//! # Layers
//!
//! - [`layers::LoggingLayer`] - `tracing` events around every operation
//! - [`layers::RetryLayer`] - Exponential backoff on transient failures
//!
//! # Examples
//!
//! ```
//! use unistore::layers::{LoggingLayer, RetryLayer};
//! use unistore::services::fs::{FsBackend, FsConfig};
//! use unistore::Operator;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = FsConfig::builder().root(dir.path().display().to_string()).build();
//! let op = Operator::from_accessor(FsBackend::new(&config))
//!     .layer(RetryLayer::new())
//!     .layer(LoggingLayer::new());
//!
//! op.object("greeting.txt").write("hello").unwrap();
//! assert_eq!(op.object("greeting.txt").read_to_end().unwrap(), b"hello");
//! assert!(!op.object("missing.txt").is_exist().unwrap());
//! ```

pub use unistore_core::*;

/// Storage backends.
pub mod services {
    /// The local filesystem backend.
    pub mod fs {
        pub use unistore_fs::*;
    }

    /// The S3 backend.
    pub mod s3 {
        pub use unistore_s3::*;
    }
}

/// Accessor decorators.
pub mod layers {
    pub use unistore_layers::*;
}

/// Request signing.
pub mod auth {
    pub use unistore_auth::*;
}
