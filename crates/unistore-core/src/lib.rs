//! Core abstractions of unistore.
//!
//! unistore exposes one blocking storage contract, [`Accessor`], over
//! heterogeneous backends and lets cross-cutting behavior be stacked around
//! any backend as a [`Layer`]. This crate holds the pieces every backend and
//! layer shares.
//!
//! # Modules
//!
//! - [`accessor`] - The backend contract, backend metadata and the layer trait
//! - [`capability`] - Capability bit-set
//! - [`entry`] - Listing entries
//! - [`error`] - Error kinds and the structured error value
//! - [`metadata`] - Object mode, metadata, multipart parts and byte ranges
//! - [`operation`] - Operation identifiers
//! - [`operator`] - The `Operator`/`Object` facade
//! - [`options`] - Per-operation arguments
//! - [`path`] - Path normalization and encoding
//! - [`stream`] - Page-to-entry stream adapter

pub mod accessor;
pub mod capability;
pub mod entry;
pub mod error;
pub mod metadata;
pub mod operation;
pub mod operator;
pub mod options;
pub mod path;
pub mod stream;

pub use accessor::{Accessor, AccessorMetadata, Layer, Reader, Scheme};
pub use capability::Capability;
pub use entry::Entry;
pub use error::{BoxError, Error, ErrorKind, Result};
pub use metadata::{ObjectMetadata, ObjectMode, ObjectPart, RangeBounds};
pub use operation::Operation;
pub use operator::{Object, Operator};
pub use options::{
    AbortMultipartOptions, CompleteMultipartOptions, CreateMultipartOptions, CreateOptions,
    DeleteOptions, ListOptions, PreSignOperation, PreSignOptions, PresignedRequest, ReadOptions,
    StatOptions, WriteMultipartOptions, WriteOptions,
};
pub use stream::{ObjectStream, Page, PageSource};
