//! Layers stacking cross-cutting behavior around any unistore backend.
//!
//! Every layer implements [`unistore_core::Layer`] and produces an accessor
//! fulfilling the same contract as the one it wraps:
//!
//! ```
//! use std::sync::Arc;
//!
//! use unistore_core::{Accessor, AccessorMetadata, Capability, Operator, Scheme};
//! use unistore_layers::{LoggingLayer, RetryLayer};
//!
//! #[derive(Debug)]
//! struct Empty;
//!
//! impl Accessor for Empty {
//!     fn metadata(&self) -> AccessorMetadata {
//!         AccessorMetadata {
//!             scheme: Scheme::Custom("empty"),
//!             root: "/".to_owned(),
//!             name: String::new(),
//!             capability: Capability::empty(),
//!         }
//!     }
//! }
//!
//! let op = Operator::new(Arc::new(Empty))
//!     .layer(RetryLayer::new())
//!     .layer(LoggingLayer::new());
//! assert_eq!(op.metadata().scheme, Scheme::Custom("empty"));
//! ```
//!
//! # Modules
//!
//! - [`logging`] - Start/finish/failure events for every operation
//! - [`retry`] - Bounded retries of interrupted operations

pub mod logging;
pub mod retry;

pub use logging::{LoggingAccessor, LoggingConfig, LoggingLayer};
pub use retry::{ExponentialBackoff, RetryAccessor, RetryLayer, RetryStrategy};
