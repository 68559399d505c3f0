//! S3 backend for unistore.
//!
//! [`S3Backend`] implements the [`Accessor`](unistore_core::Accessor)
//! contract against the S3 REST API: objects, prefix listings, presigned
//! URLs and multipart uploads. Requests are signed with SigV4 and sent
//! through a pluggable blocking [`HttpClient`].
//!
//! # Modules
//!
//! - [`backend`] - The accessor implementation
//! - [`config`] - Backend configuration
//! - [`error`] - HTTP status classification
//! - [`region`] - Endpoint normalization and region discovery
//! - [`transport`] - The HTTP client seam and its `reqwest` implementation

pub mod backend;
pub mod config;
pub mod error;
mod lister;
pub mod region;
mod request;
pub mod transport;

pub use backend::S3Backend;
pub use config::{ConfigError, S3Config};
pub use request::{
    X_AMZ_SSE, X_AMZ_SSE_CUSTOMER_ALGORITHM, X_AMZ_SSE_CUSTOMER_KEY, X_AMZ_SSE_CUSTOMER_KEY_MD5,
    X_AMZ_SSE_KMS_KEY_ID,
};
pub use transport::{HttpBody, HttpClient, ReqwestClient, TransportError};
