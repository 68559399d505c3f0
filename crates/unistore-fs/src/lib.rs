//! Local filesystem backend for unistore.
//!
//! [`FsBackend`] implements [`unistore_core::Accessor`] on a directory tree
//! below [`FsConfig::root`]. It supports read, write and list; presigning
//! and multipart uploads report `Unsupported`.

pub mod backend;
pub mod config;
mod lister;

pub use backend::FsBackend;
pub use config::FsConfig;
