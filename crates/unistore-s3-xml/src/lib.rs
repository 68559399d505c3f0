//! XML bodies of the S3 REST protocol for unistore.
//!
//! This crate converts between the typed request/response bodies the S3
//! client exchanges and their XML wire format.
//!
//! # Key components
//!
//! - [`S3Deserialize`] trait and [`from_xml`] for parsing response bodies
//! - [`S3Serialize`] trait and [`to_xml`] for building request bodies
//! - [`error_to_xml`] for rendering S3 `<Error>` documents in test doubles
//! - [`types`] for the typed bodies themselves

pub mod deserialize;
pub mod error;
pub mod serialize;
pub mod types;

pub use deserialize::{S3Deserialize, from_xml, root_element_name};
pub use error::XmlError;
pub use serialize::{S3_NAMESPACE, S3Serialize, to_xml};
pub use types::{
    CompleteMultipartUpload, CompletedPart, ErrorDocument, InitiateMultipartUploadResult,
    ListBucketResult, ListedObject,
};
