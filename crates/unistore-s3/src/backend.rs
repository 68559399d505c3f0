//! The S3 [`Accessor`].
//!
//! Objects map onto keys below the configured root inside one bucket. S3 has
//! no directories: a path ending with `/` is a key prefix, listed with the
//! `/` delimiter, and a directory that holds no marker object still stats as
//! a directory.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use http::header::ETAG;
use tracing::{debug, info};
use unistore_auth::{AnonymousSigner, Credentials, SigV4Signer, Signer};
use unistore_core::path::normalize_root;
use unistore_core::{
    AbortMultipartOptions, Accessor, AccessorMetadata, Capability, CompleteMultipartOptions,
    CreateMultipartOptions, CreateOptions, DeleteOptions, Error, ErrorKind, ListOptions,
    ObjectMetadata, ObjectMode, ObjectPart, ObjectStream, Operation, PreSignOperation,
    PreSignOptions, PresignedRequest, ReadOptions, Reader, Result, Scheme, StatOptions,
    WriteMultipartOptions, WriteOptions,
};
use unistore_s3_xml::{InitiateMultipartUploadResult, from_xml, root_element_name};

use crate::config::S3Config;
use crate::error::{error_document, parse_error, xml_error};
use crate::lister::S3Lister;
use crate::region::{bucket_endpoint, detect_region, normalize_endpoint};
use crate::request::{S3Core, parse_metadata, read_body};
use crate::transport::{HttpClient, ReqwestClient};

/// Signing service name of S3.
const SERVICE: &str = "s3";

/// S3 backend.
///
/// Construction resolves the bucket region (unless configured) and fixes
/// the bucket addressing style; afterwards the backend is immutable and
/// cheap to clone.
///
/// # Examples
///
/// ```no_run
/// use unistore_core::Operator;
/// use unistore_s3::{S3Backend, S3Config};
///
/// let config = S3Config::builder()
///     .bucket("photos".into())
///     .region(Some("us-east-1".into()))
///     .access_key_id("AKID".into())
///     .secret_access_key("SECRET".into())
///     .build();
/// let op = Operator::from_accessor(S3Backend::new(&config)?);
/// op.object("hello.txt").write("hi")?;
/// # Ok::<(), unistore_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct S3Backend {
    core: Arc<S3Core>,
}

impl S3Backend {
    /// Create a backend using a `reqwest` transport with the configured timeout.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid, the transport cannot be
    /// initialized or region detection fails.
    pub fn new(config: &S3Config) -> Result<Self> {
        config.validate()?;
        let client = ReqwestClient::new(Duration::from_secs(config.timeout_secs)).map_err(|e| {
            Error::new(ErrorKind::Other, "cannot initialize http client").with_source(e)
        })?;
        Self::with_client(config, Arc::new(client))
    }

    /// Create a backend sending requests through `client`.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or region detection fails.
    pub fn with_client(config: &S3Config, client: Arc<dyn HttpClient>) -> Result<Self> {
        config.validate()?;

        let endpoint = normalize_endpoint(&config.endpoint, &config.bucket);
        let region = match config.region.as_deref().filter(|r| !r.is_empty()) {
            Some(region) => region.to_owned(),
            None => detect_region(client.as_ref(), &endpoint, &config.bucket)?,
        };
        let endpoint = bucket_endpoint(&endpoint, &config.bucket, config.enable_virtual_host_style);

        let credentials = Credentials::new(&config.access_key_id, &config.secret_access_key);
        let signer: Box<dyn Signer> = if credentials.is_anonymous() {
            Box::new(AnonymousSigner)
        } else {
            Box::new(SigV4Signer::new(credentials, region.clone(), SERVICE))
        };

        let root = normalize_root(&config.root);
        info!(
            bucket = %config.bucket,
            endpoint = %endpoint,
            region = %region,
            root = %root,
            "Created S3 backend"
        );
        let core = S3Core::new(config, endpoint, root, region, signer, client)?;
        Ok(Self {
            core: Arc::new(core),
        })
    }

    /// The bucket region requests are signed for.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.core.region
    }

    /// The bucket-addressed endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.core.endpoint
    }
}

impl Accessor for S3Backend {
    fn metadata(&self) -> AccessorMetadata {
        AccessorMetadata {
            scheme: Scheme::S3,
            root: self.core.root.clone(),
            name: self.core.bucket.clone(),
            capability: Capability::READ
                | Capability::WRITE
                | Capability::LIST
                | Capability::PRESIGN
                | Capability::MULTIPART
                | Capability::BLOCKING,
        }
    }

    fn create(&self, path: &str, _args: &CreateOptions) -> Result<()> {
        let op = Operation::Create;
        let req = self.core.put_object_request(op, path, Some(Bytes::new()))?;
        let resp = self.core.send(op, path, req)?;
        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            _ => Err(parse_error(op, path, resp)),
        }
    }

    fn read(&self, path: &str, args: &ReadOptions) -> Result<Reader> {
        let op = Operation::Read;
        let range = args.range();
        if range.is_empty() {
            debug!(path, "Empty read window, skipping request");
            return Ok(Box::new(io::empty()));
        }

        let req = self.core.get_object_request(op, path, range)?;
        let resp = self.core.send(op, path, req)?;
        match resp.status() {
            StatusCode::OK | StatusCode::PARTIAL_CONTENT => Ok(resp.into_body()),
            _ => Err(parse_error(op, path, resp)),
        }
    }

    fn write(&self, path: &str, _args: &WriteOptions, body: Bytes) -> Result<u64> {
        let op = Operation::Write;
        let size = body.len() as u64;
        let req = self.core.put_object_request(op, path, Some(body))?;
        let resp = self.core.send(op, path, req)?;
        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(size),
            _ => Err(parse_error(op, path, resp)),
        }
    }

    fn stat(&self, path: &str, _args: &StatOptions) -> Result<ObjectMetadata> {
        let op = Operation::Stat;
        if path == "/" {
            return Ok(ObjectMetadata::new(ObjectMode::Dir));
        }

        let req = self.core.head_object_request(op, path)?;
        let resp = self.core.send(op, path, req)?;
        match resp.status() {
            StatusCode::OK => parse_metadata(op, path, resp.headers()),
            StatusCode::NOT_FOUND if path.ends_with('/') => {
                Ok(ObjectMetadata::new(ObjectMode::Dir).with_content_length(0))
            }
            _ => Err(parse_error(op, path, resp)),
        }
    }

    fn delete(&self, path: &str, _args: &DeleteOptions) -> Result<()> {
        let op = Operation::Delete;
        let req = self.core.delete_object_request(op, path)?;
        let resp = self.core.send(op, path, req)?;
        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(parse_error(op, path, resp)),
        }
    }

    fn list(&self, path: &str, _args: &ListOptions) -> Result<ObjectStream> {
        let accessor: Arc<dyn Accessor> = Arc::new(self.clone());
        Ok(ObjectStream::new(S3Lister::new(
            accessor,
            Arc::clone(&self.core),
            path,
        )))
    }

    fn presign(&self, path: &str, args: &PreSignOptions) -> Result<PresignedRequest> {
        let op = Operation::PreSign;
        let req = match &args.operation {
            PreSignOperation::Read { range } => self.core.get_object_request(op, path, *range)?,
            PreSignOperation::Write => self.core.put_object_request(op, path, None)?,
            PreSignOperation::WriteMultipart {
                upload_id,
                part_number,
            } => self
                .core
                .upload_part_request(op, path, upload_id, *part_number, None)?,
        };
        self.core.presign(op, path, req, args.expire)
    }

    fn create_multipart(&self, path: &str, _args: &CreateMultipartOptions) -> Result<String> {
        let op = Operation::CreateMultipart;
        let req = self.core.initiate_multipart_request(op, path)?;
        let resp = self.core.send(op, path, req)?;
        if resp.status() != StatusCode::OK {
            return Err(parse_error(op, path, resp));
        }

        let body = read_body(op, path, resp)?;
        let output: InitiateMultipartUploadResult =
            from_xml(&body).map_err(|e| xml_error(op, path, e))?;
        debug!(path, upload_id = %output.upload_id, "Initiated multipart upload");
        Ok(output.upload_id)
    }

    fn write_multipart(
        &self,
        path: &str,
        args: &WriteMultipartOptions,
        body: Bytes,
    ) -> Result<ObjectPart> {
        let op = Operation::WriteMultipart;
        let req = self.core.upload_part_request(
            op,
            path,
            &args.upload_id,
            args.part_number,
            Some(body),
        )?;
        let resp = self.core.send(op, path, req)?;
        if resp.status() != StatusCode::OK {
            return Err(parse_error(op, path, resp));
        }

        let etag = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                Error::new(ErrorKind::Other, "upload part response has no etag")
                    .with_operation(op)
                    .with_path(path)
            })?;
        Ok(ObjectPart::new(args.part_number, etag))
    }

    fn complete_multipart(&self, path: &str, args: &CompleteMultipartOptions) -> Result<()> {
        let op = Operation::CompleteMultipart;
        let req = self
            .core
            .complete_multipart_request(op, path, &args.upload_id, &args.parts)?;
        let resp = self.core.send(op, path, req)?;
        if resp.status() != StatusCode::OK {
            return Err(parse_error(op, path, resp));
        }

        // A failure after the 200 status line is reported in the body.
        let body = read_body(op, path, resp)?;
        if root_element_name(&body).as_deref() == Some("Error") {
            return Err(error_document(op, path, body));
        }
        Ok(())
    }

    fn abort_multipart(&self, path: &str, args: &AbortMultipartOptions) -> Result<()> {
        let op = Operation::AbortMultipart;
        let req = self
            .core
            .abort_multipart_request(op, path, &args.upload_id)?;
        let resp = self.core.send(op, path, req)?;
        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(parse_error(op, path, resp)),
        }
    }
}
