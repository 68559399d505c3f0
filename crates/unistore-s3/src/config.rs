//! S3 backend configuration.
//!
//! Provides [`S3Config`] for configuring the S3 backend. Configuration values
//! can be loaded from environment variables via [`S3Config::from_env`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default service endpoint.
const DEFAULT_ENDPOINT: &str = "https://s3.amazonaws.com";
/// Default root inside the bucket.
const DEFAULT_ROOT: &str = "/";
/// Default per-request timeout, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors found while validating an [`S3Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No bucket was configured.
    #[error("Bucket must not be empty")]
    MissingBucket,

    /// The endpoint cannot be used as a URL prefix.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The SSE-C key is not valid base64.
    #[error("Server side encryption customer key is not valid base64: {0}")]
    InvalidCustomerKey(#[from] base64::DecodeError),
}

/// S3 backend configuration.
///
/// # Examples
///
/// ```
/// use unistore_s3::S3Config;
///
/// let config = S3Config::builder()
///     .bucket("photos".into())
///     .region(Some("eu-west-1".into()))
///     .build();
/// assert_eq!(config.endpoint, "https://s3.amazonaws.com");
/// assert_eq!(config.root, "/");
/// assert!(!config.enable_virtual_host_style);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(default, rename_all = "camelCase")]
pub struct S3Config {
    /// Bucket every object lives in.
    #[builder(default)]
    pub bucket: String,

    /// Service endpoint, with or without a scheme (`https://` is assumed).
    #[builder(default = String::from(DEFAULT_ENDPOINT))]
    pub endpoint: String,

    /// Prefix inside the bucket every object path is resolved against.
    #[builder(default = String::from(DEFAULT_ROOT))]
    pub root: String,

    /// Bucket region. Detected from the endpoint when absent.
    #[builder(default)]
    pub region: Option<String>,

    /// Access key id. Empty keys mean anonymous access.
    #[builder(default)]
    pub access_key_id: String,

    /// Secret access key.
    #[builder(default)]
    pub secret_access_key: String,

    /// Value of `x-amz-server-side-encryption` (e.g. `AES256`, `aws:kms`).
    #[builder(default)]
    pub server_side_encryption: Option<String>,

    /// KMS key id used with `aws:kms` encryption.
    #[builder(default)]
    pub server_side_encryption_aws_kms_key_id: Option<String>,

    /// SSE-C algorithm, usually `AES256`.
    #[builder(default)]
    pub server_side_encryption_customer_algorithm: Option<String>,

    /// SSE-C key, base64 encoded.
    #[builder(default)]
    pub server_side_encryption_customer_key: Option<String>,

    /// Base64 MD5 digest of the SSE-C key. Derived from the key when absent.
    #[builder(default)]
    pub server_side_encryption_customer_key_md5: Option<String>,

    /// Address the bucket as `bucket.endpoint` instead of `endpoint/bucket`.
    #[builder(default = false)]
    pub enable_virtual_host_style: bool,

    /// Deadline of every request, in seconds.
    #[builder(default = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            endpoint: String::from(DEFAULT_ENDPOINT),
            root: String::from(DEFAULT_ROOT),
            region: None,
            access_key_id: String::new(),
            secret_access_key: String::new(),
            server_side_encryption: None,
            server_side_encryption_aws_kms_key_id: None,
            server_side_encryption_customer_algorithm: None,
            server_side_encryption_customer_key: None,
            server_side_encryption_customer_key_md5: None,
            enable_virtual_host_style: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl S3Config {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `UNISTORE_S3_BUCKET` | (empty) |
    /// | `UNISTORE_S3_ENDPOINT` | `https://s3.amazonaws.com` |
    /// | `UNISTORE_S3_ROOT` | `/` |
    /// | `UNISTORE_S3_REGION` | (detected) |
    /// | `UNISTORE_S3_ACCESS_KEY_ID` | (empty) |
    /// | `UNISTORE_S3_SECRET_ACCESS_KEY` | (empty) |
    /// | `UNISTORE_S3_SSE` | (unset) |
    /// | `UNISTORE_S3_SSE_KMS_KEY_ID` | (unset) |
    /// | `UNISTORE_S3_SSE_CUSTOMER_ALGORITHM` | (unset) |
    /// | `UNISTORE_S3_SSE_CUSTOMER_KEY` | (unset) |
    /// | `UNISTORE_S3_SSE_CUSTOMER_KEY_MD5` | (derived) |
    /// | `UNISTORE_S3_VIRTUAL_HOST_STYLE` | `false` |
    /// | `UNISTORE_S3_TIMEOUT_SECS` | `60` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("UNISTORE_S3_BUCKET") {
            config.bucket = v;
        }
        if let Ok(v) = std::env::var("UNISTORE_S3_ENDPOINT") {
            config.endpoint = v;
        }
        if let Ok(v) = std::env::var("UNISTORE_S3_ROOT") {
            config.root = v;
        }
        config.region = non_empty_var("UNISTORE_S3_REGION");
        if let Ok(v) = std::env::var("UNISTORE_S3_ACCESS_KEY_ID") {
            config.access_key_id = v;
        }
        if let Ok(v) = std::env::var("UNISTORE_S3_SECRET_ACCESS_KEY") {
            config.secret_access_key = v;
        }
        config.server_side_encryption = non_empty_var("UNISTORE_S3_SSE");
        config.server_side_encryption_aws_kms_key_id = non_empty_var("UNISTORE_S3_SSE_KMS_KEY_ID");
        config.server_side_encryption_customer_algorithm =
            non_empty_var("UNISTORE_S3_SSE_CUSTOMER_ALGORITHM");
        config.server_side_encryption_customer_key = non_empty_var("UNISTORE_S3_SSE_CUSTOMER_KEY");
        config.server_side_encryption_customer_key_md5 =
            non_empty_var("UNISTORE_S3_SSE_CUSTOMER_KEY_MD5");
        if let Ok(v) = std::env::var("UNISTORE_S3_VIRTUAL_HOST_STYLE") {
            config.enable_virtual_host_style = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("UNISTORE_S3_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.timeout_secs = n;
            }
        }

        config
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the bucket is empty, the endpoint is
    /// blank or the SSE-C key cannot be decoded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.is_empty() {
            return Err(ConfigError::MissingBucket);
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        self.customer_key_md5()?;
        Ok(())
    }

    /// MD5 digest of the SSE-C key as sent in
    /// `x-amz-server-side-encryption-customer-key-MD5`.
    ///
    /// An explicitly configured digest wins; otherwise it is computed from
    /// the decoded key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCustomerKey`] if the key is not base64.
    pub fn customer_key_md5(&self) -> Result<Option<String>, ConfigError> {
        if let Some(md5) = &self.server_side_encryption_customer_key_md5 {
            return Ok(Some(md5.clone()));
        }
        let Some(key) = &self.server_side_encryption_customer_key else {
            return Ok(None);
        };
        let raw = BASE64.decode(key)?;
        Ok(Some(BASE64.encode(Md5::digest(&raw))))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
