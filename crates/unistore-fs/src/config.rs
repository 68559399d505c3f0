//! Filesystem backend configuration.
//!
//! Provides [`FsConfig`], loadable from environment variables.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default directory the backend is rooted at.
const DEFAULT_ROOT: &str = "/tmp/unistore";

/// Filesystem backend configuration.
///
/// # Examples
///
/// ```
/// use unistore_fs::FsConfig;
///
/// let config = FsConfig::builder().root("/data".into()).build();
/// assert_eq!(config.root, "/data");
/// assert_eq!(FsConfig::default().root, "/tmp/unistore");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(default, rename_all = "camelCase")]
pub struct FsConfig {
    /// Directory every object path is resolved against.
    #[builder(default = String::from(DEFAULT_ROOT))]
    pub root: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            root: String::from(DEFAULT_ROOT),
        }
    }
}

impl FsConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `UNISTORE_FS_ROOT` | `/tmp/unistore` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("UNISTORE_FS_ROOT") {
            config.root = v;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_load_from_env() {
        let config = FsConfig::from_env();
        assert!(!config.root.is_empty());
    }

    #[test]
    fn test_should_deserialize_with_defaults() {
        let config: FsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, FsConfig::default());

        let config: FsConfig = serde_json::from_str(r#"{"root":"/srv/data"}"#).unwrap();
        assert_eq!(config.root, "/srv/data");
    }
}
