//! Behavior tests for unistore backends.
//!
//! Every check runs against the filesystem backend on a fresh temp dir. The
//! S3 variants are marked `#[ignore]`: they need a live endpoint described by
//! the `UNISTORE_S3_*` environment variables.
//!
//! Run them with:
//! ```text
//! UNISTORE_S3_BUCKET=test UNISTORE_S3_ENDPOINT=http://127.0.0.1:9000 \
//!   cargo test -p unistore-integration -- --ignored
//! ```
//!
//! Set `UNISTORE_TEST_DEBUG=on` to stack a logging layer on every operator.

use std::sync::Once;

use rand::Rng;
use tempfile::TempDir;
use unistore::layers::{LoggingLayer, RetryLayer};
use unistore::services::fs::{FsBackend, FsConfig};
use unistore::services::s3::{S3Backend, S3Config};
use unistore::Operator;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .init();
    });
}

/// An operator plus whatever must outlive it.
#[derive(Debug)]
pub struct Fixture {
    /// The operator under test.
    pub op: Operator,
    _dir: Option<TempDir>,
}

fn decorate(op: Operator) -> Operator {
    if std::env::var("UNISTORE_TEST_DEBUG").is_ok_and(|v| v == "on") {
        op.layer(LoggingLayer::new())
    } else {
        op
    }
}

/// A filesystem operator rooted at a new temp dir.
#[must_use]
pub fn fs_fixture() -> Fixture {
    init_tracing();
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("failed to create temp dir: {e}"));
    let config = FsConfig::builder()
        .root(dir.path().display().to_string())
        .build();
    Fixture {
        op: decorate(Operator::from_accessor(FsBackend::new(&config))),
        _dir: Some(dir),
    }
}

/// An S3 operator configured from the environment, rooted at a unique prefix.
pub fn s3_fixture() -> anyhow::Result<Fixture> {
    init_tracing();
    let mut config = S3Config::from_env();
    anyhow::ensure!(!config.bucket.is_empty(), "UNISTORE_S3_BUCKET is not set");
    config.root = format!("/unistore-test-{}/", uuid::Uuid::new_v4());

    let op = Operator::from_accessor(S3Backend::new(&config)?).layer(RetryLayer::new());
    Ok(Fixture {
        op: decorate(op),
        _dir: None,
    })
}

/// A fresh path that no other check uses.
#[must_use]
pub fn unique_path() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// `size` random bytes.
#[must_use]
pub fn gen_bytes(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size];
    rand::rng().fill(buf.as_mut_slice());
    buf
}

/// A random `(offset, len)` window inside `size` bytes.
///
/// The window is non-empty unless `size` is zero.
#[must_use]
pub fn gen_offset_len(size: u64) -> (u64, u64) {
    if size < 2 {
        return (0, size);
    }
    let mut rng = rand::rng();
    let offset = rng.random_range(0..size);
    let len = rng.random_range(1..=size - offset);
    (offset, len)
}

/// Generate a filesystem test and an ignored S3 test for every check.
///
/// Each check is a `fn(&Operator) -> anyhow::Result<()>` in the invoking
/// module.
#[macro_export]
macro_rules! behavior_tests {
    ($($check:ident),+ $(,)?) => {
        mod fs {
            $(
                #[test]
                fn $check() -> anyhow::Result<()> {
                    let fixture = $crate::fs_fixture();
                    super::$check(&fixture.op)
                }
            )+
        }

        mod s3 {
            $(
                #[test]
                #[ignore = "requires S3 endpoint"]
                fn $check() -> anyhow::Result<()> {
                    let fixture = $crate::s3_fixture()?;
                    super::$check(&fixture.op)
                }
            )+
        }
    };
}

#[cfg(test)]
mod test_basic;
#[cfg(test)]
mod test_list;
#[cfg(test)]
mod test_multipart;
#[cfg(test)]
mod test_read_write;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_generate_windows_for_small_sizes() {
        assert_eq!(gen_offset_len(0), (0, 0));
        assert_eq!(gen_offset_len(1), (0, 1));

        for _ in 0..64 {
            let (offset, len) = gen_offset_len(2);
            assert!(len >= 1);
            assert!(offset + len <= 2);
        }
    }
}
