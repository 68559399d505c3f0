//! Retry layer.
//!
//! [`RetryAccessor`] re-issues an operation of the wrapped backend while it
//! fails with [`ErrorKind::Interrupted`], pausing between attempts as told by
//! a [`RetryStrategy`]. Every other error is returned on the first attempt.
//! Pauses block the calling thread.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use rand::Rng;
use tracing::warn;
use typed_builder::TypedBuilder;
use unistore_core::{
    AbortMultipartOptions, Accessor, AccessorMetadata, CompleteMultipartOptions,
    CreateMultipartOptions, CreateOptions, DeleteOptions, Layer, ListOptions, ObjectMetadata,
    ObjectPart, ObjectStream, Operation, PreSignOptions, PresignedRequest, ReadOptions, Reader,
    Result, StatOptions, WriteMultipartOptions, WriteOptions,
};

/// Decides whether, and after which pause, a failed attempt is retried.
pub trait RetryStrategy: Send + Sync + fmt::Debug {
    /// The pause before retry number `attempt` (starting at 1), or `None`
    /// to give up.
    fn delay(&self, attempt: u32) -> Option<Duration>;
}

/// Exponential backoff with jitter.
///
/// The pause before retry `n` is `base_delay * factor^(n-1)`, capped at
/// `max_delay` and scaled by a random factor in `[1 - jitter, 1 + jitter]`.
/// `max_attempts` counts the first attempt too.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use unistore_layers::{ExponentialBackoff, RetryStrategy};
///
/// let backoff = ExponentialBackoff::builder().jitter(0.0).build();
/// assert_eq!(backoff.delay(1), Some(Duration::from_millis(10)));
/// assert_eq!(backoff.delay(3), Some(Duration::from_millis(40)));
/// assert_eq!(backoff.delay(5), None);
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct ExponentialBackoff {
    /// Total attempts, the first one included.
    #[builder(default = 5)]
    pub max_attempts: u32,

    /// Pause before the first retry.
    #[builder(default = Duration::from_millis(10))]
    pub base_delay: Duration,

    /// Growth factor between consecutive pauses.
    #[builder(default = 2.0)]
    pub factor: f64,

    /// Upper bound of a pause before jitter.
    #[builder(default = Duration::from_secs(1))]
    pub max_delay: Duration,

    /// Relative deviation applied to each pause, in `[0, 1]`.
    #[builder(default = 0.5)]
    pub jitter: f64,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let raw = self.base_delay.as_secs_f64() * self.factor.powi(exponent);
        let capped = raw.min(self.max_delay.as_secs_f64());

        let jitter = self.jitter.clamp(0.0, 1.0);
        let scaled = if jitter > 0.0 {
            capped * rand::rng().random_range((1.0 - jitter)..=(1.0 + jitter))
        } else {
            capped
        };
        // Jitter may push a pause near `Duration::MAX` past what fits.
        Some(Duration::try_from_secs_f64(scaled.max(0.0)).unwrap_or(self.max_delay))
    }
}

/// Layer wrapping a backend in a [`RetryAccessor`].
#[derive(Debug, Clone)]
pub struct RetryLayer {
    strategy: Arc<dyn RetryStrategy>,
}

impl RetryLayer {
    /// A layer using [`ExponentialBackoff`] with its defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategy(ExponentialBackoff::default())
    }

    /// A layer using a custom strategy.
    pub fn with_strategy(strategy: impl RetryStrategy + 'static) -> Self {
        Self {
            strategy: Arc::new(strategy),
        }
    }
}

impl Default for RetryLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for RetryLayer {
    fn layer(&self, inner: Arc<dyn Accessor>) -> Arc<dyn Accessor> {
        Arc::new(RetryAccessor {
            inner,
            strategy: Arc::clone(&self.strategy),
        })
    }
}

/// Backend decorator retrying interrupted operations.
#[derive(Debug)]
pub struct RetryAccessor {
    inner: Arc<dyn Accessor>,
    strategy: Arc<dyn RetryStrategy>,
}

impl RetryAccessor {
    fn retry<T>(&self, op: Operation, path: &str, mut call: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 0;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => {
                    attempt += 1;
                    let Some(delay) = self.strategy.delay(attempt) else {
                        return Err(err);
                    };
                    warn!(
                        operation = op.as_str(),
                        path,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Retrying interrupted operation"
                    );
                    thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Accessor for RetryAccessor {
    fn metadata(&self) -> AccessorMetadata {
        self.inner.metadata()
    }

    fn create(&self, path: &str, args: &CreateOptions) -> Result<()> {
        self.retry(Operation::Create, path, || self.inner.create(path, args))
    }

    fn read(&self, path: &str, args: &ReadOptions) -> Result<Reader> {
        self.retry(Operation::Read, path, || self.inner.read(path, args))
    }

    fn write(&self, path: &str, args: &WriteOptions, body: Bytes) -> Result<u64> {
        self.retry(Operation::Write, path, || {
            self.inner.write(path, args, body.clone())
        })
    }

    fn stat(&self, path: &str, args: &StatOptions) -> Result<ObjectMetadata> {
        self.retry(Operation::Stat, path, || self.inner.stat(path, args))
    }

    fn delete(&self, path: &str, args: &DeleteOptions) -> Result<()> {
        self.retry(Operation::Delete, path, || self.inner.delete(path, args))
    }

    fn list(&self, path: &str, args: &ListOptions) -> Result<ObjectStream> {
        self.retry(Operation::List, path, || self.inner.list(path, args))
    }

    fn presign(&self, path: &str, args: &PreSignOptions) -> Result<PresignedRequest> {
        self.retry(Operation::PreSign, path, || self.inner.presign(path, args))
    }

    fn create_multipart(&self, path: &str, args: &CreateMultipartOptions) -> Result<String> {
        self.retry(Operation::CreateMultipart, path, || {
            self.inner.create_multipart(path, args)
        })
    }

    fn write_multipart(
        &self,
        path: &str,
        args: &WriteMultipartOptions,
        body: Bytes,
    ) -> Result<ObjectPart> {
        self.retry(Operation::WriteMultipart, path, || {
            self.inner.write_multipart(path, args, body.clone())
        })
    }

    fn complete_multipart(&self, path: &str, args: &CompleteMultipartOptions) -> Result<()> {
        self.retry(Operation::CompleteMultipart, path, || {
            self.inner.complete_multipart(path, args)
        })
    }

    fn abort_multipart(&self, path: &str, args: &AbortMultipartOptions) -> Result<()> {
        self.retry(Operation::AbortMultipart, path, || {
            self.inner.abort_multipart(path, args)
        })
    }
}
