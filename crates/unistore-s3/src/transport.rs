//! HTTP transport used by the S3 backend.
//!
//! The backend builds and signs `http::Request<Bytes>` values and hands them
//! to an [`HttpClient`]. [`ReqwestClient`] is the default implementation;
//! tests inject a scripted client instead.

use std::fmt;
use std::io::Read;
use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response};
use tracing::trace;

/// Streaming body of a response.
pub type HttpBody = Box<dyn Read + Send>;

/// Failure to exchange a request with the server.
///
/// A response with an error status is not a transport error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete before the deadline.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// No connection could be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Any other failure building or sending the request.
    #[error("Request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect(_))
    }
}

/// Sends one HTTP request and returns the response head with a streaming body.
pub trait HttpClient: Send + Sync + fmt::Debug {
    /// Execute `req`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if no response was received.
    fn send(&self, req: Request<Bytes>) -> Result<Response<HttpBody>, TransportError>;
}

/// [`HttpClient`] backed by a pooled `reqwest` blocking client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Create a client whose requests fail after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, req: Request<Bytes>) -> Result<Response<HttpBody>, TransportError> {
        let (parts, body) = req.into_parts();
        trace!(method = %parts.method, uri = %parts.uri, "Sending request");

        let resp = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .map_err(map_reqwest_error)?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let mut response = Response::builder()
            .status(status)
            .body(Box::new(resp) as HttpBody)
            .map_err(|e| TransportError::Request(e.to_string()))?;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! A scripted [`HttpClient`] recording every request it receives.

    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Arc;

    use http::StatusCode;
    use parking_lot::Mutex;

    use super::*;

    /// One scripted reply.
    pub(crate) enum Reply {
        Response {
            status: StatusCode,
            headers: Vec<(&'static str, String)>,
            body: Vec<u8>,
        },
        Fail(TransportError),
    }

    impl Reply {
        pub(crate) fn status(status: u16) -> Self {
            Self::Response {
                status: StatusCode::from_u16(status).unwrap(),
                headers: Vec::new(),
                body: Vec::new(),
            }
        }

        pub(crate) fn with_header(mut self, name: &'static str, value: &str) -> Self {
            if let Self::Response { headers, .. } = &mut self {
                headers.push((name, value.to_owned()));
            }
            self
        }

        pub(crate) fn with_body(mut self, content: impl Into<Vec<u8>>) -> Self {
            if let Self::Response { body, .. } = &mut self {
                *body = content.into();
            }
            self
        }
    }

    #[derive(Debug, Clone, Default)]
    pub(crate) struct MockClient {
        replies: Arc<Mutex<VecDeque<Reply>>>,
        requests: Arc<Mutex<Vec<Request<Bytes>>>>,
    }

    impl fmt::Debug for Reply {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Response { status, .. } => write!(f, "Reply({status})"),
                Self::Fail(err) => write!(f, "Reply({err})"),
            }
        }
    }

    impl MockClient {
        pub(crate) fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into_iter().collect())),
                requests: Arc::default(),
            }
        }

        pub(crate) fn requests(&self) -> Vec<Request<Bytes>> {
            self.requests
                .lock()
                .iter()
                .map(|req| {
                    let mut copy = Request::new(req.body().clone());
                    *copy.method_mut() = req.method().clone();
                    *copy.uri_mut() = req.uri().clone();
                    *copy.headers_mut() = req.headers().clone();
                    copy
                })
                .collect()
        }

        pub(crate) fn last_request(&self) -> Request<Bytes> {
            self.requests().pop().expect("no request was sent")
        }
    }

    impl HttpClient for MockClient {
        fn send(&self, req: Request<Bytes>) -> Result<Response<HttpBody>, TransportError> {
            self.requests.lock().push(req);
            match self.replies.lock().pop_front() {
                Some(Reply::Response {
                    status,
                    headers,
                    body,
                }) => {
                    let mut builder = Response::builder().status(status);
                    for (name, value) in headers {
                        builder = builder.header(name, value);
                    }
                    Ok(builder
                        .body(Box::new(Cursor::new(body)) as HttpBody)
                        .unwrap())
                }
                Some(Reply::Fail(err)) => Err(err),
                None => panic!("unexpected request, no reply scripted"),
            }
        }
    }
}
