use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::domain::{ApiError, BadRequestError, ValidationError};
use crate::transport::HttpResponse;

/// Result alias used across the client API.
pub type XmsResult<T> = Result<T, XmsError>;

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`Connection`](crate::Connection) operations.
///
/// `Validation`, `NotStarted`, `Closed` and `Encode` are returned synchronously
/// when an operation is issued; all other kinds resolve the returned future.
/// Nothing is retried.
pub enum XmsError {
    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The connection has not been started.
    #[error("connection is not started")]
    NotStarted,

    /// The connection has been closed, or its worker pool shut down mid-request.
    #[error("connection is closed")]
    Closed,

    /// Structured application error from a 400/403 response.
    #[error("API error: {0}")]
    Api(ApiError),

    /// Alternate error shape from a 400/403 response.
    #[error("bad request: {0}")]
    BadRequest(BadRequestError),

    /// 404 for the given request path.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// 401; the token was rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// Any other status; the full response is kept for inspection.
    #[error("unexpected response: {}", .0.status())]
    UnexpectedResponse(Box<UnexpectedResponse>),

    /// Response body could not be decoded as the expected shape.
    #[error("parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl XmsError {
    /// Returns `true` for errors caused by how the connection was used rather
    /// than by the remote service.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::NotStarted | Self::Closed)
    }
}

#[derive(Clone)]
/// Response with a status the client does not handle.
pub struct UnexpectedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl UnexpectedResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl From<HttpResponse> for UnexpectedResponse {
    fn from(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}

impl fmt::Debug for UnexpectedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnexpectedResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body_text())
            .finish()
    }
}
