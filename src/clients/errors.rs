//! Error types for the HTTP transport.
//!
//! [`HttpError`] is what every Admin API call can fail with. Registration
//! surfaces it (wrapped in [`GraphqlError`](crate::clients::GraphqlError))
//! without retrying beyond what the request asked for.

use thiserror::Error;

/// A non-2xx response from the Admin API.
///
/// `message` is a compact JSON rendering of the error fields found in the
/// response body (`errors`, `error`, `error_description`) plus an
/// `error_reference` naming the `X-Request-Id`, when the server sent one.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 401,
///     message: r#"{"errors":"Invalid API key or access token"}"#.to_string(),
///     error_reference: Some("req-1".to_string()),
/// };
/// assert!(error.to_string().contains("Invalid API key"));
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Serialized error fields from the response body.
    pub message: String,
    /// The `X-Request-Id` of the failed response.
    pub error_reference: Option<String>,
}

/// Every attempt of a retryable request (429 or 500) failed.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last message: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// The status code of the last response.
    pub code: u16,
    /// How many attempts were made.
    pub tries: u32,
    /// Serialized error fields from the last response.
    pub message: String,
    /// The `X-Request-Id` of the last response.
    pub error_reference: Option<String>,
}

/// A request rejected locally, before anything was sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST request without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The method that needs a body.
        method: String,
    },

    /// A GET request with a body.
    #[error("Cannot send a body with {method}.")]
    UnexpectedBody {
        /// The method that must not carry a body.
        method: String,
    },

    /// A request configured with zero attempts.
    #[error("A request must be attempted at least once.")]
    NoTries,
}

/// Unified error type for the HTTP transport.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Non-2xx response.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Retries exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// The request failed local validation.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the HTTP status code that caused this error, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::MaxRetries(e) => Some(e.code),
            Self::InvalidRequest(_) | Self::Network(_) => None,
        }
    }
}
