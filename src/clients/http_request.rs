//! Requests sent through [`HttpClient`](crate::clients::HttpClient).

use std::collections::HashMap;
use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used against the Admin API.
///
/// GraphQL only needs `Post`; `Get` remains for REST reads such as
/// paginated listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "get",
            Self::Post => "post",
        })
    }
}

/// A request relative to the client's base path.
///
/// Bodies are always JSON.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let request = HttpRequest::builder(HttpMethod::Post, "graphql.json")
///     .body(json!({"query": "{ shop { name } }"}))
///     .tries(2)
///     .build()
///     .unwrap();
/// assert_eq!(request.tries, 2);
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method.
    pub http_method: HttpMethod,
    /// Path relative to the client's base path.
    pub path: String,
    /// JSON body.
    pub body: Option<serde_json::Value>,
    /// Query parameters.
    pub query: Option<HashMap<String, String>>,
    /// Headers added on top of the client's defaults.
    pub extra_headers: Option<HashMap<String, String>>,
    /// Number of attempts for retryable failures (default: 1).
    pub tries: u32,
}

impl HttpRequest {
    /// Creates a new builder.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Checks the request before it is sent.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if a POST has no body, a GET has
    /// one, or `tries` is zero.
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        match (self.http_method, &self.body) {
            (HttpMethod::Post, None) => {
                return Err(InvalidHttpRequestError::MissingBody {
                    method: self.http_method.to_string(),
                })
            }
            (HttpMethod::Get, Some(_)) => {
                return Err(InvalidHttpRequestError::UnexpectedBody {
                    method: self.http_method.to_string(),
                })
            }
            _ => {}
        }
        if self.tries == 0 {
            return Err(InvalidHttpRequestError::NoTries);
        }
        Ok(())
    }
}

/// Builder for [`HttpRequest`].
#[derive(Debug)]
pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            request: HttpRequest {
                http_method: method,
                path: path.into(),
                body: None,
                query: None,
                extra_headers: None,
                tries: 1,
            },
        }
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .query
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds a header, overriding a client default of the same name.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Merges a set of headers.
    #[must_use]
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.request
            .extra_headers
            .get_or_insert_with(HashMap::new)
            .extend(headers);
        self
    }

    /// Sets how many times a 429 or 500 response is retried in total.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.request.tries = tries;
        self
    }

    /// Builds and verifies the request.
    ///
    /// # Errors
    ///
    /// See [`HttpRequest::verify`].
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        self.request.verify()?;
        Ok(self.request)
    }
}
