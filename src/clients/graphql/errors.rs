//! Error type for GraphQL Admin API calls.

use crate::clients::HttpError;
use thiserror::Error;

/// A GraphQL call that failed below the GraphQL layer.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::clients::{GraphqlError, HttpError, HttpResponseError};
///
/// let error: GraphqlError = HttpError::Response(HttpResponseError {
///     code: 401,
///     message: r#"{"errors":"Unauthorized"}"#.to_string(),
///     error_reference: None,
/// })
/// .into();
/// assert!(error.to_string().contains("Unauthorized"));
/// ```
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// Network error, non-2xx response or retry exhaustion.
    #[error(transparent)]
    Http(#[from] HttpError),
}
