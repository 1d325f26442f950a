//! Admin API transport.
//!
//! - [`HttpClient`], [`HttpRequest`], [`HttpResponse`]: authenticated HTTP
//!   with bounded retry and `Link`-header cursor parsing
//! - [`GraphqlClient`]: the GraphQL endpoint, used to manage webhook
//!   subscriptions
//!
//! # Retry Behavior
//!
//! - **429**: waits for `Retry-After`, or one second without it
//! - **500**: waits one second
//! - **Other non-2xx**: fails immediately
//!
//! Requests are attempted once unless `tries` says otherwise.

mod errors;
pub mod graphql;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use graphql::{GraphqlClient, GraphqlError};
pub use http_client::{HttpClient, RETRY_WAIT_TIME, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{HttpResponse, PaginationInfo};
