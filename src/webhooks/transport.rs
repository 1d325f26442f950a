//! The GraphQL seam used by subscription registration.

use serde_json::Value;

use crate::clients::{GraphqlClient, GraphqlError};
use crate::config::ApiVersion;
use crate::webhooks::handlers::BoxFuture;

/// Executes GraphQL documents against one shop's Admin API.
///
/// [`GraphqlClient`] is the production implementation. The reconciler only
/// needs the response body and the API version the documents target.
pub trait GraphqlTransport: Send + Sync {
    /// Returns the API version documents are executed against.
    fn api_version(&self) -> &ApiVersion;

    /// Executes `document` and returns the JSON response body.
    ///
    /// GraphQL `errors` inside a successful response are part of the body,
    /// not an `Err`.
    fn execute<'a>(&'a self, document: &'a str) -> BoxFuture<'a, Result<Value, GraphqlError>>;
}

impl GraphqlTransport for GraphqlClient {
    fn api_version(&self) -> &ApiVersion {
        Self::api_version(self)
    }

    fn execute<'a>(&'a self, document: &'a str) -> BoxFuture<'a, Result<Value, GraphqlError>> {
        Box::pin(async move {
            let response = self.query(document, None, None, None).await?;
            Ok(response.body)
        })
    }
}
