//! [`GraphqlClient`] implementation.

use std::collections::HashMap;

use crate::auth::Session;
use crate::clients::graphql::GraphqlError;
use crate::clients::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::config::{ApiVersion, ShopifyConfig};

/// GraphQL Admin API client for one shop.
///
/// The API version comes from the config (or [`ApiVersion::latest`]) unless
/// overridden with [`with_version`](Self::with_version). The default number
/// of tries comes from [`ShopifyConfig::graphql_tries`].
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::{ApiVersion, GraphqlClient, Session, ShopDomain};
///
/// let session = Session::new(ShopDomain::new("my-store").unwrap(), "access-token");
/// let client = GraphqlClient::with_version(&session, None, ApiVersion::V2024_10);
/// assert_eq!(client.api_version(), &ApiVersion::V2024_10);
/// ```
#[derive(Debug)]
pub struct GraphqlClient {
    http_client: HttpClient,
    api_version: ApiVersion,
    tries: u32,
}

// Verify GraphqlClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlClient>();
};

impl GraphqlClient {
    /// Creates a client using the configured API version.
    #[must_use]
    pub fn new(session: &Session, config: Option<&ShopifyConfig>) -> Self {
        let api_version = config.map_or_else(ApiVersion::latest, |c| c.api_version().clone());
        Self::create_client(session, config, api_version)
    }

    /// Creates a client pinned to `version`, whatever the config says.
    #[must_use]
    pub fn with_version(
        session: &Session,
        config: Option<&ShopifyConfig>,
        version: ApiVersion,
    ) -> Self {
        if let Some(configured) = config.map(ShopifyConfig::api_version) {
            if configured == &version {
                tracing::debug!(
                    "GraphQL client has a redundant API version override to the default {}",
                    configured
                );
            } else {
                tracing::debug!(
                    "GraphQL client overriding default API version {} with {}",
                    configured,
                    version
                );
            }
        }

        Self::create_client(session, config, version)
    }

    fn create_client(
        session: &Session,
        config: Option<&ShopifyConfig>,
        api_version: ApiVersion,
    ) -> Self {
        let http_client = HttpClient::new(format!("/admin/api/{api_version}"), session, config);
        Self {
            http_client,
            api_version,
            tries: config.map_or(1, ShopifyConfig::graphql_tries),
        }
    }

    /// Returns the API version requests are sent to.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the default number of tries per request.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }

    /// Posts a GraphQL document.
    ///
    /// `tries` overrides the client's default for this call.
    ///
    /// # Errors
    ///
    /// Returns [`GraphqlError::Http`] for network errors, non-2xx responses
    /// and retry exhaustion. GraphQL `errors` in a 200 response are not
    /// errors here.
    pub async fn query(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
        headers: Option<HashMap<String, String>>,
        tries: Option<u32>,
    ) -> Result<HttpResponse, GraphqlError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let mut builder = HttpRequest::builder(HttpMethod::Post, "graphql.json")
            .body(body)
            .tries(tries.unwrap_or(self.tries));
        if let Some(extra_headers) = headers {
            builder = builder.headers(extra_headers);
        }

        let request = builder.build().map_err(|e| GraphqlError::Http(e.into()))?;
        Ok(self.http_client.request(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiSecretKey, ShopDomain};

    fn create_test_session() -> Session {
        Session::new(ShopDomain::new("test-shop").unwrap(), "test-access-token")
    }

    fn config(version: ApiVersion, tries: u32) -> ShopifyConfig {
        ShopifyConfig::builder()
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .api_version(version)
            .graphql_tries(tries)
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_without_config_uses_latest_version() {
        let client = GraphqlClient::new(&create_test_session(), None);

        assert_eq!(client.api_version(), &ApiVersion::latest());
        assert_eq!(client.tries(), 1);
    }

    #[test]
    fn test_new_uses_config_version_and_tries() {
        let config = config(ApiVersion::V2024_10, 3);
        let client = GraphqlClient::new(&create_test_session(), Some(&config));

        assert_eq!(client.api_version(), &ApiVersion::V2024_10);
        assert_eq!(client.tries(), 3);
        assert_eq!(client.http_client.base_path(), "/admin/api/2024-10");
    }

    #[test]
    fn test_with_version_overrides_config() {
        let config = config(ApiVersion::V2024_10, 1);
        let client =
            GraphqlClient::with_version(
                &create_test_session(),
                Some(&config),
                ApiVersion::V2024_07,
            );

        assert_eq!(client.api_version(), &ApiVersion::V2024_07);
        assert_eq!(client.http_client.base_path(), "/admin/api/2024-07");
    }
}
