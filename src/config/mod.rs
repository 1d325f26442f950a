//! Configuration for webhook registration and processing.
//!
//! - [`ShopifyConfig`] holds the validated settings shared by the registry,
//!   the inbound processor and the Admin API clients.
//! - [`ShopifyConfigBuilder`] constructs it.
//! - [`ApiSecretKey`], [`ShopDomain`] and [`HostUrl`] are validated newtypes.
//! - [`ApiVersion`] selects the Admin API release and gates Pub/Sub delivery.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::{ApiSecretKey, ApiVersion, HostUrl, ShopifyConfig};
//!
//! let config = ShopifyConfig::builder()
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .api_version(ApiVersion::V2025_01)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.graphql_tries(), 1);
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiSecretKey, HostUrl, ShopDomain};
pub use version::{ApiVersion, PUBSUB_MINIMUM_RELEASE};

use crate::error::ConfigError;

/// Validated settings for webhook registration and processing.
///
/// # Key Rotation
///
/// When `old_api_secret_key` is set, inbound webhook verification tries the
/// primary key first and falls back to the old one, so deliveries signed
/// before a secret rotation are still accepted.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::{ApiSecretKey, ShopifyConfig};
///
/// let config = ShopifyConfig::builder()
///     .api_secret_key(ApiSecretKey::new("new-secret").unwrap())
///     .old_api_secret_key(ApiSecretKey::new("old-secret").unwrap())
///     .build()
///     .unwrap();
///
/// assert!(config.old_api_secret_key().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct ShopifyConfig {
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    host: Option<HostUrl>,
    api_host: Option<HostUrl>,
    api_version: ApiVersion,
    graphql_tries: u32,
    user_agent_prefix: Option<String>,
}

impl ShopifyConfig {
    /// Creates a new builder for constructing a `ShopifyConfig`.
    #[must_use]
    pub fn builder() -> ShopifyConfigBuilder {
        ShopifyConfigBuilder::new()
    }

    /// Returns the API secret key used to verify webhook signatures.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the previous API secret key, if configured.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the application's public URL, if configured.
    ///
    /// Http webhook callback URLs are built from its origin.
    #[must_use]
    pub const fn host(&self) -> Option<&HostUrl> {
        self.host.as_ref()
    }

    /// Returns the Admin API origin override, if configured.
    #[must_use]
    pub const fn api_host(&self) -> Option<&HostUrl> {
        self.api_host.as_ref()
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns how many times a GraphQL request is attempted.
    #[must_use]
    pub const fn graphql_tries(&self) -> u32 {
        self.graphql_tries
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the secret keys to try, primary first.
    pub fn secret_keys(&self) -> impl Iterator<Item = &ApiSecretKey> {
        std::iter::once(&self.api_secret_key).chain(self.old_api_secret_key.as_ref())
    }
}

// Verify ShopifyConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyConfig>();
};

/// Builder for [`ShopifyConfig`].
///
/// Only `api_secret_key` is required.
///
/// # Defaults
///
/// - `api_version`: [`ApiVersion::latest`]
/// - `graphql_tries`: 1
/// - `host`, `api_host`, `old_api_secret_key`, `user_agent_prefix`: `None`
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::{ApiSecretKey, ApiVersion, HostUrl, ShopifyConfig};
///
/// let config = ShopifyConfig::builder()
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .api_version(ApiVersion::V2024_10)
///     .host(HostUrl::new("https://myapp.example.com").unwrap())
///     .graphql_tries(3)
///     .user_agent_prefix("MyApp/1.0")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct ShopifyConfigBuilder {
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    host: Option<HostUrl>,
    api_host: Option<HostUrl>,
    api_version: Option<ApiVersion>,
    graphql_tries: Option<u32>,
    user_agent_prefix: Option<String>,
}

impl ShopifyConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the previous secret key, accepted as a fallback during rotation.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the application's public URL.
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sends Admin API requests to this origin instead of the shop domain.
    ///
    /// The shop is still named in the `Host` header. Useful behind a proxy
    /// and for tests against a local server.
    #[must_use]
    pub fn api_host(mut self, api_host: HostUrl) -> Self {
        self.api_host = Some(api_host);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets how many times a GraphQL request is attempted before giving up.
    #[must_use]
    pub const fn graphql_tries(mut self, tries: u32) -> Self {
        self.graphql_tries = Some(tries);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ShopifyConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_secret_key` is
    /// not set, or [`ConfigError::InvalidTries`] if `graphql_tries` is zero.
    pub fn build(self) -> Result<ShopifyConfig, ConfigError> {
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;

        let graphql_tries = self.graphql_tries.unwrap_or(1);
        if graphql_tries == 0 {
            return Err(ConfigError::InvalidTries {
                tries: graphql_tries,
            });
        }

        Ok(ShopifyConfig {
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            host: self.host,
            api_host: self.api_host,
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
            graphql_tries,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
