//! Validated newtype wrappers for configuration values.
//!
//! Each wrapper checks its contents once, on construction, so the rest of the
//! crate can rely on the invariants without re-validating.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The app's Shopify API secret key, used as the HMAC key for webhook
/// signatures.
///
/// # Security
///
/// The `Debug` implementation never prints the key, only
/// `ApiSecretKey(*****)`.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ApiSecretKey(*****)");
/// assert_eq!(secret.as_bytes(), b"my-secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Creates a new validated API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiSecretKey);
        }
        Ok(Self(key))
    }

    /// Returns the raw key bytes for use as an HMAC key.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// A validated `*.myshopify.com` shop domain.
///
/// Accepts either the bare shop name (`my-store`) or the full domain
/// (`my-store.myshopify.com`) and always stores the full, lowercased form.
/// Serializes to and from the full domain string.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::ShopDomain;
///
/// let domain = ShopDomain::new("My-Store").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// assert_eq!(domain.shop_name(), "my-store");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShopDomain {
    full_domain: String,
    shop_name_end: usize,
}

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the domain is empty, has
    /// a foreign suffix, or the shop name contains anything other than
    /// lowercase letters, digits and inner hyphens.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into().trim().to_lowercase();

        let full_domain = match domain.strip_suffix(Self::SUFFIX) {
            Some(_) => domain,
            None if domain.contains('.') => {
                return Err(ConfigError::InvalidShopDomain { domain });
            }
            None => format!("{domain}{}", Self::SUFFIX),
        };

        let shop_name_end = full_domain.len() - Self::SUFFIX.len();
        if !Self::is_valid_shop_name(&full_domain[..shop_name_end]) {
            return Err(ConfigError::InvalidShopDomain {
                domain: full_domain,
            });
        }

        Ok(Self {
            full_domain,
            shop_name_end,
        })
    }

    /// Returns the shop name, e.g. `my-store` for `my-store.myshopify.com`.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.full_domain[..self.shop_name_end]
    }

    fn is_valid_shop_name(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('-')
            && !name.ends_with('-')
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_domain)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.full_domain)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated absolute URL with a scheme and a host.
///
/// Used both for the application's public origin (where Http webhook
/// deliveries are sent) and for overriding the Admin API origin.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::HostUrl;
///
/// let url = HostUrl::new("https://myapp.example.com:8443/base/").unwrap();
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), Some("myapp.example.com"));
/// assert_eq!(url.authority(), "myapp.example.com:8443");
/// assert_eq!(url.origin(), "https://myapp.example.com:8443");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostUrl {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
    authority_end: usize,
}

impl HostUrl {
    /// Creates a new validated host URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] if the scheme or host is
    /// missing.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().to_string();
        let invalid = |url: &str| ConfigError::InvalidHostUrl {
            url: url.to_string(),
        };

        let Some(scheme_end) = url.find("://") else {
            return Err(invalid(&url));
        };
        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid(&url));
        }

        let host_start = scheme_end + 3;
        let rest = &url[host_start..];
        let authority_end = rest
            .find(['/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);
        let host_end = url[host_start..authority_end]
            .find(':')
            .map_or(authority_end, |i| host_start + i);

        if host_end == host_start {
            return Err(invalid(&url));
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
            authority_end,
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name, without port.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        let host = &self.url[self.host_start..self.host_end];
        (!host.is_empty()).then_some(host)
    }

    /// Returns the host and optional port, e.g. `localhost:3000`.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.url[self.host_start..self.authority_end]
    }

    /// Returns `scheme://authority` with any path, query or fragment removed.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.url[..self.authority_end]
    }
}

impl AsRef<str> for HostUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_secret_key_rejects_empty_string() {
        assert!(matches!(
            ApiSecretKey::new(""),
            Err(ConfigError::EmptyApiSecretKey)
        ));
    }

    #[test]
    fn test_api_secret_key_masks_value_in_debug() {
        let secret = ApiSecretKey::new("super-secret-key").unwrap();
        let debug_output = format!("{secret:?}");
        assert_eq!(debug_output, "ApiSecretKey(*****)");
        assert!(!debug_output.contains("super-secret-key"));
    }

    #[test]
    fn test_shop_domain_normalizes_short_format() {
        let domain = ShopDomain::new("my-store").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");
        assert_eq!(domain.shop_name(), "my-store");
        assert_eq!(domain.to_string(), "my-store.myshopify.com");
    }

    #[test]
    fn test_shop_domain_accepts_full_format() {
        let domain = ShopDomain::new("  Test-Shop.myshopify.com ").unwrap();
        assert_eq!(domain.as_ref(), "test-shop.myshopify.com");
        assert_eq!(domain.shop_name(), "test-shop");
    }

    #[test]
    fn test_shop_domain_rejects_invalid_domains() {
        assert!(ShopDomain::new("").is_err());
        assert!(ShopDomain::new(".myshopify.com").is_err());
        assert!(ShopDomain::new("my store").is_err());
        assert!(ShopDomain::new("my_store").is_err());
        assert!(ShopDomain::new("-my-store").is_err());
        assert!(ShopDomain::new("my-store-").is_err());
        assert!(ShopDomain::new("my-store.otherdomain.com").is_err());
    }

    #[test]
    fn test_shop_domain_serde() {
        let domain = ShopDomain::new("my-store").unwrap();
        assert_eq!(
            serde_json::to_string(&domain).unwrap(),
            r#""my-store.myshopify.com""#
        );

        let parsed: ShopDomain = serde_json::from_str(r#""test-shop""#).unwrap();
        assert_eq!(parsed.as_ref(), "test-shop.myshopify.com");

        assert!(serde_json::from_str::<ShopDomain>(r#""bad domain""#).is_err());
    }

    #[test]
    fn test_host_url_splits_components() {
        let url = HostUrl::new("https://myapp.example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_name(), Some("myapp.example.com"));
        assert_eq!(url.authority(), "myapp.example.com");
        assert_eq!(url.origin(), "https://myapp.example.com");

        let url = HostUrl::new("http://127.0.0.1:3000").unwrap();
        assert_eq!(url.host_name(), Some("127.0.0.1"));
        assert_eq!(url.authority(), "127.0.0.1:3000");
        assert_eq!(url.origin(), "http://127.0.0.1:3000");
    }

    #[test]
    fn test_host_url_origin_drops_path_and_query() {
        let url = HostUrl::new("https://myapp.example.com/callback?x=1").unwrap();
        assert_eq!(url.origin(), "https://myapp.example.com");
        assert_eq!(url.as_ref(), "https://myapp.example.com/callback?x=1");
    }

    #[test]
    fn test_host_url_rejects_invalid() {
        assert!(HostUrl::new("myapp.example.com").is_err());
        assert!(HostUrl::new("https://").is_err());
        assert!(HostUrl::new("https://:8080").is_err());
        assert!(HostUrl::new("://example.com").is_err());
        assert!(HostUrl::new("ht tp://example.com").is_err());
    }
}
