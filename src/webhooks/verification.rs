//! Signature verification for inbound webhook deliveries.
//!
//! Shopify signs every delivery with HMAC-SHA256 over the raw request body,
//! keyed with the app's API secret, and sends the base64 digest in the
//! `X-Shopify-Hmac-SHA256` header.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::webhooks::{compute_signature_base64, verify_hmac};
//!
//! let body = br#"{"id":1}"#;
//! let digest = compute_signature_base64(body, b"my-secret");
//!
//! assert!(verify_hmac(b"my-secret", body, &digest));
//! assert!(!verify_hmac(b"other-secret", body, &digest));
//! ```
//!
//! # Security
//!
//! Digests are compared in constant time, so a mismatch takes as long to
//! detect in the last byte as in the first.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::ShopifyConfig;

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// Header Constants
// ============================================================================

/// Base64 HMAC-SHA256 digest of the body.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-SHA256";

/// Topic of the event, e.g. `orders/create`.
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";

/// The `*.myshopify.com` domain of the shop the event belongs to.
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";

/// API version the payload was rendered with.
pub const HEADER_API_VERSION: &str = "X-Shopify-API-Version";

/// Unique id of the delivery, stable across redeliveries.
pub const HEADER_WEBHOOK_ID: &str = "X-Shopify-Webhook-Id";

/// The headers a delivery must carry, in the order they are reported when
/// missing.
pub const REQUIRED_HEADERS: [&str; 3] = [HEADER_HMAC, HEADER_TOPIC, HEADER_SHOP_DOMAIN];

// ============================================================================
// Signatures
// ============================================================================

/// Computes the base64 HMAC-SHA256 digest of `message` keyed with `secret`.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::compute_signature_base64;
///
/// let digest = compute_signature_base64(b"payload", b"secret");
/// assert_eq!(digest.len(), 44);
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature_base64(message: &[u8], secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Compares two strings in time independent of their contents.
///
/// Only the lengths may leak, and a digest's length is public.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Returns `true` if `received_digest` is the base64 HMAC-SHA256 of
/// `raw_body` under `secret`.
#[must_use]
pub fn verify_hmac(secret: &[u8], raw_body: &[u8], received_digest: &str) -> bool {
    let computed = compute_signature_base64(raw_body, secret);
    constant_time_compare(&computed, received_digest)
}

/// Verifies `received_digest` with the configured secret, falling back to
/// the old secret during key rotation.
#[must_use]
pub fn verify_with_config(config: &ShopifyConfig, raw_body: &[u8], received_digest: &str) -> bool {
    config
        .secret_keys()
        .any(|key| verify_hmac(key.as_bytes(), raw_body, received_digest))
}

// ============================================================================
// WebhookRequest
// ============================================================================

/// An inbound delivery as received by the application's HTTP layer.
///
/// The body is kept as raw bytes so the signature is checked over exactly
/// what was sent. Header names are matched case-insensitively.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::WebhookRequest;
///
/// let request = WebhookRequest::new(b"{}".to_vec())
///     .with_header("x-shopify-topic", "orders/create")
///     .with_header("X-Shopify-Shop-Domain", "example.myshopify.com");
///
/// assert_eq!(request.topic(), Some("orders/create"));
/// assert_eq!(request.header("X-SHOPIFY-TOPIC"), Some("orders/create"));
/// assert_eq!(request.hmac(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    body: Option<Vec<u8>>,
    headers: HashMap<String, String>,
}

impl WebhookRequest {
    /// Creates a request with a body and no headers.
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Some(body.into()),
            headers: HashMap::new(),
        }
    }

    /// Creates a request that arrived without a body.
    #[must_use]
    pub fn without_body() -> Self {
        Self::default()
    }

    /// Adds a header. A later value for the same name replaces the earlier.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Adds every header from an iterator of name/value pairs.
    #[must_use]
    pub fn with_headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |request, (name, value)| request.with_header(name, value))
    }

    /// Returns the raw body, if one was received.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Returns a header value by case-insensitive name.
    ///
    /// Blank values are treated as absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Returns the `X-Shopify-Hmac-SHA256` header.
    #[must_use]
    pub fn hmac(&self) -> Option<&str> {
        self.header(HEADER_HMAC)
    }

    /// Returns the `X-Shopify-Topic` header.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.header(HEADER_TOPIC)
    }

    /// Returns the `X-Shopify-Shop-Domain` header.
    #[must_use]
    pub fn shop_domain(&self) -> Option<&str> {
        self.header(HEADER_SHOP_DOMAIN)
    }

    /// Returns the `X-Shopify-API-Version` header.
    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.header(HEADER_API_VERSION)
    }

    /// Returns the `X-Shopify-Webhook-Id` header.
    #[must_use]
    pub fn webhook_id(&self) -> Option<&str> {
        self.header(HEADER_WEBHOOK_ID)
    }

    /// Returns the required headers that are absent, in reporting order.
    #[must_use]
    pub fn missing_headers(&self) -> Vec<&'static str> {
        REQUIRED_HEADERS
            .into_iter()
            .filter(|name| self.header(name).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiSecretKey;

    // ========================================================================
    // Signature Tests
    // ========================================================================

    #[test]
    fn test_compute_signature_base64_known_vector() {
        // RFC 4231 test case 2
        let digest = compute_signature_base64(b"what do ya want for nothing?", b"Jefe");
        assert_eq!(digest, "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM=");
    }

    #[test]
    fn test_verify_hmac_round_trip() {
        let bodies: [&[u8]; 4] = [b"", b"{}", br#"{"id":820982911946154508}"#, &[0xff, 0x00, 0x7f]];
        for body in bodies {
            let digest = compute_signature_base64(body, b"hush");
            assert!(verify_hmac(b"hush", body, &digest));
        }
    }

    #[test]
    fn test_verify_hmac_rejects_every_single_byte_mutation() {
        let body = br#"{"id":1,"email":"jon@example.com"}"#;
        let digest = compute_signature_base64(body, b"hush");

        for index in 0..digest.len() {
            let mut mutated = digest.clone().into_bytes();
            mutated[index] = if mutated[index] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(
                !verify_hmac(b"hush", body, &mutated),
                "mutation at byte {index} was accepted"
            );
        }
    }

    #[test]
    fn test_verify_hmac_rejects_wrong_secret_and_body() {
        let digest = compute_signature_base64(b"payload", b"secret");
        assert!(!verify_hmac(b"other", b"payload", &digest));
        assert!(!verify_hmac(b"secret", b"payload!", &digest));
        assert!(!verify_hmac(b"secret", b"payload", ""));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_verify_with_config_falls_back_to_old_secret() {
        let config = ShopifyConfig::builder()
            .api_secret_key(ApiSecretKey::new("new-secret").unwrap())
            .old_api_secret_key(ApiSecretKey::new("old-secret").unwrap())
            .build()
            .unwrap();

        let body = b"payload";
        let old = compute_signature_base64(body, b"old-secret");
        let new = compute_signature_base64(body, b"new-secret");
        let stranger = compute_signature_base64(body, b"stranger");

        assert!(verify_with_config(&config, body, &new));
        assert!(verify_with_config(&config, body, &old));
        assert!(!verify_with_config(&config, body, &stranger));
    }

    // ========================================================================
    // WebhookRequest Tests
    // ========================================================================

    #[test]
    fn test_request_header_lookup_is_case_insensitive() {
        let request = WebhookRequest::new(b"{}".to_vec()).with_headers([
            ("X-Shopify-Hmac-Sha256", "digest"),
            ("x-shopify-topic", "orders/create"),
            ("X-SHOPIFY-SHOP-DOMAIN", "shop.myshopify.com"),
            ("X-Shopify-API-Version", "2025-01"),
            ("X-Shopify-Webhook-Id", "b54557e4"),
        ]);

        assert_eq!(request.hmac(), Some("digest"));
        assert_eq!(request.topic(), Some("orders/create"));
        assert_eq!(request.shop_domain(), Some("shop.myshopify.com"));
        assert_eq!(request.api_version(), Some("2025-01"));
        assert_eq!(request.webhook_id(), Some("b54557e4"));
        assert!(request.missing_headers().is_empty());
    }

    #[test]
    fn test_missing_headers_reported_in_fixed_order() {
        let request = WebhookRequest::new(b"{}".to_vec());
        assert_eq!(
            request.missing_headers(),
            vec![HEADER_HMAC, HEADER_TOPIC, HEADER_SHOP_DOMAIN]
        );

        let request = request
            .with_header(HEADER_SHOP_DOMAIN, "shop.myshopify.com")
            .with_header(HEADER_HMAC, "digest");
        assert_eq!(request.missing_headers(), vec![HEADER_TOPIC]);
    }

    #[test]
    fn test_blank_header_values_count_as_missing() {
        let request = WebhookRequest::new(b"{}".to_vec()).with_headers([
            (HEADER_HMAC, ""),
            (HEADER_TOPIC, "orders/create"),
            (HEADER_SHOP_DOMAIN, "   "),
        ]);

        assert_eq!(request.hmac(), None);
        assert_eq!(request.shop_domain(), None);
        assert_eq!(
            request.missing_headers(),
            vec![HEADER_HMAC, HEADER_SHOP_DOMAIN]
        );
    }

    #[test]
    fn test_request_without_body() {
        let request = WebhookRequest::without_body();
        assert!(request.body().is_none());

        let request = WebhookRequest::new(Vec::new());
        assert_eq!(request.body(), Some(&[][..]));
    }
}
