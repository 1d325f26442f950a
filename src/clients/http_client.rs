//! Authenticated HTTP transport for the Admin API.
//!
//! [`HttpClient`] resolves the API origin, attaches the default headers and
//! retries rate-limited or failed requests a bounded number of times.

use std::collections::HashMap;
use std::time::Duration;

use crate::auth::Session;
use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ShopifyConfig;

/// Fixed wait between retries, in seconds, when no `Retry-After` applies.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client bound to one shop's Admin API.
///
/// - Requests go to `https://<shop>` unless the config sets an `api_host`,
///   in which case they go to that origin and the `Host` header names the
///   shop.
/// - Every request carries `User-Agent`, `Accept` and, when the session has
///   one, `X-Shopify-Access-Token`.
/// - 429 responses are retried after `Retry-After` (or one second), 500
///   responses after one second, up to the request's `tries`.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::clients::HttpClient;
/// use shopify_webhooks::{Session, ShopDomain};
///
/// let session = Session::new(ShopDomain::new("my-store").unwrap(), "access-token");
/// let client = HttpClient::new("/admin/api/2025-01", &session, None);
/// assert_eq!(client.base_uri(), "https://my-store.myshopify.com");
/// ```
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_uri: String,
    base_path: String,
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a client for `session`'s shop.
    ///
    /// `config` supplies `api_host` and `user_agent_prefix` when given.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn new(
        base_path: impl Into<String>,
        session: &Session,
        config: Option<&ShopifyConfig>,
    ) -> Self {
        let api_host = config.and_then(ShopifyConfig::api_host);
        let base_uri = api_host.map_or_else(
            || format!("https://{}", session.shop),
            |host| host.origin().to_string(),
        );

        let user_agent_prefix = config
            .and_then(ShopifyConfig::user_agent_prefix)
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!(
            "{user_agent_prefix}Shopify Webhooks Library v{SDK_VERSION} | Rust {rust_version}"
        );

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        if api_host.is_some() {
            default_headers.insert("Host".to_string(), session.shop.to_string());
        }
        if session.is_active() {
            default_headers.insert(
                "X-Shopify-Access-Token".to_string(),
                session.access_token.clone(),
            );
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_uri,
            base_path: base_path.into(),
            default_headers,
        }
    }

    /// Returns the origin requests are sent to.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Returns the path prefix, e.g. `/admin/api/2025-01`.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends `request`, retrying 429 and 500 responses up to `request.tries`.
    ///
    /// # Errors
    ///
    /// - [`HttpError::InvalidRequest`] if the request fails [`HttpRequest::verify`]
    /// - [`HttpError::Network`] on connection failures
    /// - [`HttpError::Response`] on a non-retryable non-2xx response, or a
    ///   retryable one when only one try was allowed
    /// - [`HttpError::MaxRetries`] when every try was used up
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = format!("{}{}/{}", self.base_uri, self.base_path, request.path);

        let mut headers = self.default_headers.clone();
        if request.body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        if let Some(extra) = &request.extra_headers {
            headers.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
            };
            for (key, value) in &headers {
                builder = builder.header(key, value);
            }
            if let Some(query) = &request.query {
                builder = builder.query(query);
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.to_string());
            }

            let res = builder.send().await?;
            let code = res.status().as_u16();
            let res_headers = Self::collect_headers(res.headers());
            let body_text = res.text().await.unwrap_or_default();
            let response = HttpResponse::new(code, res_headers, Self::parse_body(code, &body_text));

            if let Some(reason) = response.deprecation_reason() {
                tracing::warn!(
                    path = %request.path,
                    reason,
                    "Deprecated request to Shopify API"
                );
            }

            if response.is_ok() {
                return Ok(response);
            }

            let message = Self::serialize_error(&response);
            let error_reference = response.request_id().map(String::from);

            let retryable = code == 429 || code == 500;
            if !retryable || request.tries == 1 {
                return Err(HttpResponseError {
                    code,
                    message,
                    error_reference,
                }
                .into());
            }
            if tries >= request.tries {
                return Err(MaxHttpRetriesExceededError {
                    code,
                    tries,
                    message,
                    error_reference,
                }
                .into());
            }

            let delay = Self::retry_delay(&response);
            tracing::debug!(code, tries, ?delay, "Retrying Shopify API request");
            tokio::time::sleep(delay).await;
        }
    }

    fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            result
                .entry(name.as_str().to_lowercase())
                .or_default()
                .push(value.to_str().unwrap_or_default().to_string());
        }
        result
    }

    /// Non-JSON 5xx bodies are kept under `raw_body`; other unparseable
    /// bodies become `{}`.
    fn parse_body(code: u16, text: &str) -> serde_json::Value {
        if text.is_empty() {
            return serde_json::json!({});
        }
        serde_json::from_str(text).unwrap_or_else(|_| {
            if code >= 500 {
                serde_json::json!({ "raw_body": text })
            } else {
                serde_json::json!({})
            }
        })
    }

    fn retry_delay(response: &HttpResponse) -> Duration {
        let requested = match (response.code, response.retry_request_after) {
            (429, Some(seconds)) => Duration::try_from_secs_f64(seconds).ok(),
            _ => None,
        };
        requested.unwrap_or(Duration::from_secs(RETRY_WAIT_TIME))
    }

    fn serialize_error(response: &HttpResponse) -> String {
        let mut error_body = serde_json::Map::new();

        if let Some(errors) = response.body.get("errors") {
            error_body.insert("errors".to_string(), errors.clone());
        }
        if let Some(error) = response.body.get("error") {
            error_body.insert("error".to_string(), error.clone());
            if let Some(desc) = response.body.get("error_description") {
                error_body.insert("error_description".to_string(), desc.clone());
            }
        }
        if let Some(request_id) = response.request_id() {
            error_body.insert(
                "error_reference".to_string(),
                serde_json::json!(format!(
                    "If you report this error, please include this id: {request_id}."
                )),
            );
        }

        serde_json::Value::Object(error_body).to_string()
    }
}
