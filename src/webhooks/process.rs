//! Processing of inbound webhook deliveries.
//!
//! [`process`] authenticates a delivery and dispatches it to the handler
//! registered for its topic, recording the HTTP status to answer with on a
//! caller-supplied [`WebhookResponse`]:
//!
//! | condition | status |
//! |---|---|
//! | missing body or required headers | 400 |
//! | signature mismatch | 403 |
//! | no handler for the topic | 403 |
//! | handler failed | 500 |
//! | handler succeeded | 200 |
//!
//! The status is always set, including when an error is returned, so the
//! HTTP layer can answer the delivery and then log the error.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::webhooks::{
//!     compute_signature_base64, process, HandlerEntry, HandlerTable, WebhookRequest,
//!     WebhookResponse, WebhookStatus,
//! };
//! use shopify_webhooks::{ApiSecretKey, ShopifyConfig};
//!
//! # tokio_test::block_on(async {
//! let config = ShopifyConfig::builder()
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let mut handlers = HandlerTable::new();
//! handlers
//!     .add(
//!         "orders/create",
//!         HandlerEntry::new("/webhooks", |_topic: String, _shop: String, _body: Vec<u8>| async {
//!             Ok(())
//!         }),
//!     )
//!     .unwrap();
//!
//! let body = br#"{"id":1}"#;
//! let request = WebhookRequest::new(body.to_vec())
//!     .with_header("X-Shopify-Hmac-SHA256", compute_signature_base64(body, b"secret"))
//!     .with_header("X-Shopify-Topic", "orders/create")
//!     .with_header("X-Shopify-Shop-Domain", "example.myshopify.com");
//!
//! let mut response = WebhookResponse::default();
//! process(&config, &handlers, &request, &mut response).await.unwrap();
//! assert_eq!(response.status, Some(WebhookStatus::Ok));
//! # });
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::config::ShopifyConfig;
use crate::webhooks::handlers::{normalize_topic, HandlerTable};
use crate::webhooks::verification::{verify_with_config, WebhookRequest};
use crate::webhooks::WebhookError;

/// The HTTP status a delivery is answered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WebhookStatus {
    /// 200: the handler ran successfully.
    Ok,
    /// 400: the body or a required header was missing.
    BadRequest,
    /// 403: the signature did not verify, or no handler exists for the topic.
    Forbidden,
    /// 500: the handler failed.
    InternalServerError,
}

impl WebhookStatus {
    /// Returns the numeric status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::Forbidden => 403,
            Self::InternalServerError => 500,
        }
    }
}

impl fmt::Display for WebhookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The response the HTTP layer should send for a delivery.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebhookResponse {
    /// The status to answer with; `None` until [`process`] runs.
    pub status: Option<WebhookStatus>,
    /// Headers to add to the response. Currently always empty.
    pub headers: HashMap<String, String>,
}

impl WebhookResponse {
    /// Returns the numeric status code, if set.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.status.map(WebhookStatus::code)
    }

    fn respond(&mut self, status: WebhookStatus) {
        self.status = Some(status);
        self.headers.clear();
    }
}

/// Authenticates `request` and runs the handler for its topic.
///
/// The signature is checked over the raw body before anything else looks at
/// it. An empty body counts as missing.
///
/// # Errors
///
/// - [`WebhookError::InvalidWebhook`] with [`WebhookStatus::BadRequest`] for
///   a missing body or missing required headers; every missing header is
///   named
/// - [`WebhookError::InvalidWebhook`] with [`WebhookStatus::Forbidden`] for a
///   signature mismatch or a topic without a handler
/// - [`WebhookError::HandlerFailure`] when the handler fails
///
/// `response.status` is set in every case.
pub async fn process(
    config: &ShopifyConfig,
    handlers: &HandlerTable,
    request: &WebhookRequest,
    response: &mut WebhookResponse,
) -> Result<(), WebhookError> {
    let reject = |response: &mut WebhookResponse, status: WebhookStatus, message: String| {
        tracing::warn!(status = status.code(), "Rejected webhook delivery: {}", message);
        response.respond(status);
        WebhookError::invalid(status, message)
    };

    let Some(body) = request.body().filter(|body| !body.is_empty()) else {
        return Err(reject(
            response,
            WebhookStatus::BadRequest,
            "No body was received when processing webhook".to_string(),
        ));
    };

    let (Some(hmac), Some(topic), Some(shop_domain)) =
        (request.hmac(), request.topic(), request.shop_domain())
    else {
        let message = format!(
            "Missing one or more of the required HTTP headers to process webhooks: [{}]",
            request.missing_headers().join(", ")
        );
        return Err(reject(response, WebhookStatus::BadRequest, message));
    };

    if !verify_with_config(config, body, hmac) {
        return Err(reject(
            response,
            WebhookStatus::Forbidden,
            format!("Could not validate request for topic {topic}"),
        ));
    }

    let entry = normalize_topic(topic)
        .ok()
        .and_then(|key| handlers.get(&key).map(|entry| (key, entry)));
    let Some((key, entry)) = entry else {
        return Err(reject(
            response,
            WebhookStatus::Forbidden,
            format!("No webhook is registered for topic {topic}"),
        ));
    };

    tracing::debug!(
        topic = %key,
        shop = %shop_domain,
        webhook_id = request.webhook_id().unwrap_or_default(),
        "Dispatching webhook"
    );

    match entry.handler().handle(topic, shop_domain, body).await {
        Ok(()) => {
            response.respond(WebhookStatus::Ok);
            Ok(())
        }
        Err(source) => {
            tracing::error!(
                topic = %key,
                shop = %shop_domain,
                "Webhook handler failed: {}",
                source
            );
            response.respond(WebhookStatus::InternalServerError);
            Err(WebhookError::HandlerFailure { topic: key, source })
        }
    }
}
