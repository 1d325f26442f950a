//! Error type for webhook registration and inbound processing.
//!
//! - [`WebhookError::InvalidWebhook`]: an inbound delivery was rejected;
//!   carries the 400 or 403 status it maps to
//! - [`WebhookError::UnsupportedTransport`], [`WebhookError::InvalidPubSubAddress`],
//!   [`WebhookError::InvalidTopic`], [`WebhookError::HostNotConfigured`]:
//!   caller configuration, raised before any network call
//! - [`WebhookError::GraphqlError`]: transport failures, unmodified
//! - [`WebhookError::ShopifyError`], [`WebhookError::SubscriptionNotFound`]:
//!   the Admin API answered, but not with what was needed
//! - [`WebhookError::HandlerFailure`]: an application handler failed
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::webhooks::{WebhookError, WebhookStatus};
//!
//! let error = WebhookError::InvalidWebhook {
//!     status: WebhookStatus::Forbidden,
//!     message: "Could not validate request for topic orders/create".to_string(),
//! };
//! assert_eq!(error.status(), Some(WebhookStatus::Forbidden));
//! ```

use crate::clients::GraphqlError;
use crate::config::ApiVersion;
use crate::webhooks::delivery::DeliveryMethod;
use crate::webhooks::process::WebhookStatus;
use thiserror::Error;

/// Opaque error returned by application webhook handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for webhook registration and processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// An inbound delivery was malformed, unauthenticated or unroutable.
    #[error("{message}")]
    InvalidWebhook {
        /// The status the delivery was answered with (400 or 403).
        status: WebhookStatus,
        /// What was wrong with the delivery.
        message: String,
    },

    /// The delivery method is not available at the configured API version.
    #[error("Webhook delivery method {method} is not supported in API version {version}")]
    UnsupportedTransport {
        /// The requested delivery method.
        method: DeliveryMethod,
        /// The active API version.
        version: ApiVersion,
    },

    /// A Pub/Sub address that is not `pubsub://<project>:<topic>`.
    #[error("Invalid Pub/Sub address '{address}'. Expected format: 'pubsub://<project>:<topic>'.")]
    InvalidPubSubAddress {
        /// The rejected address.
        address: String,
    },

    /// A topic that does not name a webhook subscription topic.
    #[error("Invalid webhook topic '{topic}'")]
    InvalidTopic {
        /// The rejected topic.
        topic: String,
    },

    /// Http delivery needs the application host to build callback URLs.
    #[error("Host URL is not configured. Please set host in ShopifyConfig to register HTTP webhooks.")]
    HostNotConfigured,

    /// The GraphQL request itself failed.
    #[error(transparent)]
    GraphqlError(#[from] GraphqlError),

    /// The Admin API returned a response without the expected shape, or
    /// rejected a delete with userErrors.
    #[error("Shopify API error: {message}")]
    ShopifyError {
        /// Error details from the response.
        message: String,
    },

    /// No remote subscription exists for the topic.
    #[error("Webhook subscription not found in Shopify for topic: {topic}")]
    SubscriptionNotFound {
        /// The normalized topic.
        topic: String,
    },

    /// The handler registered for the topic returned an error.
    #[error("Webhook handler for topic {topic} failed: {source}")]
    HandlerFailure {
        /// The normalized topic.
        topic: String,
        /// The handler's error.
        #[source]
        source: HandlerError,
    },
}

impl WebhookError {
    /// Returns the inbound status this error maps to, if it came from
    /// processing a delivery.
    #[must_use]
    pub const fn status(&self) -> Option<WebhookStatus> {
        match self {
            Self::InvalidWebhook { status, .. } => Some(*status),
            Self::HandlerFailure { .. } => Some(WebhookStatus::InternalServerError),
            _ => None,
        }
    }

    pub(crate) fn invalid(status: WebhookStatus, message: impl Into<String>) -> Self {
        Self::InvalidWebhook {
            status,
            message: message.into(),
        }
    }
}
