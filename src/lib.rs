//! # Shopify Webhooks
//!
//! Webhook subscription registration and inbound webhook processing for
//! Shopify apps.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ShopifyConfig`] and [`ShopifyConfigBuilder`]
//! - Idempotent registration of webhook subscriptions over the GraphQL Admin
//!   API, for Http, Amazon EventBridge and Google Pub/Sub delivery
//! - Authentication and dispatch of inbound deliveries, with constant-time
//!   HMAC verification
//! - An async Admin API transport with bounded retry
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_webhooks::{ApiSecretKey, ApiVersion, HostUrl, ShopifyConfig};
//!
//! let config = ShopifyConfig::builder()
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .host(HostUrl::new("https://your-app.example.com").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Registering Subscriptions
//!
//! ```rust,ignore
//! use shopify_webhooks::{Session, ShopDomain};
//! use shopify_webhooks::webhooks::{
//!     register_all, HandlerEntry, HandlerTable, RegisterAllOptions,
//! };
//!
//! let mut handlers = HandlerTable::new();
//! handlers.add(
//!     "orders/create",
//!     HandlerEntry::new("/webhooks", |_topic: String, _shop: String, body: Vec<u8>| async move {
//!         println!("{} bytes", body.len());
//!         Ok(())
//!     }),
//! )?;
//!
//! let session = Session::new(ShopDomain::new("my-store")?, "access-token");
//! let results = register_all(&config, &handlers, RegisterAllOptions::new(&session)).await?;
//! ```
//!
//! ## Processing Deliveries
//!
//! ```rust,ignore
//! use shopify_webhooks::webhooks::{process, WebhookRequest, WebhookResponse};
//!
//! let request = WebhookRequest::new(raw_body).with_headers(headers);
//! let mut response = WebhookResponse::default();
//! let result = process(&config, &handlers, &request, &mut response).await;
//! // answer with response.status_code(), then log `result` if it is an error
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration and the handler table are passed
//!   explicitly
//! - **Fail-fast validation**: newtypes validate on construction; invalid
//!   topics, addresses and delivery methods fail before any request
//! - **Thread-safe**: public types are `Send + Sync`
//! - **Async-first**: designed for the Tokio runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod webhooks;

// Re-export public types at crate root for convenience
pub use auth::Session;
pub use config::{
    ApiSecretKey, ApiVersion, HostUrl, ShopDomain, ShopifyConfig, ShopifyConfigBuilder,
};
pub use error::ConfigError;

// Re-export Admin API client types
pub use clients::{
    GraphqlClient, GraphqlError, HttpClient, HttpError, HttpMethod, HttpRequest,
    HttpRequestBuilder, HttpResponse, HttpResponseError, InvalidHttpRequestError,
    MaxHttpRetriesExceededError, PaginationInfo,
};

// Re-export the webhook entry points
pub use webhooks::{
    process, register, register_all, DeliveryMethod, HandlerEntry, HandlerTable,
    RegistrationOutcome, WebhookError, WebhookRequest, WebhookResponse, WebhookStatus,
};
