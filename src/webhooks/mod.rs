//! Webhook subscriptions and inbound deliveries.
//!
//! # Overview
//!
//! - [`HandlerTable`]: the application's handlers, one per topic, each with
//!   the path its deliveries are sent to
//! - [`register`] / [`register_all`]: make the shop's subscriptions point at
//!   those paths, skipping topics that already do
//! - [`process`]: authenticate an inbound delivery and dispatch it to its
//!   handler
//! - [`DeliveryMethod`]: Http callbacks, Amazon EventBridge or Google Pub/Sub
//!
//! # Registration
//!
//! ```rust,ignore
//! use shopify_webhooks::webhooks::{register_all, HandlerEntry, HandlerTable, RegisterAllOptions};
//!
//! let mut handlers = HandlerTable::new();
//! handlers.add(
//!     "orders/create",
//!     HandlerEntry::new("/webhooks", |topic: String, shop: String, body: Vec<u8>| async move {
//!         Ok(())
//!     }),
//! )?;
//!
//! let results = register_all(&config, &handlers, RegisterAllOptions::new(&session)).await?;
//! for (topic, result) in &results {
//!     match result {
//!         Ok(outcome) if outcome.success => println!("{topic}: {:?}", outcome.action),
//!         Ok(outcome) => println!("{topic}: rejected {:?}", outcome.user_errors),
//!         Err(error) => println!("{topic}: {error}"),
//!     }
//! }
//! ```
//!
//! # Processing
//!
//! ```rust,ignore
//! use shopify_webhooks::webhooks::{process, WebhookRequest, WebhookResponse};
//!
//! let request = WebhookRequest::new(raw_body).with_headers(headers);
//! let mut response = WebhookResponse::default();
//! if let Err(error) = process(&config, &handlers, &request, &mut response).await {
//!     tracing::warn!("{error}");
//! }
//! // answer with response.status_code()
//! ```
//!
//! # Thread Safety
//!
//! [`HandlerTable`] is `Send + Sync`. Fill it at startup, then share it
//! read-only (for example behind an `Arc`) between request handlers.

mod delivery;
mod errors;
mod handlers;
mod process;
mod query;
mod registry;
mod transport;
mod verification;

pub use delivery::{parse_pubsub_address, pubsub_address, AddressArgs, DeliveryMethod};
pub use errors::{HandlerError, WebhookError};
pub use handlers::{
    normalize_topic, BoxFuture, HandlerEntry, HandlerResult, HandlerTable, WebhookHandler,
};
pub use process::{process, WebhookResponse, WebhookStatus};
pub use query::{
    build_check_query, build_delete_mutation, build_mutation, parse_delete_response,
    MutationResponse, RemoteSubscription,
};
pub use registry::{
    register, register_all, unregister, RegisterAllOptions, RegisterOptions,
    RegistrationAction, RegistrationOutcome, RegistrationResults, SubscriptionReconciler,
};
pub use transport::GraphqlTransport;
pub use verification::{
    compute_signature_base64, constant_time_compare, verify_hmac, verify_with_config,
    WebhookRequest, HEADER_API_VERSION, HEADER_HMAC, HEADER_SHOP_DOMAIN, HEADER_TOPIC,
    HEADER_WEBHOOK_ID, REQUIRED_HEADERS,
};
