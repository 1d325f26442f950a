//! Registration of webhook subscriptions with Shopify.
//!
//! Registration reconciles the desired subscription for a topic against
//! what the shop already has:
//!
//! 1. The delivery method is checked against the API version, and the
//!    address is validated, before any request is made.
//! 2. The existing subscription for the topic is read.
//! 3. If it already delivers to the target address, nothing is written.
//! 4. Otherwise it is created, or updated in place when one exists.
//!
//! Remote state is re-read on every call and never cached.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_webhooks::webhooks::{register, DeliveryMethod, RegisterOptions};
//!
//! let outcome = register(
//!     &config,
//!     RegisterOptions::new("orders/create", "/webhooks", &session),
//! )
//! .await?;
//!
//! if !outcome.success {
//!     eprintln!("registration failed: {:?}", outcome.user_errors);
//! }
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::auth::Session;
use crate::clients::GraphqlClient;
use crate::config::ShopifyConfig;
use crate::webhooks::delivery::{parse_pubsub_address, DeliveryMethod};
use crate::webhooks::handlers::{normalize_topic, HandlerTable};
use crate::webhooks::query::{
    build_check_query, build_delete_mutation, build_mutation, parse_delete_response,
    MutationResponse, RemoteSubscription,
};
use crate::webhooks::transport::GraphqlTransport;
use crate::webhooks::WebhookError;

/// Outcomes of a bulk registration, keyed by normalized topic.
pub type RegistrationResults = BTreeMap<String, Result<RegistrationOutcome, WebhookError>>;

/// What registration did for a topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationAction {
    /// The existing subscription already delivered to the target address.
    Skipped {
        /// The untouched subscription id.
        id: String,
    },
    /// No subscription existed, so one was created.
    Created,
    /// The existing subscription was pointed at the target address.
    Updated {
        /// The id of the updated subscription.
        id: String,
    },
}

/// The result of registering one topic.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistrationOutcome {
    /// The normalized topic.
    pub topic: String,
    /// `true` if the subscription now delivers to the target address.
    pub success: bool,
    /// What was done.
    pub action: RegistrationAction,
    /// The raw mutation response body; an empty object when skipped.
    pub result: Value,
    /// `userErrors` messages returned by the mutation.
    pub user_errors: Vec<String>,
}

impl RegistrationOutcome {
    fn skipped(topic: String, id: String) -> Self {
        Self {
            topic,
            success: true,
            action: RegistrationAction::Skipped { id },
            result: Value::Object(serde_json::Map::new()),
            user_errors: Vec::new(),
        }
    }

    /// Returns the id of the subscription, if one exists after registration.
    #[must_use]
    pub fn subscription_id(&self) -> Option<&str> {
        match &self.action {
            RegistrationAction::Skipped { id } => Some(id),
            RegistrationAction::Created | RegistrationAction::Updated { .. } => {
                self.result["data"]
                    .as_object()
                    .and_then(|data| data.values().next())
                    .and_then(|payload| payload["webhookSubscription"]["id"].as_str())
            }
        }
    }
}

/// Drives registration for one shop over a [`GraphqlTransport`].
///
/// Calls are strictly sequential; nothing runs concurrently against the
/// same topic.
#[derive(Debug)]
pub struct SubscriptionReconciler<'a, T: GraphqlTransport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: GraphqlTransport + ?Sized> SubscriptionReconciler<'a, T> {
    /// Creates a reconciler using `transport`.
    #[must_use]
    pub const fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Ensures the subscription for `topic` delivers to `target_address`.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::InvalidTopic`], [`WebhookError::UnsupportedTransport`]
    ///   and [`WebhookError::InvalidPubSubAddress`] before any request
    /// - [`WebhookError::GraphqlError`] when a request fails
    /// - [`WebhookError::ShopifyError`] when a response has the wrong shape
    pub async fn register_one(
        &self,
        topic: &str,
        target_address: &str,
        method: DeliveryMethod,
    ) -> Result<RegistrationOutcome, WebhookError> {
        let topic = normalize_topic(topic)?;
        let version = self.transport.api_version();
        method.validate(version)?;
        if matches!(method, DeliveryMethod::PubSub) {
            parse_pubsub_address(target_address)?;
        }

        let existing = self.find_existing(&topic).await?;

        if let Some(remote) = &existing {
            if remote.address == target_address {
                tracing::debug!(
                    topic = %topic,
                    id = %remote.id,
                    "Webhook subscription already registered, skipping"
                );
                return Ok(RegistrationOutcome::skipped(topic, remote.id.clone()));
            }
        }

        let existing_id = existing.map(|remote| remote.id);
        let mutation = build_mutation(&topic, target_address, method, existing_id.as_deref())?;
        let mutation_name = method.mutation_name(existing_id.is_some());

        let body = self.transport.execute(&mutation).await?;
        let parsed = MutationResponse::parse(&body, mutation_name)?;

        if parsed.is_success() {
            tracing::info!(
                topic = %topic,
                method = %method,
                mutation = mutation_name,
                "Webhook subscription registered"
            );
        } else {
            tracing::warn!(
                topic = %topic,
                mutation = mutation_name,
                user_errors = ?parsed.user_errors,
                "Webhook subscription was not registered"
            );
        }

        Ok(RegistrationOutcome {
            topic,
            success: parsed.is_success(),
            action: existing_id.map_or(RegistrationAction::Created, |id| {
                RegistrationAction::Updated { id }
            }),
            result: body,
            user_errors: parsed.user_errors,
        })
    }

    /// Registers every topic in `handlers` at its entry's path.
    ///
    /// Topics are processed one at a time in sorted order. A failure for one
    /// topic is recorded as that topic's `Err` and the rest continue.
    ///
    /// # Errors
    ///
    /// Fails before any request with [`WebhookError::UnsupportedTransport`]
    /// or [`WebhookError::HostNotConfigured`], since those apply to every
    /// topic.
    pub async fn register_many(
        &self,
        handlers: &HandlerTable,
        config: &ShopifyConfig,
        method: DeliveryMethod,
    ) -> Result<RegistrationResults, WebhookError> {
        method.validate(self.transport.api_version())?;
        if method == DeliveryMethod::Http && config.host().is_none() {
            return Err(WebhookError::HostNotConfigured);
        }

        let mut results = RegistrationResults::new();
        for (topic, entry) in handlers.iter() {
            let result = match method.target_address(config, entry.path()) {
                Ok(address) => self.register_one(topic, &address, method).await,
                Err(error) => Err(error),
            };

            if let Err(error) = &result {
                tracing::warn!(topic = %topic, error = %error, "Failed to register webhook");
            }
            results.insert(topic.to_string(), result);
        }

        Ok(results)
    }

    /// Deletes the subscription for `topic` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::SubscriptionNotFound`] if the shop has no
    /// subscription for the topic, and [`WebhookError::ShopifyError`] if the
    /// delete is rejected.
    pub async fn unregister(&self, topic: &str) -> Result<String, WebhookError> {
        let topic = normalize_topic(topic)?;
        let remote = self
            .find_existing(&topic)
            .await?
            .ok_or_else(|| WebhookError::SubscriptionNotFound {
                topic: topic.clone(),
            })?;

        let body = self
            .transport
            .execute(&build_delete_mutation(&remote.id))
            .await?;
        let deleted_id = parse_delete_response(&body)?;

        tracing::info!(topic = %topic, id = %deleted_id, "Webhook subscription deleted");
        Ok(deleted_id)
    }

    async fn find_existing(&self, topic: &str) -> Result<Option<RemoteSubscription>, WebhookError> {
        let query = build_check_query(topic, self.transport.api_version());
        let body = self.transport.execute(&query).await?;
        RemoteSubscription::from_check_response(&body)
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Arguments to [`register`].
#[derive(Clone, Debug)]
pub struct RegisterOptions<'a> {
    /// Handler path: joined to the host for Http, the ARN for EventBridge,
    /// the `pubsub://` address for Pub/Sub.
    pub path: String,
    /// The topic, in any accepted spelling.
    pub topic: String,
    /// Credentials for the shop.
    pub session: &'a Session,
    /// How events are delivered.
    pub delivery_method: DeliveryMethod,
}

impl<'a> RegisterOptions<'a> {
    /// Creates options for Http delivery.
    #[must_use]
    pub fn new(topic: impl Into<String>, path: impl Into<String>, session: &'a Session) -> Self {
        Self {
            path: path.into(),
            topic: topic.into(),
            session,
            delivery_method: DeliveryMethod::Http,
        }
    }

    /// Sets the delivery method.
    #[must_use]
    pub const fn delivery_method(mut self, method: DeliveryMethod) -> Self {
        self.delivery_method = method;
        self
    }
}

/// Arguments to [`register_all`].
#[derive(Clone, Debug)]
pub struct RegisterAllOptions<'a> {
    /// Credentials for the shop.
    pub session: &'a Session,
    /// How events are delivered.
    pub delivery_method: DeliveryMethod,
}

impl<'a> RegisterAllOptions<'a> {
    /// Creates options for Http delivery.
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self {
            session,
            delivery_method: DeliveryMethod::Http,
        }
    }

    /// Sets the delivery method.
    #[must_use]
    pub const fn delivery_method(mut self, method: DeliveryMethod) -> Self {
        self.delivery_method = method;
        self
    }
}

/// Registers one topic for the session's shop.
///
/// # Errors
///
/// See [`SubscriptionReconciler::register_one`]; additionally
/// [`WebhookError::HostNotConfigured`] for Http without a host.
pub async fn register(
    config: &ShopifyConfig,
    options: RegisterOptions<'_>,
) -> Result<RegistrationOutcome, WebhookError> {
    let method = options.delivery_method;
    let target = method.target_address(config, &options.path)?;
    let client = GraphqlClient::new(options.session, Some(config));

    SubscriptionReconciler::new(&client)
        .register_one(&options.topic, &target, method)
        .await
}

/// Registers every topic in `handlers` for the session's shop.
///
/// # Errors
///
/// See [`SubscriptionReconciler::register_many`].
pub async fn register_all(
    config: &ShopifyConfig,
    handlers: &HandlerTable,
    options: RegisterAllOptions<'_>,
) -> Result<RegistrationResults, WebhookError> {
    let client = GraphqlClient::new(options.session, Some(config));

    SubscriptionReconciler::new(&client)
        .register_many(handlers, config, options.delivery_method)
        .await
}

/// Deletes the subscription for `topic` from the session's shop.
///
/// # Errors
///
/// See [`SubscriptionReconciler::unregister`].
pub async fn unregister(
    config: &ShopifyConfig,
    session: &Session,
    topic: &str,
) -> Result<String, WebhookError> {
    let client = GraphqlClient::new(session, Some(config));
    SubscriptionReconciler::new(&client).unregister(topic).await
}
