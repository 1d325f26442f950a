//! GraphQL documents for webhook subscriptions and decoding of their
//! responses.
//!
//! Topics passed in here are expected in normalized form (`ORDERS_CREATE`);
//! see [`normalize_topic`](crate::webhooks::normalize_topic).

use serde_json::Value;

use crate::config::ApiVersion;
use crate::webhooks::delivery::{graphql_string, pubsub_address, DeliveryMethod};
use crate::webhooks::WebhookError;

const DELETE_MUTATION: &str = "webhookSubscriptionDelete";

/// Builds the query that reads at most one existing subscription for
/// `topic`.
///
/// The Pub/Sub endpoint fragment is only included when `version` supports
/// Pub/Sub, so the query stays valid against older schemas.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::build_check_query;
/// use shopify_webhooks::ApiVersion;
///
/// let query = build_check_query("ORDERS_CREATE", &ApiVersion::latest());
/// assert!(query.contains("topics: ORDERS_CREATE"));
/// assert!(query.contains("WebhookPubSubEndpoint"));
/// ```
#[must_use]
pub fn build_check_query(topic: &str, version: &ApiVersion) -> String {
    let pubsub_fragment = if DeliveryMethod::PubSub.is_supported(version) {
        r"
              ... on WebhookPubSubEndpoint {
                pubSubProject
                pubSubTopic
              }"
    } else {
        ""
    };

    format!(
        r"
    query shopifyApiReadWebhookSubscriptions {{
      webhookSubscriptions(first: 1, topics: {topic}) {{
        edges {{
          node {{
            id
            endpoint {{
              __typename
              ... on WebhookHttpEndpoint {{
                callbackUrl
              }}
              ... on WebhookEventBridgeEndpoint {{
                arn
              }}{pubsub_fragment}
            }}
          }}
        }}
      }}
    }}
    "
    )
}

/// Builds the create or update mutation pointing `topic` at `address`.
///
/// With `existing_id` the method's update mutation is used and the
/// subscription is addressed by id; without it the create mutation is used
/// and the subscription is addressed by topic.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidPubSubAddress`] for a malformed Pub/Sub
/// address.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::{build_mutation, DeliveryMethod};
///
/// let create = build_mutation(
///     "ORDERS_CREATE",
///     "https://app.example.com/webhooks",
///     DeliveryMethod::Http,
///     None,
/// )
/// .unwrap();
/// assert!(create.contains("webhookSubscriptionCreate(topic: ORDERS_CREATE"));
///
/// let update = build_mutation(
///     "ORDERS_CREATE",
///     "https://app.example.com/webhooks",
///     DeliveryMethod::Http,
///     Some("gid://shopify/WebhookSubscription/1"),
/// )
/// .unwrap();
/// assert!(update.contains(r#"webhookSubscriptionUpdate(id: "gid://shopify/WebhookSubscription/1""#));
/// ```
pub fn build_mutation(
    topic: &str,
    address: &str,
    method: DeliveryMethod,
    existing_id: Option<&str>,
) -> Result<String, WebhookError> {
    let args = method.address_args(address)?;
    let name = method.mutation_name(existing_id.is_some());
    let target = existing_id.map_or_else(
        || format!("topic: {topic}"),
        |id| format!("id: {}", graphql_string(id)),
    );

    Ok(format!(
        r"
    mutation webhookSubscription {{
      {name}({target}, webhookSubscription: {{{args}}}) {{
        userErrors {{
          field
          message
        }}
        webhookSubscription {{
          id
        }}
      }}
    }}
    ",
        args = args.to_graphql()
    ))
}

/// Builds the mutation deleting the subscription with `id`.
#[must_use]
pub fn build_delete_mutation(id: &str) -> String {
    format!(
        r"
    mutation webhookSubscriptionDelete {{
      {DELETE_MUTATION}(id: {id}) {{
        userErrors {{
          field
          message
        }}
        deletedWebhookSubscriptionId
      }}
    }}
    ",
        id = graphql_string(id)
    )
}

/// An existing subscription as reported by the check query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteSubscription {
    /// The subscription's global id.
    pub id: String,
    /// Where it currently delivers. Pub/Sub endpoints are rendered as
    /// `pubsub://<project>:<topic>`; unknown endpoint kinds as `""`.
    pub address: String,
    /// The endpoint kind, if recognised.
    pub method: Option<DeliveryMethod>,
}

impl RemoteSubscription {
    /// Decodes the first subscription from a check query response body.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::ShopifyError`] if the body has no
    /// `data.webhookSubscriptions.edges` list or a node without an id.
    pub fn from_check_response(body: &Value) -> Result<Option<Self>, WebhookError> {
        let edges = body["data"]["webhookSubscriptions"]["edges"]
            .as_array()
            .ok_or_else(|| response_error(body))?;

        let Some(edge) = edges.first() else {
            return Ok(None);
        };

        let node = &edge["node"];
        let id = node["id"]
            .as_str()
            .ok_or_else(|| WebhookError::ShopifyError {
                message: "Missing webhook ID".to_string(),
            })?
            .to_string();

        let endpoint = &node["endpoint"];
        let method = endpoint["__typename"]
            .as_str()
            .and_then(DeliveryMethod::from_endpoint_typename);
        let address = match method {
            Some(DeliveryMethod::Http) => endpoint["callbackUrl"].as_str().map(String::from),
            Some(DeliveryMethod::EventBridge) => endpoint["arn"].as_str().map(String::from),
            Some(DeliveryMethod::PubSub) => match (
                endpoint["pubSubProject"].as_str(),
                endpoint["pubSubTopic"].as_str(),
            ) {
                (Some(project), Some(topic)) => Some(pubsub_address(project, topic)),
                _ => None,
            },
            None => None,
        };

        Ok(Some(Self {
            id,
            address: address.unwrap_or_default(),
            method,
        }))
    }
}

/// The decoded result of a create or update mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationResponse {
    /// The subscription id, present only when the mutation succeeded.
    pub subscription_id: Option<String>,
    /// `userErrors` messages.
    pub user_errors: Vec<String>,
}

impl MutationResponse {
    /// Decodes `data.<mutation_name>` from a mutation response body.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::ShopifyError`] when `data.<mutation_name>` is
    /// absent, carrying any top-level GraphQL error messages.
    pub fn parse(body: &Value, mutation_name: &str) -> Result<Self, WebhookError> {
        let result = &body["data"][mutation_name];
        if !result.is_object() {
            return Err(response_error(body));
        }

        Ok(Self {
            subscription_id: result["webhookSubscription"]["id"]
                .as_str()
                .map(String::from),
            user_errors: user_error_messages(&result["userErrors"]),
        })
    }

    /// Returns `true` if the mutation produced a subscription.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.subscription_id.is_some()
    }
}

/// Decodes a delete mutation response into the deleted id.
///
/// # Errors
///
/// Returns [`WebhookError::ShopifyError`] for userErrors, a missing result
/// or a missing deleted id.
pub fn parse_delete_response(body: &Value) -> Result<String, WebhookError> {
    let result = &body["data"][DELETE_MUTATION];
    if !result.is_object() {
        return Err(response_error(body));
    }

    let user_errors = user_error_messages(&result["userErrors"]);
    if !user_errors.is_empty() {
        return Err(WebhookError::ShopifyError {
            message: user_errors.join("; "),
        });
    }

    result["deletedWebhookSubscriptionId"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| WebhookError::ShopifyError {
            message: "Missing deleted webhook subscription ID in response".to_string(),
        })
}

fn user_error_messages(user_errors: &Value) -> Vec<String> {
    user_errors
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["message"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn response_error(body: &Value) -> WebhookError {
    let messages: Vec<&str> = body["errors"]
        .as_array()
        .map(|errors| errors.iter().filter_map(|e| e["message"].as_str()).collect())
        .unwrap_or_default();

    let message = if messages.is_empty() {
        "Invalid response structure".to_string()
    } else {
        messages.join("; ")
    };
    WebhookError::ShopifyError { message }
}
