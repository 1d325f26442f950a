//! Webhook delivery methods.
//!
//! A [`DeliveryMethod`] decides how a subscription address is written into
//! the GraphQL mutation, which mutation is used, and whether the active API
//! version supports it at all.
//!
//! | method | create mutation | update mutation | address arguments |
//! |---|---|---|---|
//! | `Http` | `webhookSubscriptionCreate` | `webhookSubscriptionUpdate` | `callbackUrl` |
//! | `EventBridge` | `eventBridgeWebhookSubscriptionCreate` | `eventBridgeWebhookSubscriptionUpdate` | `arn` |
//! | `PubSub` | `pubSubWebhookSubscriptionCreate` | `pubSubWebhookSubscriptionUpdate` | `pubSubProject`, `pubSubTopic` |

use std::fmt;

use crate::config::{ApiVersion, ShopifyConfig};
use crate::webhooks::WebhookError;

const PUBSUB_SCHEME: &str = "pubsub://";

/// How Shopify delivers events for a subscription.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeliveryMethod {
    /// HTTPS POST to a callback URL on the application host.
    #[default]
    Http,
    /// Amazon EventBridge partner event source, addressed by ARN.
    EventBridge,
    /// Google Cloud Pub/Sub topic, addressed as `pubsub://<project>:<topic>`.
    ///
    /// Requires API version 2021-07 or later.
    PubSub,
}

/// GraphQL arguments describing where a subscription delivers.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::DeliveryMethod;
///
/// let args = DeliveryMethod::PubSub
///     .address_args("pubsub://my-project:orders")
///     .unwrap();
/// assert_eq!(args.to_graphql(), r#"pubSubProject: "my-project", pubSubTopic: "orders""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressArgs(Vec<(&'static str, String)>);

impl AddressArgs {
    /// Returns the argument names and values.
    #[must_use]
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.0
    }

    /// Renders the arguments as GraphQL input object fields.
    #[must_use]
    pub fn to_graphql(&self) -> String {
        self.0
            .iter()
            .map(|(name, value)| format!("{name}: {}", graphql_string(value)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Renders `value` as a GraphQL string literal.
///
/// GraphQL string escapes are a subset of JSON's, so JSON encoding is exact.
pub(crate) fn graphql_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

impl DeliveryMethod {
    /// All methods, in declaration order.
    pub const ALL: [Self; 3] = [Self::Http, Self::EventBridge, Self::PubSub];

    /// Returns the mutation that creates a subscription.
    #[must_use]
    pub const fn create_mutation_name(self) -> &'static str {
        match self {
            Self::Http => "webhookSubscriptionCreate",
            Self::EventBridge => "eventBridgeWebhookSubscriptionCreate",
            Self::PubSub => "pubSubWebhookSubscriptionCreate",
        }
    }

    /// Returns the mutation that updates a subscription in place.
    #[must_use]
    pub const fn update_mutation_name(self) -> &'static str {
        match self {
            Self::Http => "webhookSubscriptionUpdate",
            Self::EventBridge => "eventBridgeWebhookSubscriptionUpdate",
            Self::PubSub => "pubSubWebhookSubscriptionUpdate",
        }
    }

    /// Returns the update mutation when a subscription already exists and the
    /// create mutation otherwise.
    #[must_use]
    pub const fn mutation_name(self, existing: bool) -> &'static str {
        if existing {
            self.update_mutation_name()
        } else {
            self.create_mutation_name()
        }
    }

    /// Returns the GraphQL `__typename` of this method's endpoint.
    #[must_use]
    pub const fn endpoint_typename(self) -> &'static str {
        match self {
            Self::Http => "WebhookHttpEndpoint",
            Self::EventBridge => "WebhookEventBridgeEndpoint",
            Self::PubSub => "WebhookPubSubEndpoint",
        }
    }

    /// Maps an endpoint `__typename` back to its method.
    #[must_use]
    pub fn from_endpoint_typename(typename: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.endpoint_typename() == typename)
    }

    /// Returns `true` if `version` accepts subscriptions with this method.
    #[must_use]
    pub fn is_supported(self, version: &ApiVersion) -> bool {
        match self {
            Self::Http | Self::EventBridge => true,
            Self::PubSub => version.supports_pubsub(),
        }
    }

    /// Fails unless `version` supports this method.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::UnsupportedTransport`] for Pub/Sub below
    /// API version 2021-07.
    pub fn validate(self, version: &ApiVersion) -> Result<(), WebhookError> {
        if self.is_supported(version) {
            Ok(())
        } else {
            Err(WebhookError::UnsupportedTransport {
                method: self,
                version: version.clone(),
            })
        }
    }

    /// Builds the address-specific mutation arguments.
    ///
    /// Http and EventBridge addresses are used verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidPubSubAddress`] for a Pub/Sub address
    /// that is not `pubsub://<project>:<topic>` with both parts non-empty.
    pub fn address_args(self, address: &str) -> Result<AddressArgs, WebhookError> {
        let fields = match self {
            Self::Http => vec![("callbackUrl", address.to_string())],
            Self::EventBridge => vec![("arn", address.to_string())],
            Self::PubSub => {
                let (project, topic) = parse_pubsub_address(address)?;
                vec![
                    ("pubSubProject", project.to_string()),
                    ("pubSubTopic", topic.to_string()),
                ]
            }
        };
        Ok(AddressArgs(fields))
    }

    /// Resolves a handler path into the address a subscription should point
    /// at.
    ///
    /// Http paths are joined to the configured host's origin. EventBridge
    /// ARNs and Pub/Sub addresses are returned as given.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::HostNotConfigured`] for Http without a host.
    pub fn target_address(
        self,
        config: &ShopifyConfig,
        path: &str,
    ) -> Result<String, WebhookError> {
        match self {
            Self::Http => {
                let host = config.host().ok_or(WebhookError::HostNotConfigured)?;
                let separator = if path.starts_with('/') { "" } else { "/" };
                Ok(format!("{}{separator}{path}", host.origin()))
            }
            Self::EventBridge | Self::PubSub => Ok(path.to_string()),
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "Http",
            Self::EventBridge => "EventBridge",
            Self::PubSub => "PubSub",
        })
    }
}

/// Splits `pubsub://<project>:<topic>` into its parts.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidPubSubAddress`] when the scheme is missing
/// or either part is empty.
pub fn parse_pubsub_address(address: &str) -> Result<(&str, &str), WebhookError> {
    let invalid = || WebhookError::InvalidPubSubAddress {
        address: address.to_string(),
    };

    let rest = address.strip_prefix(PUBSUB_SCHEME).ok_or_else(invalid)?;
    let (project, topic) = rest.split_once(':').ok_or_else(invalid)?;
    if project.is_empty() || topic.is_empty() {
        return Err(invalid());
    }
    Ok((project, topic))
}

/// Formats a Pub/Sub project and topic as a `pubsub://` address.
#[must_use]
pub fn pubsub_address(project: &str, topic: &str) -> String {
    format!("{PUBSUB_SCHEME}{project}:{topic}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiSecretKey, HostUrl};

    fn config(host: Option<&str>) -> ShopifyConfig {
        let mut builder =
            ShopifyConfig::builder().api_secret_key(ApiSecretKey::new("secret").unwrap());
        if let Some(host) = host {
            builder = builder.host(HostUrl::new(host).unwrap());
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_mutation_names_per_method() {
        assert_eq!(
            DeliveryMethod::Http.mutation_name(false),
            "webhookSubscriptionCreate"
        );
        assert_eq!(
            DeliveryMethod::Http.mutation_name(true),
            "webhookSubscriptionUpdate"
        );
        assert_eq!(
            DeliveryMethod::EventBridge.mutation_name(false),
            "eventBridgeWebhookSubscriptionCreate"
        );
        assert_eq!(
            DeliveryMethod::EventBridge.mutation_name(true),
            "eventBridgeWebhookSubscriptionUpdate"
        );
        assert_eq!(
            DeliveryMethod::PubSub.mutation_name(false),
            "pubSubWebhookSubscriptionCreate"
        );
        assert_eq!(
            DeliveryMethod::PubSub.mutation_name(true),
            "pubSubWebhookSubscriptionUpdate"
        );
    }

    #[test]
    fn test_endpoint_typename_round_trip() {
        for method in DeliveryMethod::ALL {
            assert_eq!(
                DeliveryMethod::from_endpoint_typename(method.endpoint_typename()),
                Some(method)
            );
        }
        assert_eq!(DeliveryMethod::from_endpoint_typename("Unknown"), None);
    }

    #[test]
    fn test_default_method_is_http() {
        assert_eq!(DeliveryMethod::default(), DeliveryMethod::Http);
    }

    #[test]
    fn test_pubsub_version_gate() {
        let old = ApiVersion::Custom("2021-04".to_string());
        let cutoff = ApiVersion::Custom("2021-07".to_string());

        assert!(matches!(
            DeliveryMethod::PubSub.validate(&old),
            Err(WebhookError::UnsupportedTransport {
                method: DeliveryMethod::PubSub,
                ..
            })
        ));
        assert!(DeliveryMethod::PubSub.validate(&cutoff).is_ok());
        assert!(DeliveryMethod::Http.validate(&old).is_ok());
        assert!(DeliveryMethod::EventBridge.validate(&old).is_ok());
    }

    #[test]
    fn test_address_args_http_and_eventbridge_are_verbatim() {
        let args = DeliveryMethod::Http
            .address_args("https://app.example.com/webhooks")
            .unwrap();
        assert_eq!(
            args.to_graphql(),
            r#"callbackUrl: "https://app.example.com/webhooks""#
        );

        let arn = "arn:aws:events:us-east-1::event-source/aws.partner/shopify.com/1/source";
        let args = DeliveryMethod::EventBridge.address_args(arn).unwrap();
        assert_eq!(args.fields(), &[("arn", arn.to_string())]);
    }

    #[test]
    fn test_address_args_escape_string_literals() {
        let args = DeliveryMethod::Http
            .address_args(r#"https://app.example.com/"quoted"\path"#)
            .unwrap();
        assert_eq!(
            args.to_graphql(),
            r#"callbackUrl: "https://app.example.com/\"quoted\"\\path""#
        );
    }

    #[test]
    fn test_pubsub_address_parsing() {
        assert_eq!(
            parse_pubsub_address("pubsub://my-project:my-topic").unwrap(),
            ("my-project", "my-topic")
        );
        assert_eq!(pubsub_address("my-project", "my-topic"), "pubsub://my-project:my-topic");
    }

    #[test]
    fn test_malformed_pubsub_addresses_fail_locally() {
        for address in [
            "my-project:my-topic",
            "pubsub://",
            "pubsub://my-project",
            "pubsub://:my-topic",
            "pubsub://my-project:",
        ] {
            assert!(
                matches!(
                    DeliveryMethod::PubSub.address_args(address),
                    Err(WebhookError::InvalidPubSubAddress { .. })
                ),
                "{address} was accepted"
            );
        }
    }

    #[test]
    fn test_target_address_for_http_joins_host_origin() {
        let config = config(Some("https://app.example.com/ignored/base"));
        assert_eq!(
            DeliveryMethod::Http
                .target_address(&config, "/webhooks")
                .unwrap(),
            "https://app.example.com/webhooks"
        );
        assert_eq!(
            DeliveryMethod::Http.target_address(&config, "webhooks").unwrap(),
            "https://app.example.com/webhooks"
        );
    }

    #[test]
    fn test_target_address_for_http_requires_host() {
        assert!(matches!(
            DeliveryMethod::Http.target_address(&config(None), "/webhooks"),
            Err(WebhookError::HostNotConfigured)
        ));
        assert_eq!(
            DeliveryMethod::PubSub
                .target_address(&config(None), "pubsub://p:t")
                .unwrap(),
            "pubsub://p:t"
        );
    }
}
