//! End-to-end registration tests against a mock Admin API.
//!
//! Call counts are asserted with `Mock::expect`, so a redundant mutation
//! fails the test when the mock server is dropped.

use shopify_webhooks::webhooks::{
    register, register_all, unregister, DeliveryMethod, HandlerEntry, HandlerTable,
    RegisterAllOptions, RegisterOptions, RegistrationAction, WebhookError,
};
use shopify_webhooks::{ApiSecretKey, ApiVersion, HostUrl, Session, ShopDomain, ShopifyConfig};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP_HOST: &str = "https://app.example.com";
const GRAPHQL_PATH: &str = "/admin/api/2025-01/graphql.json";

fn session() -> Session {
    Session::new(ShopDomain::new("test-shop").unwrap(), "test-token")
}

fn config_for(server: &MockServer, version: ApiVersion) -> ShopifyConfig {
    ShopifyConfig::builder()
        .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
        .host(HostUrl::new(APP_HOST).unwrap())
        .api_host(HostUrl::new(server.uri()).unwrap())
        .api_version(version)
        .build()
        .unwrap()
}

fn noop(path: &str) -> HandlerEntry {
    HandlerEntry::new(path, |_: String, _: String, _: Vec<u8>| async { Ok(()) })
}

fn no_subscription() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "data": {"webhookSubscriptions": {"edges": []}}
    }))
}

fn existing_http(id: &str, callback_url: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "data": {
            "webhookSubscriptions": {
                "edges": [{
                    "node": {
                        "id": id,
                        "endpoint": {
                            "__typename": "WebhookHttpEndpoint",
                            "callbackUrl": callback_url
                        }
                    }
                }]
            }
        }
    }))
}

fn created(mutation: &str, id: &str) -> ResponseTemplate {
    let mut data = serde_json::Map::new();
    data.insert(
        mutation.to_string(),
        serde_json::json!({
            "userErrors": [],
            "webhookSubscription": {"id": id}
        }),
    );
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data }))
}

fn check_query_for(topic: &str) -> String {
    format!("webhookSubscriptions(first: 1, topics: {topic})")
}

// ============================================================================
// register
// ============================================================================

#[tokio::test]
async fn test_register_same_address_twice_issues_one_mutation() {
    let server = MockServer::start().await;
    let id = "gid://shopify/WebhookSubscription/1";

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains(check_query_for("ORDERS_CREATE")))
        .respond_with(no_subscription())
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains(check_query_for("ORDERS_CREATE")))
        .respond_with(existing_http(id, "https://app.example.com/webhooks"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("webhookSubscriptionCreate(topic: ORDERS_CREATE"))
        .respond_with(created("webhookSubscriptionCreate", id))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, ApiVersion::V2025_01);
    let session = session();

    let first = register(&config, RegisterOptions::new("orders/create", "/webhooks", &session))
        .await
        .unwrap();
    let second = register(&config, RegisterOptions::new("orders/create", "/webhooks", &session))
        .await
        .unwrap();

    assert!(first.success);
    assert_eq!(first.action, RegistrationAction::Created);
    assert_eq!(first.subscription_id(), Some(id));
    assert!(second.success);
    assert_eq!(second.action, RegistrationAction::Skipped { id: id.to_string() });
}

#[tokio::test]
async fn test_register_different_address_issues_update() {
    let server = MockServer::start().await;
    let id = "gid://shopify/WebhookSubscription/5";

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains(check_query_for("PRODUCTS_UPDATE")))
        .respond_with(existing_http(id, "https://old-app.example.com/webhooks"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("webhookSubscriptionUpdate(id:"))
        .respond_with(created("webhookSubscriptionUpdate", id))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("webhookSubscriptionCreate"))
        .respond_with(created("webhookSubscriptionCreate", id))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server, ApiVersion::V2025_01);
    let session = session();

    let outcome = register(
        &config,
        RegisterOptions::new("products/update", "/webhooks", &session),
    )
    .await
    .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.action, RegistrationAction::Updated { id: id.to_string() });
    assert_eq!(
        outcome.result["data"]["webhookSubscriptionUpdate"]["webhookSubscription"]["id"],
        id
    );
}

#[tokio::test]
async fn test_pubsub_below_cutoff_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(no_subscription())
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server, ApiVersion::Custom("2021-04".to_string()));
    let session = session();

    let result = register(
        &config,
        RegisterOptions::new("orders/create", "pubsub://my-project:orders", &session)
            .delivery_method(DeliveryMethod::PubSub),
    )
    .await;

    let error = result.unwrap_err();
    assert!(matches!(error, WebhookError::UnsupportedTransport { .. }));
    assert_eq!(
        error.to_string(),
        "Webhook delivery method PubSub is not supported in API version 2021-04"
    );
}

#[tokio::test]
async fn test_register_http_without_host_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(no_subscription())
        .expect(0)
        .mount(&server)
        .await;

    let config = ShopifyConfig::builder()
        .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
        .api_host(HostUrl::new(server.uri()).unwrap())
        .build()
        .unwrap();
    let session = session();

    let result = register(
        &config,
        RegisterOptions::new("orders/create", "/webhooks", &session),
    )
    .await;

    assert!(matches!(result, Err(WebhookError::HostNotConfigured)));
}

// ============================================================================
// register_all
// ============================================================================

#[tokio::test]
async fn test_register_all_reports_every_topic_when_one_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains(check_query_for("APP_UNINSTALLED")))
        .respond_with(no_subscription())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains(check_query_for("ORDERS_CREATE")))
        .respond_with(no_subscription())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains(check_query_for("PRODUCTS_UPDATE")))
        .respond_with(no_subscription())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("webhookSubscriptionCreate(topic: APP_UNINSTALLED"))
        .respond_with(created("webhookSubscriptionCreate", "gid://shopify/WebhookSubscription/1"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("webhookSubscriptionCreate(topic: ORDERS_CREATE"))
        .respond_with(
            ResponseTemplate::new(502)
                .set_body_json(serde_json::json!({"errors": "Bad Gateway"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("webhookSubscriptionCreate(topic: PRODUCTS_UPDATE"))
        .respond_with(created("webhookSubscriptionCreate", "gid://shopify/WebhookSubscription/3"))
        .expect(1)
        .mount(&server)
        .await;

    let mut handlers = HandlerTable::new();
    handlers
        .add_many([
            ("app/uninstalled", noop("/webhooks/app")),
            ("orders/create", noop("/webhooks/orders")),
            ("products/update", noop("/webhooks/products")),
        ])
        .unwrap();

    let config = config_for(&server, ApiVersion::V2025_01);
    let session = session();

    let results = register_all(&config, &handlers, RegisterAllOptions::new(&session))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results["APP_UNINSTALLED"].as_ref().unwrap().success);
    assert!(matches!(
        &results["ORDERS_CREATE"],
        Err(WebhookError::GraphqlError(e)) if e.to_string().contains("Bad Gateway")
    ));
    let products = results["PRODUCTS_UPDATE"].as_ref().unwrap();
    assert!(products.success);
    assert_eq!(products.subscription_id(), Some("gid://shopify/WebhookSubscription/3"));
}

#[tokio::test]
async fn test_register_all_with_empty_table_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(no_subscription())
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server, ApiVersion::V2025_01);
    let session = session();

    let results = register_all(&config, &HandlerTable::new(), RegisterAllOptions::new(&session))
        .await
        .unwrap();

    assert!(results.is_empty());
}

// ============================================================================
// unregister
// ============================================================================

#[tokio::test]
async fn test_unregister_deletes_subscription() {
    let server = MockServer::start().await;
    let id = "gid://shopify/WebhookSubscription/8";

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains(check_query_for("ORDERS_CREATE")))
        .respond_with(existing_http(id, "https://app.example.com/webhooks"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("webhookSubscriptionDelete(id:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "webhookSubscriptionDelete": {
                    "userErrors": [],
                    "deletedWebhookSubscriptionId": id
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, ApiVersion::V2025_01);

    let deleted = unregister(&config, &session(), "orders/create").await.unwrap();

    assert_eq!(deleted, id);
}
