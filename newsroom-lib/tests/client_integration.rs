//! Integration tests for the Newsroom HTTP client.
//!
//! These tests run `NewsroomClient` against hand-written wiremock mocks for
//! wire format and failure mapping. Stateful round trips against
//! `MockNewsroomServer` live in `tests/mock_server.rs`.
//!
//! # Running Tests
//!
//! ## Mock tests (default, no network required)
//!
//! ```bash
//! cargo test -p newsroom-lib --test client_integration
//! ```
//!
//! ## Real universe tests
//!
//! These tests are marked `#[ignore]` and need credentials of a test
//! universe:
//!
//! ```bash
//! export NEWSROOM_UNIVERSE=TESTU
//! export NEWSROOM_APP_ID=my-site
//! export NEWSROOM_SECRET=...
//! export NEWSROOM_TEST_LIST=1111
//! cargo test -p newsroom-lib --test client_integration -- --ignored
//! ```

use std::time::Duration;

use newsroom_lib::{
    ClientConfiguration, DigestAlgorithm, NewsroomClient, NewsroomError, NewsroomErrorCode,
    SubscriptionRequest, SubscriptionStatus,
};
use wiremock::{
    matchers::{any, body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const SECRET: &str = "phpunit-test-private-key";

fn config(server: &MockServer) -> ClientConfiguration {
    ClientConfiguration::new("U", "A", SECRET).with_base_url(server.uri())
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

// ============================================================================
// Subscribe
// ============================================================================

#[tokio::test]
async fn test_subscribe_wire_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/newsroom/api/v1/subscribe"))
        .and(body_partial_json(serde_json::json!({
            "key": "a9402011c5d7620615d4d1d95568e9f6",
            "subscription": {
                "universeAcronym": "U",
                "topicExtWebsite": "A",
                "sv_id": "1111,2222",
                "email": "Test@example.com",
                "language": "it"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "newsletterId": 1111,
                "newsletterName": "Daily news",
                "isNewSubscription": true,
                "feedbackMessage": "Grazie",
                "language": "it",
                "status": "Valid",
                "universeAcronym": "U",
                "email": "Test@example.com",
                "unsubscriptionLink": "https://example.com/unsubscribe/1111"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = NewsroomClient::new(config(&mock_server)).unwrap();
    let request =
        SubscriptionRequest::new("Test@example.com", ["1111", "2222"]).with_language("it");

    let sub = client.subscribe(&request).await.unwrap();

    assert_eq!(sub.list_id, "1111");
    assert_eq!(sub.list_name.as_deref(), Some("Daily news"));
    assert!(sub.is_new_subscription);
    assert_eq!(sub.feedback_message, "Grazie");
    assert_eq!(sub.status, SubscriptionStatus::Valid);
    assert_eq!(
        sub.unsubscription_link.as_deref(),
        Some("https://example.com/unsubscribe/1111")
    );
}

#[tokio::test]
async fn test_subscribe_sha256_normalized_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/newsroom/api/v1/subscribe"))
        .and(body_partial_json(serde_json::json!({
            "key": "fe8d226fd629a8bc62305e702fa2af147ad6603838d556053eed2ac8b3c920f7",
            "subscription": { "email": "test@example.com" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "newsletterId": "1111", "isNewSubscription": false }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config(&mock_server)
        .with_digest(DigestAlgorithm::Sha256)
        .with_normalize_email(true);
    let client = NewsroomClient::new(config).unwrap();

    let sub = client
        .subscribe(&SubscriptionRequest::new("Test@example.com", ["1111"]))
        .await
        .unwrap();
    assert!(!sub.is_new_subscription);
    assert_eq!(sub.email, "test@example.com");
}

#[tokio::test]
async fn test_subscribe_server_error_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/newsroom/api/v1/subscribe"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = NewsroomClient::new(config(&mock_server)).unwrap();
    let err = client
        .subscribe(&SubscriptionRequest::new("a@b.eu", ["1111"]))
        .await
        .unwrap_err();

    assert_eq!(err.code(), NewsroomErrorCode::ServiceUnavailable);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_subscribe_client_error_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/newsroom/api/v1/subscribe"))
        .respond_with(ResponseTemplate::new(400).set_body_string("wrong key"))
        .mount(&mock_server)
        .await;

    let client = NewsroomClient::new(config(&mock_server)).unwrap();
    let err = client
        .subscribe(&SubscriptionRequest::new("a@b.eu", ["1111"]))
        .await
        .unwrap_err();

    assert_eq!(err.code(), NewsroomErrorCode::InvalidResponse);
    assert!(err.to_string().contains("wrong key"));
}

#[tokio::test]
async fn test_subscribe_unusable_bodies() {
    for body in ["", "null", "<html>maintenance</html>"] {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/newsroom/api/v1/subscribe"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let client = NewsroomClient::new(config(&mock_server)).unwrap();
        let err = client
            .subscribe(&SubscriptionRequest::new("a@b.eu", ["1111"]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), NewsroomErrorCode::InvalidResponse, "body {:?}", body);
    }
}

#[tokio::test]
async fn test_subscribe_timeout_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/newsroom/api/v1/subscribe"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client = NewsroomClient::new(config(&mock_server).with_timeout(1)).unwrap();
    let err = client
        .subscribe(&SubscriptionRequest::new("a@b.eu", ["1111"]))
        .await
        .unwrap_err();

    assert!(matches!(err, NewsroomError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn test_unreachable_remote_is_unavailable() {
    let config = ClientConfiguration::new("U", "A", SECRET).with_base_url("http://127.0.0.1:9");
    let client = NewsroomClient::new(config).unwrap();

    let err = client
        .subscribe(&SubscriptionRequest::new("a@b.eu", ["1111"]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), NewsroomErrorCode::ServiceUnavailable);

    let err = client
        .unsubscribe("a@b.eu", &ids(&["1111"]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), NewsroomErrorCode::ServiceUnavailable);
}

// ============================================================================
// Unsubscribe
// ============================================================================

#[tokio::test]
async fn test_unsubscribe_one_request_per_list() {
    let mock_server = MockServer::start().await;

    for list in ["1111", "2222"] {
        Mock::given(method("GET"))
            .and(path("/newsroom/api/v1/unsubscribe"))
            .and(query_param("sv_id", list))
            .and(query_param("user_email", "Test@example.com"))
            .and(query_param("key", "a9402011c5d7620615d4d1d95568e9f6"))
            .and(query_param("app", "A"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User unsubscribed!"))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = NewsroomClient::new(config(&mock_server)).unwrap();
    let done = client
        .unsubscribe("Test@example.com", &ids(&["1111", "2222"]))
        .await
        .unwrap();
    assert!(done);
}

#[tokio::test]
async fn test_unsubscribe_stops_at_first_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/newsroom/api/v1/unsubscribe"))
        .and(query_param("sv_id", "1111"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User unsubscribed!"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/newsroom/api/v1/unsubscribe"))
        .and(query_param("sv_id", "2222"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/newsroom/api/v1/unsubscribe"))
        .and(query_param("sv_id", "3333"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = NewsroomClient::new(config(&mock_server)).unwrap();
    let done = client
        .unsubscribe("a@b.eu", &ids(&["1111", "2222", "3333"]))
        .await
        .unwrap();
    assert!(!done);
}

// ============================================================================
// Subscriptions lookup
// ============================================================================

#[tokio::test]
async fn test_is_subscribed_query_and_bodies() {
    let cases = [
        (serde_json::json!([{ "newsletterId": "2222" }]), true),
        (serde_json::json!([]), false),
        (serde_json::Value::Null, false),
    ];

    for (body, expected) in cases {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/newsroom/api/v1/subscriptions"))
            .and(query_param("sv_id", "1111,2222"))
            .and(query_param("universe_acronym", "U"))
            .and(query_param("user_email", "a@b.eu"))
            .and(query_param("app", "A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = NewsroomClient::new(config(&mock_server)).unwrap();
        let subscribed = client
            .is_subscribed("a@b.eu", &ids(&["1111", "2222"]))
            .await
            .unwrap();
        assert_eq!(subscribed, expected);
    }
}

#[tokio::test]
async fn test_is_subscribed_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/newsroom/api/v1/subscriptions"))
        .and(query_param("user_email", "down@b.eu"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/newsroom/api/v1/subscriptions"))
        .and(query_param("user_email", "garbled@b.eu"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{oops"))
        .mount(&mock_server)
        .await;

    let client = NewsroomClient::new(config(&mock_server)).unwrap();

    let err = client.is_subscribed("down@b.eu", &[]).await.unwrap_err();
    assert_eq!(err.code(), NewsroomErrorCode::ServiceUnavailable);

    let err = client.is_subscribed("garbled@b.eu", &[]).await.unwrap_err();
    assert_eq!(err.code(), NewsroomErrorCode::InvalidResponse);
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_not_configured_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = ClientConfiguration::new("U", "", SECRET).with_base_url(mock_server.uri());
    let client = NewsroomClient::new(config).unwrap();

    let err = client
        .subscribe(&SubscriptionRequest::new("a@b.eu", ["1111"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NewsroomError::NotConfigured { ref missing } if missing == &vec!["app_id"]
    ));
    assert!(client.unsubscribe("a@b.eu", &ids(&["1111"])).await.is_err());
    assert!(client.is_subscribed("a@b.eu", &ids(&["1111"])).await.is_err());
}

// ============================================================================
// Real universe tests (require credentials - marked #[ignore])
// ============================================================================

#[tokio::test]
#[ignore = "Requires a test universe - set NEWSROOM_UNIVERSE, NEWSROOM_APP_ID, NEWSROOM_SECRET, NEWSROOM_TEST_LIST"]
async fn test_real_subscribe_and_unsubscribe() {
    let config = ClientConfiguration::from_env().expect("config from env");
    let list = std::env::var("NEWSROOM_TEST_LIST").expect("NEWSROOM_TEST_LIST required");
    let client = NewsroomClient::new(config).expect("Failed to create client");
    let email = "newsroom-lib-test@example.com";

    let sub = client
        .subscribe(&SubscriptionRequest::new(email, [list.clone()]).with_language("en"))
        .await;
    println!("Subscribe result: {:?}", sub);

    let lookup = client.is_subscribed(email, &[list.clone()]).await;
    println!("Lookup result: {:?}", lookup);

    let done = client.unsubscribe(email, &[list]).await;
    println!("Unsubscribe result: {:?}", done);
}
