//! Integration tests for 429 handling through the full client pipeline.

use std::sync::Arc;

use gedcomx_client::model::GEDCOMX_JSON;
use gedcomx_client::state::{CollectionResource, DefaultStateFactory};
use gedcomx_client::transport::{FEATURE_TAG_HEADER, THROTTLED_HEADER};
use gedcomx_client::{ClientConfig, GedcomxClient, HttpResponse, StatusClass};
use reqwest::StatusCode;
use reqwest::header::{HeaderValue, RETRY_AFTER};
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;
use support::stub::ScriptedTransport;

fn tagged_config() -> ClientConfig {
    ClientConfig {
        feature_tags: vec!["tree-merge".to_string(), "birth-search".to_string()],
        ..ClientConfig::default()
    }
}

fn scripted_client(config: &ClientConfig, transport: &Arc<ScriptedTransport>) -> GedcomxClient {
    support::init_tracing();
    GedcomxClient::with_transport(
        config,
        transport.clone(),
        Arc::new(DefaultStateFactory::gedcomx()),
    )
    .unwrap()
}

fn throttled() -> HttpResponse {
    HttpResponse::new(StatusCode::TOO_MANY_REQUESTS)
        .with_header(RETRY_AFTER, HeaderValue::from_static("0"))
}

#[tokio::test]
async fn test_retry_budget_exhausted_over_http() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/platform/collections/tree"))
        .and(header_regex(FEATURE_TAG_HEADER.as_str(), "^tree-merge,birth-search$"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let client = GedcomxClient::new(&tagged_config()).unwrap();
    let err = client
        .read_collection(&format!("{}/platform/collections/tree", server.uri()), &[])
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
    assert_eq!(
        err.response().unwrap().status_class(),
        StatusClass::Throttled
    );
}

#[tokio::test]
async fn test_success_after_throttle_is_marked() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/platform/collections/tree"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/platform/collections/tree"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", GEDCOMX_JSON)
                .set_body_string(r#"{"collections": [{"id": "FSFT"}]}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GedcomxClient::new(&ClientConfig::default()).unwrap();
    let collection = client
        .read_collection(&format!("{}/platform/collections/tree", server.uri()), &[])
        .await
        .unwrap();

    assert_eq!(collection.status(), StatusCode::OK);
    assert!(collection.response().was_throttled());
    assert_eq!(
        collection.response().header_str(THROTTLED_HEADER),
        Some("true")
    );
    assert_eq!(collection.scope().unwrap().unwrap().id.as_deref(), Some("FSFT"));
}

#[tokio::test]
async fn test_every_attempt_is_tagged() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.push(throttled());
    transport.push(throttled());
    transport.push(
        HttpResponse::new(StatusCode::OK).with_body(r#"{"collections": [{"id": "FSFT"}]}"#),
    );

    let client = scripted_client(&tagged_config(), &transport);
    let collection = client
        .read::<CollectionResource>("https://api.example.com/platform/collections/tree", &[])
        .await
        .unwrap();

    assert!(collection.response().was_throttled());
    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(
            request.header_str(FEATURE_TAG_HEADER),
            Some("tree-merge,birth-search")
        );
    }
}

#[tokio::test]
async fn test_zero_budget_sends_once() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.push(throttled());
    let config = ClientConfig {
        max_throttle_retries: 0,
        ..ClientConfig::default()
    };

    let err = scripted_client(&config, &transport)
        .read_collection("https://api.example.com/platform/collections/tree", &[])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test]
async fn test_unparsable_retry_after_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.push(
        HttpResponse::new(StatusCode::TOO_MANY_REQUESTS)
            .with_header(RETRY_AFTER, HeaderValue::from_static("later")),
    );

    let err = scripted_client(&ClientConfig::default(), &transport)
        .read_collection("https://api.example.com/platform/collections/tree", &[])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test]
async fn test_budgets_are_per_exchange() {
    let transport = Arc::new(ScriptedTransport::default());
    let client = scripted_client(&ClientConfig::default(), &transport);
    for _ in 0..2 {
        transport.push(throttled());
        transport.push(throttled());
        transport.push(HttpResponse::new(StatusCode::OK).with_body(r#"{"collections": []}"#));
        client
            .read_collection("https://api.example.com/platform/collections/tree", &[])
            .await
            .unwrap();
    }
    assert_eq!(transport.attempts(), 6);
}
