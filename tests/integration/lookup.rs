use inapp_update::core::{FailureKind, UpdateError};
use inapp_update::store::{AppStoreLookup, MetadataSource};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lookup_for(server: &MockServer) -> AppStoreLookup {
    AppStoreLookup::with_endpoint(format!("{}/lookup?id={{id}}", server.uri()))
}

#[tokio::test]
async fn test_lookup_returns_first_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("id", "284882215"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "resultCount": 1,
            "results": [{ "version": "2.2.0", "trackName": "Example" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let version = lookup_for(&server)
        .fetch_store_version("284882215", Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(version, "2.2.0");
}

#[tokio::test]
async fn test_non_200_is_a_lookup_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let error = lookup_for(&server)
        .fetch_store_version("1", Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(error, UpdateError::LookupStatus(404)));
    assert_eq!(error.kind(), FailureKind::TransientIo);
}

#[tokio::test]
async fn test_malformed_json_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let error = lookup_for(&server)
        .fetch_store_version("1", Duration::from_secs(5))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), FailureKind::MalformedData);
}

#[tokio::test]
async fn test_empty_results_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "resultCount": 0, "results": [] })),
        )
        .mount(&server)
        .await;

    let error = lookup_for(&server)
        .fetch_store_version("1", Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(error, UpdateError::MalformedMetadata(_)));
}

#[tokio::test]
async fn test_slow_lookup_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "results": [{ "version": "9.0" }] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let error = lookup_for(&server)
        .fetch_store_version("1", Duration::from_millis(200))
        .await
        .unwrap_err();

    assert!(matches!(error, UpdateError::Timeout(_)), "unexpected error: {error:?}");
}
