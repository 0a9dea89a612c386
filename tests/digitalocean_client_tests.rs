/// DigitalOcean client tests
///
/// Exercises the REST client against a mock API server.
/// Run with: cargo test --test digitalocean_client_tests
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use hanging_droplets_cleaner::{
    CleanerError, DigitalOceanClient, InventoryClient, PrefixMatcher, RemoteInstance,
};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn droplet_json(id: u64, name: &str, age_secs: i64) -> Value {
    let created_at = (Utc::now() - ChronoDuration::seconds(age_secs))
        .to_rfc3339_opts(SecondsFormat::Secs, true);
    json!({
        "id": id,
        "name": name,
        "created_at": created_at,
        "status": "active",
        "memory": 1024
    })
}

fn page(droplets: Vec<Value>, next: Option<String>) -> Value {
    let pages = match next {
        Some(next) => json!({ "next": next }),
        None => json!({}),
    };
    json!({
        "droplets": droplets,
        "links": { "pages": pages },
        "meta": { "total": 0 }
    })
}

fn matcher() -> PrefixMatcher {
    PrefixMatcher::new(["runner-abc123"]).unwrap()
}

fn instance(id: u64, name: &str) -> RemoteInstance {
    RemoteInstance::new(id, name, Utc::now())
}

#[tokio::test]
async fn test_list_follows_pages_and_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "200"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                droplet_json(1, "runner-abc123-old", 3600),
                droplet_json(2, "someone-else", 3600),
            ],
            Some(format!("{}/v2/droplets?page=2&per_page=200", server.uri())),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                droplet_json(3, "runner-abc123-fresh", 5),
                droplet_json(4, "runner-abc123-older", 7200),
            ],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = DigitalOceanClient::with_base_url(TOKEN, server.uri()).unwrap();
    let droplets = client.list(&matcher(), Duration::from_secs(600)).await.unwrap();

    let ids: Vec<u64> = droplets.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 4]);
}

#[tokio::test]
async fn test_list_without_age_returns_all_matching() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                droplet_json(1, "runner-abc123-a", 1),
                droplet_json(2, "runner-abc123-b", 3600),
                droplet_json(3, "other", 3600),
            ],
            None,
        )))
        .mount(&server)
        .await;

    let client = DigitalOceanClient::with_base_url(TOKEN, server.uri()).unwrap();
    let droplets = client.list(&matcher(), Duration::ZERO).await.unwrap();

    assert_eq!(droplets.len(), 2);
}

#[tokio::test]
async fn test_list_maps_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"id":"unauthorized","message":"Unable to authenticate you"}"#),
        )
        .mount(&server)
        .await;

    let client = DigitalOceanClient::with_base_url(TOKEN, server.uri()).unwrap();
    let err = client.list(&matcher(), Duration::ZERO).await.unwrap_err();

    match err {
        CleanerError::Api { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("unauthorized"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_page_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = DigitalOceanClient::with_base_url(TOKEN, server.uri()).unwrap();
    let err = client.list(&matcher(), Duration::ZERO).await.unwrap_err();
    assert!(matches!(err, CleanerError::Http(_)));
}

#[tokio::test]
async fn test_stop_powers_off_droplet() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/droplets/42/actions"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({ "type": "power_off" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "action": { "id": 1, "status": "in-progress", "type": "power_off" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DigitalOceanClient::with_base_url(TOKEN, server.uri()).unwrap();
    client.stop(&instance(42, "runner-abc123-x")).await.unwrap();
}

#[tokio::test]
async fn test_delete_removes_droplet() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/droplets/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = DigitalOceanClient::with_base_url(TOKEN, server.uri()).unwrap();
    client.delete(&instance(42, "runner-abc123-x")).await.unwrap();
}

#[tokio::test]
async fn test_delete_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/droplets/42"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = DigitalOceanClient::with_base_url(TOKEN, server.uri()).unwrap();
    let err = client.delete(&instance(42, "runner-abc123-x")).await.unwrap_err();
    assert!(matches!(err, CleanerError::Api { status: 404, .. }));
}

#[tokio::test]
async fn test_unreadable_creation_time_does_not_fail_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                droplet_json(1, "runner-abc123-old", 3600),
                json!({ "id": 2, "name": "database", "created_at": "not a time" }),
                json!({ "id": 3, "name": "runner-abc123-odd", "created_at": "" }),
            ],
            None,
        )))
        .mount(&server)
        .await;

    let client = DigitalOceanClient::with_base_url(TOKEN, server.uri()).unwrap();

    let aged = client.list(&matcher(), Duration::from_secs(600)).await.unwrap();
    let aged_ids: Vec<u64> = aged.iter().map(|d| d.id).collect();
    assert_eq!(aged_ids, vec![1]);

    let all = client.list(&matcher(), Duration::ZERO).await.unwrap();
    let all_ids: Vec<u64> = all.iter().map(|d| d.id).collect();
    assert_eq!(all_ids, vec![1, 3]);
}
