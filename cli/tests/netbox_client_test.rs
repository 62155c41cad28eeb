//! Integration tests for the NetBox client using wiremock.

use dcim_sync::{Config, NetBoxClient};
use dcim_sync_engine::{
    Changes, ManufacturerApi, ManufacturerInput, Payload, Reconciler, Stage, TagApi,
};
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Test Helpers
// =============================================================================

fn client(server: &MockServer) -> NetBoxClient {
    let config = Config {
        netbox_url: Url::parse(&server.uri()).unwrap(),
        token: "test-token".into(),
        timeout_secs: 5,
        verify_tls: true,
    };
    NetBoxClient::new(&config).unwrap()
}

fn page(results: serde_json::Value) -> serde_json::Value {
    let count = results.as_array().map_or(0, Vec::len);
    json!({"count": count, "next": null, "previous": null, "results": results})
}

fn juniper() -> serde_json::Value {
    json!({
        "id": 3,
        "url": "http://netbox/api/dcim/manufacturers/3/",
        "display": "Juniper",
        "name": "Juniper",
        "slug": "juniper",
        "description": "Juniper Networks",
        "tags": [{"id": 7, "name": "networking", "slug": "networking", "color": "9e9e9e"}]
    })
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn get_by_slug_sends_token_and_flattens_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/manufacturers/"))
        .and(query_param("slug", "juniper"))
        .and(header("Authorization", "Token test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([juniper()]))))
        .expect(1)
        .mount(&server)
        .await;

    let record = client(&server).get_by_slug("juniper").await.unwrap().unwrap();

    assert_eq!(record.id, 3);
    assert_eq!(record.description, "Juniper Networks");
    assert_eq!(record.tags, [7].into_iter().collect());
}

#[tokio::test]
async fn get_by_slug_without_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/manufacturers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]))))
        .mount(&server)
        .await;

    assert!(client(&server).get_by_slug("arista").await.unwrap().is_none());
}

#[tokio::test]
async fn get_by_id_not_found_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/manufacturers/42/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    assert!(client(&server).get_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn get_by_id_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/manufacturers/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(juniper()))
        .mount(&server)
        .await;

    let record = client(&server).get_by_id(3).await.unwrap().unwrap();
    assert_eq!(record.slug, "juniper");
}

#[tokio::test]
async fn filter_by_name_follows_pagination() {
    let server = MockServer::start().await;
    let next = format!("{}/api/dcim/manufacturers/?name=Cisco&offset=1", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/dcim/manufacturers/"))
        .and(query_param("name", "Cisco"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": next,
            "previous": null,
            "results": [{"id": 1, "name": "Cisco", "slug": "cisco", "description": "", "tags": []}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/manufacturers/"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [
                {"id": 2, "name": "Cisco", "slug": "cisco-meraki", "description": "", "tags": []}
            ]
        })))
        .mount(&server)
        .await;

    let records = client(&server).filter_by_name("Cisco").await.unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, [1, 2]);
}

#[tokio::test]
async fn tag_lookups() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/extras/tags/"))
        .and(query_param("slug", "Networking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/extras/tags/"))
        .and(query_param("name", "Networking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([
            {"id": 7, "name": "Networking", "slug": "networking", "color": "9e9e9e"}
        ]))))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.find_tag_by_slug("Networking").await.unwrap().is_none());
    assert_eq!(
        client.find_tag_by_name("Networking").await.unwrap().map(|t| t.id),
        Some(7)
    );
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn create_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dcim/manufacturers/"))
        .and(body_json(json!({"name": "Juniper", "slug": "juniper", "tags": [7]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(juniper()))
        .expect(1)
        .mount(&server)
        .await;

    let input = ManufacturerInput::new("Juniper").with_tags(["networking"]);
    let mut payload = Payload::assemble(&input, Stage::Merged, Some([7].into_iter().collect()));
    payload.ensure_slug();

    let created = client(&server).create(&payload).await.unwrap();
    assert_eq!(created.id, 3);
}

#[tokio::test]
async fn update_patches_changes_only() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/dcim/manufacturers/3/"))
        .and(body_json(json!({"description": "Juniper Networks, Inc."})))
        .respond_with(ResponseTemplate::new(200).set_body_json(juniper()))
        .expect(1)
        .mount(&server)
        .await;

    let changes = Changes {
        description: Some("Juniper Networks, Inc.".into()),
        ..Changes::default()
    };
    assert!(client(&server).update(3, &changes).await.unwrap());
}

#[tokio::test]
async fn delete_sends_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/dcim/manufacturers/3/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete(3).await.unwrap();
}

#[tokio::test]
async fn error_status_carries_body_as_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dcim/manufacturers/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "slug": ["manufacturer with this slug already exists."]
        })))
        .mount(&server)
        .await;

    let payload = Payload::assemble(&ManufacturerInput::new("Cisco"), Stage::Override, None);
    let err = client(&server).create(&payload).await.unwrap_err();

    assert_eq!(err.message, "400 Bad Request");
    assert_eq!(
        err.detail,
        Some(json!({"slug": ["manufacturer with this slug already exists."]}))
    );
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/dcim/manufacturers/3/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client(&server).delete(3).await.unwrap_err();
    assert_eq!(err.message, "502 Bad Gateway");
    assert_eq!(err.detail, Some(json!("Bad Gateway")));
}

// =============================================================================
// Through the engine
// =============================================================================

#[tokio::test]
async fn merged_update_issues_single_patch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/manufacturers/"))
        .and(query_param("slug", "juniper"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([juniper()]))))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/dcim/manufacturers/3/"))
        .and(body_json(json!({"description": "Juniper Networks, Inc."})))
        .respond_with(ResponseTemplate::new(200).set_body_json(juniper()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let input = ManufacturerInput::new("Juniper")
        .with_slug("juniper")
        .with_description("Juniper Networks, Inc.");

    let outcome = Reconciler::new(&client, &client)
        .reconcile(&input, Stage::Override, true)
        .await;
    assert!(outcome.changed);

    let input = input.with_lookup(dcim_sync_engine::Lookup::by_slug("juniper"));
    let outcome = Reconciler::new(&client, &client)
        .reconcile(&input, Stage::Merged, false)
        .await;

    assert!(outcome.changed);
    assert_eq!(outcome.msg, "Manufacturer 'Juniper' has been updated.");
}
