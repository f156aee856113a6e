//! Integration tests for the catalog client against a stub catalog.
//!
//! The client is blocking, so every call runs inside `spawn_blocking` while
//! wiremock serves requests on the test runtime.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use atlas_client::{
    AttributeFilter, CatalogClient, EntityPayload, EntityRecord, EntityStatus, Error,
    SearchOptions, TypeDef, TypeDefPayload,
};
use atlas_config::{ConnectionEntry, ConnectionsConfig, SecretRef};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// `admin:admin`, base64-encoded.
const BASIC_ADMIN: &str = "Basic YWRtaW46YWRtaW4=";

const PLACEMENTS: &str = "dcm_matchtable_placements_2019_03_17.csv";

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

fn client_for(uri: &str) -> CatalogClient {
    CatalogClient::builder()
        .base_url(uri)
        .credentials("admin", "admin")
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn placements_record() -> EntityRecord {
    EntityRecord::new("hdfs_path")
        .with_attribute("qualifiedName", PLACEMENTS)
        .with_attribute("name", PLACEMENTS)
        .with_attribute("path", "/tenant10/subtenant101/dcm/matchtables/")
        .with_status(EntityStatus::Active)
        .with_version(1)
}

fn header_json(guid: &str, name: &str) -> Value {
    json!({
        "guid": guid,
        "typeName": "hdfs_path",
        "status": "ACTIVE",
        "displayText": name,
        "attributes": {"qualifiedName": name, "name": name}
    })
}

/// Stub type registry: creates only names it has not seen.
#[derive(Clone, Default)]
struct TypeStore(Arc<Mutex<BTreeMap<String, Value>>>);

const TYPEDEF_GROUPS: [&str; 4] = ["enumDefs", "structDefs", "entityDefs", "classificationDefs"];

impl Respond for TypeStore {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let payload: Value = request.body_json().unwrap();
        let mut store = self.0.lock().unwrap();
        let mut created = serde_json::Map::new();
        for group in TYPEDEF_GROUPS {
            let mut new_defs = Vec::new();
            for def in payload[group].as_array().into_iter().flatten() {
                let name = def["name"].as_str().unwrap().to_string();
                if !store.contains_key(&name) {
                    store.insert(name, def.clone());
                    new_defs.push(def.clone());
                }
            }
            created.insert(group.to_string(), Value::Array(new_defs));
        }
        ResponseTemplate::new(200).set_body_json(Value::Object(created))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Type definitions
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_create_typedefs_twice_is_idempotent() {
    let server = MockServer::start().await;
    let store = TypeStore::default();
    Mock::given(method("POST"))
        .and(path("/api/atlas/v2/types/typedefs"))
        .and(header("authorization", BASIC_ADMIN))
        .respond_with(store.clone())
        .expect(2)
        .mount(&server)
        .await;

    let uri = server.uri();
    let (first, second) = blocking(move || {
        let client = client_for(&uri);
        let payload = TypeDefPayload {
            classification_defs: vec![
                TypeDef::classification("Processed")
                    .with_description("Used for classifying data that has been processed."),
            ],
            ..Default::default()
        };
        let first = client.typedefs().create(&payload).unwrap();
        let second = client.typedefs().create(&payload).unwrap();
        (first, second)
    })
    .await;

    assert_eq!(first.body["classificationDefs"].as_array().unwrap().len(), 1);
    assert!(second.body["classificationDefs"].as_array().unwrap().is_empty());

    let stored = store.0.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored.contains_key("Processed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_typedef_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/types/typedef/name/Processed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "Processed", "category": "CLASSIFICATION"})),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = blocking(move || client_for(&uri).typedefs().get_by_name("Processed"))
        .await
        .unwrap();
    assert_eq!(response.body["category"], "CLASSIFICATION");
}

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_create_entity_posts_single_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/atlas/v2/entity"))
        .and(header("authorization", BASIC_ADMIN))
        .and(body_json(json!({
            "entity": {
                "typeName": "hdfs_path",
                "attributes": {
                    "qualifiedName": PLACEMENTS,
                    "name": PLACEMENTS,
                    "path": "/tenant10/subtenant101/dcm/matchtables/"
                },
                "status": "ACTIVE",
                "version": 1
            },
            "referredEntities": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mutatedEntities": {"CREATE": [header_json("g-1", PLACEMENTS)]},
            "guidAssignments": {"-1": "g-1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = blocking(move || {
        client_for(&uri)
            .entities()
            .create(&EntityPayload::single(placements_record()))
    })
    .await
    .unwrap();

    assert_eq!(response.status, 200);
    let mutations = response.mutations().unwrap();
    assert_eq!(mutations.created()[0].guid.as_deref(), Some("g-1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_entities_bulk_posts_bulk_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/atlas/v2/entity/bulk"))
        .and(body_json(json!({
            "entities": [
                {"typeName": "hdfs_path", "attributes": {"qualifiedName": "a.csv"}},
                {"typeName": "hdfs_path", "attributes": {"qualifiedName": "b.csv"}}
            ],
            "referredEntities": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mutatedEntities": {"UPDATE": [header_json("g-a", "a.csv"), header_json("g-b", "b.csv")]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = blocking(move || {
        let payload = EntityPayload::new(vec![
            EntityRecord::new("hdfs_path").with_attribute("qualifiedName", "a.csv"),
            EntityRecord::new("hdfs_path").with_attribute("qualifiedName", "b.csv"),
        ]);
        client_for(&uri).entities().create_bulk(&payload)
    })
    .await
    .unwrap();

    assert_eq!(response.mutations().unwrap().updated().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_entity_rejects_multi_record_payload_without_io() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || {
        let payload = EntityPayload::new(vec![placements_record(), placements_record()]);
        client_for(&uri).entities().create(&payload)
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::InvalidPayload(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_type_surfaces_validation_error() {
    let server = MockServer::start().await;
    let body = r#"{"errorCode":"ATLAS-404-00-001","errorMessage":"Given typename hdfs_pathx was invalid"}"#;
    Mock::given(method("POST"))
        .and(path("/api/atlas/v2/entity"))
        .respond_with(ResponseTemplate::new(404).set_body_string(body))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || {
        let payload = EntityPayload::single(EntityRecord::new("hdfs_pathx"));
        client_for(&uri).entities().create(&payload)
    })
    .await
    .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.server_body(), Some(body));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_body_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/atlas/v2/entity/bulk"))
        .respond_with(ResponseTemplate::new(401).set_body_string("<html>Unauthorized</html>"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || {
        client_for(&uri)
            .entities()
            .create_bulk(&EntityPayload::single(placements_record()))
    })
    .await
    .unwrap_err();

    assert!(matches!(&err, Error::Rejected { status: 401, body } if body == "<html>Unauthorized</html>"));
    assert!(!err.is_retryable());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_entity_by_unique_attribute() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/entity/uniqueAttribute/type/hdfs_path"))
        .and(query_param("attr:qualifiedName", PLACEMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entity": {"guid": "g-1", "typeName": "hdfs_path", "attributes": {"qualifiedName": PLACEMENTS}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = blocking(move || {
        client_for(&uri)
            .entities()
            .get_by_unique_attribute("hdfs_path", "qualifiedName", PLACEMENTS)
    })
    .await
    .unwrap();

    assert_eq!(response.body["entity"]["guid"], "g-1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_entity_by_guid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/entity/guid/g-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entity": {"guid": "g-1", "typeName": "hdfs_path", "attributes": {"qualifiedName": PLACEMENTS}},
            "referredEntities": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = blocking(move || client_for(&uri).entities().get_by_guid("g-1"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body["entity"]["attributes"]["qualifiedName"], PLACEMENTS);
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_attribute_search_walks_all_pages_in_order() {
    let server = MockServer::start().await;
    for (offset, body) in [
        ("0", json!({"queryType": "ATTRIBUTE", "entities": [header_json("g-1", PLACEMENTS)]})),
        ("1", json!({"queryType": "ATTRIBUTE", "entities": [header_json("g-2", "placements_copy.csv")]})),
        ("2", json!({"queryType": "ATTRIBUTE"})),
    ] {
        Mock::given(method("GET"))
            .and(path("/api/atlas/v2/search/attribute"))
            .and(query_param("name", PLACEMENTS))
            .and(query_param("limit", "1"))
            .and(query_param("offset", offset))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let uri = server.uri();
    let result = blocking(move || {
        client_for(&uri).search().by_attributes_with_options(
            &AttributeFilter::new().with("name", PLACEMENTS),
            SearchOptions::default().with_page_size(1),
        )
    })
    .await
    .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.entities[0]["name"], PLACEMENTS);
    assert_eq!(result.entities[1]["name"], "placements_copy.csv");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dsl_search_single_short_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/search/dsl"))
        .and(query_param("query", "hdfs_path"))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queryType": "DSL",
            "queryText": "hdfs_path",
            "entities": [header_json("g-1", "a.csv"), header_json("g-2", "b.csv")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = blocking(move || client_for(&uri).search().by_dsl("hdfs_path"))
        .await
        .unwrap();

    let names: Vec<_> = result
        .iter()
        .map(|a| a["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a.csv", "b.csv"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_respects_page_cap() {
    let server = MockServer::start().await;
    for (offset, guid) in [("0", "g-1"), ("1", "g-2"), ("2", "g-3")] {
        Mock::given(method("GET"))
            .and(path("/api/atlas/v2/search/dsl"))
            .and(query_param("offset", offset))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "queryType": "DSL",
                "entities": [header_json(guid, "a.csv")]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let uri = server.uri();
    let result = blocking(move || {
        client_for(&uri).search().by_dsl_with_options(
            "hdfs_path",
            SearchOptions::default().with_page_size(1).with_max_pages(3),
        )
    })
    .await
    .unwrap();

    assert_eq!(result.len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_search_page_fails_loudly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/search/dsl"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queryType": "DSL",
            "entities": [header_json("g-1", "a.csv")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/search/dsl"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || {
        client_for(&uri)
            .search()
            .by_dsl_with_options("hdfs_path", SearchOptions::default().with_page_size(1))
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse { .. }));
    assert_eq!(err.server_body(), Some("<html>proxy error</html>"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_stops_when_catalog_ignores_offset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/search/dsl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queryType": "DSL",
            "entities": [header_json("g-1", "a.csv"), header_json("g-2", "b.csv")]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || {
        client_for(&uri).search().by_dsl_with_options(
            "hdfs_path limit 2",
            SearchOptions::default().with_page_size(2),
        )
    })
    .await
    .unwrap_err();

    match &err {
        Error::MalformedResponse { reason, .. } => assert!(reason.contains("offset 2")),
        other => panic!("Expected MalformedResponse, got {:?}", other),
    }
    assert!(!err.is_retryable());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dsl_projection_response_fails_loudly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/search/dsl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queryType": "DSL",
            "attributes": {"name": ["name"], "values": [["a.csv"], ["b.csv"]]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || {
        client_for(&uri)
            .search()
            .by_dsl("hdfs_path select name")
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse { .. }));
    assert!(err.server_body().unwrap().contains("values"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unrecognized_search_object_fails_loudly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/search/attribute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || {
        client_for(&uri)
            .search()
            .by_attributes(&AttributeFilter::new().with("name", PLACEMENTS))
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse { .. }));
    assert_eq!(err.server_body(), Some(r#"{"unexpected":true}"#));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_filter_cannot_override_paging() {
    let err = blocking(|| {
        client_for("http://127.0.0.1:1")
            .search()
            .by_attributes(&AttributeFilter::new().with("limit", "5"))
    })
    .await
    .unwrap_err();
    assert!(matches!(err, Error::InvalidPayload(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_hits_can_be_upserted_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/search/attribute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queryType": "ATTRIBUTE",
            "entities": [header_json("g-1", PLACEMENTS)]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/atlas/v2/entity"))
        .and(body_json(json!({
            "entity": {
                "typeName": "hdfs_path",
                "attributes": {"qualifiedName": PLACEMENTS, "name": PLACEMENTS}
            },
            "referredEntities": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mutatedEntities": {"UPDATE": [header_json("g-1", PLACEMENTS)]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = blocking(move || {
        let client = client_for(&uri);
        let hits = client
            .search()
            .by_attributes(&AttributeFilter::new().with("name", PLACEMENTS))?;
        let attributes = hits.entities.into_iter().next().unwrap();
        let record = EntityRecord::from_attributes("hdfs_path", attributes);
        client.entities().create(&EntityPayload::single(record))
    })
    .await
    .unwrap();

    assert_eq!(response.mutations().unwrap().updated().len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport failures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_503_is_unreachable_and_client_does_not_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/atlas/v2/entity/bulk"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/atlas/v2/entity/bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"mutatedEntities": {}})))
        .with_priority(2)
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let (failures, result) = blocking(move || {
        let client = client_for(&uri);
        let payload = EntityPayload::single(placements_record());

        // Caller-side retry; the client itself makes one request per call.
        let mut failures = Vec::new();
        let result = loop {
            match client.entities().create_bulk(&payload) {
                Err(e) if e.is_retryable() && failures.len() < 3 => failures.push(e),
                other => break other,
            }
        };
        (failures, result)
    })
    .await;

    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0],
        Error::Unreachable {
            status: Some(503),
            ..
        }
    ));
    assert_eq!(result.unwrap().status, 200);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeout_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/search/dsl"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"queryType": "DSL", "entities": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || {
        CatalogClient::builder()
            .base_url(uri)
            .credentials("admin", "admin")
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap()
            .search()
            .by_dsl("hdfs_path")
    })
    .await
    .unwrap_err();

    assert!(err.is_retryable());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refused_connection_is_unreachable() {
    let err = blocking(|| {
        client_for("http://127.0.0.1:1")
            .typedefs()
            .create(&TypeDefPayload::default())
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Unreachable { status: None, .. }));
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection resolution
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_through_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/atlas/v2/types/typedef/name/hdfs_path"))
        .and(header("authorization", BASIC_ADMIN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "hdfs_path"})))
        .expect(1)
        .mount(&server)
        .await;

    let address = *server.address();
    let mut registry = ConnectionsConfig::new();
    registry.set_connection(
        ConnectionEntry::new("atlas_default", address.ip().to_string())
            .with_port(address.port())
            .with_login("admin")
            .with_password(SecretRef::value("admin")),
    );

    let response = blocking(move || {
        let client = CatalogClient::connect(&registry, "atlas_default")?;
        client.typedefs().get_by_name("hdfs_path")
    })
    .await
    .unwrap();

    assert_eq!(response.body["name"], "hdfs_path");
}
