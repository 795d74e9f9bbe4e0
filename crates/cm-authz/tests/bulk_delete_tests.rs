//! Bulk Module Delete Tests
//!
//! Tests for:
//! - Single bulk request on current backends
//! - Per-module fallback when the bulk endpoint is rejected
//! - No fallback on session expiry or an empty selection

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cm_authz::{delete_modules, BulkSelection, DeleteStrategy, Outcome};
use cm_client::{Actor, Client, Config, Error, MemorySessionStore, SessionStore};

fn client_for(server: &MockServer) -> (Client, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::with_token("tok"));
    let client = Client::new(Config::new(server.uri()), store.clone()).unwrap();
    (client, store)
}

#[tokio::test]
async fn test_bulk_request_when_supported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Module/DeleteModules"))
        .and(body_json(json!({"moduleIds": [2, 5], "practiceId": 2, "deletedBy": "admin"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let selection = BulkSelection::from_ids([2, 5]);

    let report = delete_modules(&client, &selection, &Actor::default()).await.unwrap();

    assert_eq!(report.strategy, DeleteStrategy::Bulk);
    assert_eq!(report.batch.len(), 2);
    assert!(report.batch.all_succeeded());
}

#[tokio::test]
async fn test_rejected_bulk_falls_back_per_module() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Module/DeleteModules"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/Module/DeleteModule"))
        .and(query_param("id", "3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/Module/DeleteModule"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let selection = BulkSelection::from_ids([4, 1, 3]);

    let report = delete_modules(&client, &selection, &Actor::default()).await.unwrap();

    assert_eq!(report.strategy, DeleteStrategy::PerModule);
    let items: Vec<_> = report.batch.outcomes().iter().map(|o| o.item).collect();
    assert_eq!(items, vec![4, 1, 3]);
    assert_eq!(report.batch.success_count(), 2);
    assert!(matches!(report.batch.outcomes()[2].outcome, Outcome::Failed(_)));
}

#[tokio::test]
async fn test_session_expiry_does_not_fall_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Module/DeleteModules"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, store) = client_for(&server);
    let err = delete_modules(&client, &BulkSelection::from_ids([1]), &Actor::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SessionExpired));
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_empty_selection_rejected_locally() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let err = delete_modules(&client, &BulkSelection::new(), &Actor::default())
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::InvalidInput(msg) if msg == "Please select at least one module to delete"));
}
