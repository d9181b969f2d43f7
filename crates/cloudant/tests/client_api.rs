use cloudant::{CloudantClient, Document, DocumentStore, StoreError};
use mockito::Server;
use serde_json::{json, Map};

fn doc(id: &str, msg: &str) -> Document {
    let mut fields = Map::new();
    fields.insert("msg".to_string(), json!(msg));
    Document::new(id.to_string(), fields)
}

#[tokio::test]
async fn create_document_posts_id_and_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/logs")
        .match_header("Content-Type", "application/json")
        .match_header("Authorization", "Bearer test-key")
        .match_body(mockito::Matcher::Json(json!({"_id": "doc-1", "msg": "a"})))
        .with_status(201)
        .with_body(r#"{"ok":true,"id":"doc-1","rev":"1-abc"}"#)
        .create_async()
        .await;

    let client = CloudantClient::new(&server.url(), Some("test-key".to_string()))
        .expect("failed to build client");
    let id = client
        .create_document("logs", &doc("doc-1", "a"))
        .await
        .expect("create should succeed");

    assert_eq!(id, "doc-1");
    mock.assert_async().await;
}

#[tokio::test]
async fn create_document_without_credential_omits_auth_header() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/logs")
        .match_header("Authorization", mockito::Matcher::Missing)
        .with_status(201)
        .with_body(r#"{"ok":true,"id":"doc-2","rev":"1-abc"}"#)
        .create_async()
        .await;

    let client = CloudantClient::new(&server.url(), None).expect("failed to build client");
    let id = client
        .create_document("logs", &doc("doc-2", "b"))
        .await
        .expect("create should succeed");

    assert_eq!(id, "doc-2");
    mock.assert_async().await;
}

#[tokio::test]
async fn store_rejection_carries_status_and_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/logs")
        .with_status(403)
        .with_body(r#"{"error":"forbidden"}"#)
        .create_async()
        .await;

    let client = CloudantClient::new(&server.url(), Some("bad-key".to_string()))
        .expect("failed to build client");
    let err = client
        .create_document("logs", &doc("doc-3", "c"))
        .await
        .expect_err("create should fail");

    match err {
        StoreError::Destination { status, message } => {
            assert_eq!(status.map(|s| s.as_u16()), Some(403));
            assert!(message.contains("forbidden"));
        }
        other => panic!("expected Destination error, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_has_no_status() {
    // Nothing listens on this port.
    let client = CloudantClient::new("http://127.0.0.1:1", None).expect("failed to build client");
    let err = client
        .create_document("logs", &doc("doc-4", "d"))
        .await
        .expect_err("create should fail");

    assert!(matches!(
        err,
        StoreError::Destination { status: None, .. }
    ));
}

#[tokio::test]
async fn get_document_reads_back_what_was_written() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/logs/doc-5")
        .with_status(200)
        .with_body(r#"{"_id":"doc-5","_rev":"1-abc","msg":"e"}"#)
        .create_async()
        .await;

    let client = CloudantClient::new(&server.url(), None).expect("failed to build client");
    let body = client
        .get_document("logs", "doc-5")
        .await
        .expect("get should succeed");

    assert_eq!(body["_id"], json!("doc-5"));
    assert_eq!(body["msg"], json!("e"));
}
