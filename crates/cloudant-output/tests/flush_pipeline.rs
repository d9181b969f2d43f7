//! End-to-end flush tests: MessagePack batch in, HTTP documents out.

use std::collections::HashMap;
use std::io::Write;

use cloudant_output::{CloudantOutput, Status};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

/// Encodes one `[timestamp, record]` batch entry the way the host frames it.
fn entry(record: &serde_json::Value) -> Vec<u8> {
    rmp_serde::to_vec(&(1_700_000_000_u64, record)).expect("failed to encode entry")
}

fn batch(records: &[serde_json::Value]) -> Vec<u8> {
    records.iter().flat_map(|r| entry(r)).collect()
}

async fn plugin_for(server: &ServerGuard) -> CloudantOutput {
    let options: HashMap<String, String> = [
        ("Endpoint".to_string(), server.url()),
        ("Database".to_string(), "logs".to_string()),
    ]
    .into_iter()
    .collect();
    CloudantOutput::init(&options).expect("init should succeed")
}

#[tokio::test]
async fn accepted_batch_creates_one_document_per_record() {
    let mut server = Server::new_async().await;
    let mock_a = server
        .mock("POST", "/logs")
        .match_body(Matcher::PartialJson(json!({"msg": "a"})))
        .with_status(201)
        .with_body(r#"{"ok":true,"id":"id-a","rev":"1-a"}"#)
        .create_async()
        .await;
    let mock_b = server
        .mock("POST", "/logs")
        .match_body(Matcher::PartialJson(json!({"msg": "b"})))
        .with_status(201)
        .with_body(r#"{"ok":true,"id":"id-b","rev":"1-b"}"#)
        .create_async()
        .await;

    let plugin = plugin_for(&server).await;
    let status = plugin
        .flush(&batch(&[json!({"msg": "a"}), json!({"msg": "b"})]))
        .await;

    assert_eq!(status, Status::Ok);
    mock_a.assert_async().await;
    mock_b.assert_async().await;
}

#[tokio::test]
async fn rejected_batch_stops_at_the_failing_record() {
    let mut server = Server::new_async().await;
    let mock_a = server
        .mock("POST", "/logs")
        .match_body(Matcher::PartialJson(json!({"msg": "a"})))
        .with_status(201)
        .with_body(r#"{"ok":true,"id":"id-a","rev":"1-a"}"#)
        .create_async()
        .await;
    let mock_b = server
        .mock("POST", "/logs")
        .match_body(Matcher::PartialJson(json!({"msg": "b"})))
        .with_status(500)
        .with_body(r#"{"error":"internal_server_error"}"#)
        .create_async()
        .await;
    let mock_c = server
        .mock("POST", "/logs")
        .match_body(Matcher::PartialJson(json!({"msg": "c"})))
        .expect(0)
        .create_async()
        .await;

    let plugin = plugin_for(&server).await;
    let status = plugin
        .flush(&batch(&[
            json!({"msg": "a"}),
            json!({"msg": "b"}),
            json!({"msg": "c"}),
        ]))
        .await;

    assert_eq!(status, Status::Error);
    mock_a.assert_async().await;
    mock_b.assert_async().await;
    mock_c.assert_async().await;
}

#[tokio::test]
async fn non_mapping_entries_are_skipped_without_failing_the_batch() {
    let mut server = Server::new_async().await;
    let mock_a = server
        .mock("POST", "/logs")
        .match_body(Matcher::PartialJson(json!({"msg": "a"})))
        .with_status(201)
        .with_body(r#"{"ok":true,"id":"id-a","rev":"1-a"}"#)
        .create_async()
        .await;
    let mock_b = server
        .mock("POST", "/logs")
        .match_body(Matcher::PartialJson(json!({"msg": "b"})))
        .with_status(201)
        .with_body(r#"{"ok":true,"id":"id-b","rev":"1-b"}"#)
        .create_async()
        .await;

    let plugin = plugin_for(&server).await;
    let status = plugin
        .flush(&batch(&[json!({"msg": "a"}), json!(42), json!({"msg": "b"})]))
        .await;

    assert_eq!(status, Status::Ok);
    mock_a.assert_async().await;
    mock_b.assert_async().await;
}

#[tokio::test]
async fn record_with_non_string_key_is_dropped_before_delivery() {
    let mut server = Server::new_async().await;
    let mock_a = server
        .mock("POST", "/logs")
        .match_body(Matcher::PartialJson(json!({"msg": "a"})))
        .with_status(201)
        .with_body(r#"{"ok":true,"id":"id-a","rev":"1-a"}"#)
        .create_async()
        .await;

    // One record keyed by an integer, framed like any other entry.
    let mut bad_record = std::collections::BTreeMap::new();
    bad_record.insert(7_u32, "x");
    let mut data = rmp_serde::to_vec(&(1_700_000_000_u64, bad_record))
        .expect("failed to encode entry");
    data.extend(entry(&json!({"msg": "a"})));

    let plugin = plugin_for(&server).await;
    let status = plugin.flush(&data).await;

    assert_eq!(status, Status::Ok);
    mock_a.assert_async().await;
}

#[tokio::test]
async fn empty_batch_is_accepted_without_requests() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/logs").expect(0).create_async().await;

    let plugin = plugin_for(&server).await;
    assert_eq!(plugin.flush(&[]).await, Status::Ok);
    mock.assert_async().await;
}

#[tokio::test]
async fn iam_token_from_mounted_file_authenticates_requests() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/logs")
        .match_header("Authorization", "Bearer mounted-secret")
        .with_status(201)
        .with_body(r#"{"ok":true,"id":"id-a","rev":"1-a"}"#)
        .create_async()
        .await;

    let mut token_file = tempfile::NamedTempFile::new().expect("failed to create token file");
    writeln!(token_file, "mounted-secret").expect("failed to write token");

    let options: HashMap<String, String> = [
        ("Endpoint".to_string(), server.url()),
        ("Authentication_Mode".to_string(), "IAMAPIKEY".to_string()),
        (
            "CR_Token_Mount_Path".to_string(),
            token_file.path().display().to_string(),
        ),
        ("Database".to_string(), "logs".to_string()),
    ]
    .into_iter()
    .collect();

    let plugin = CloudantOutput::init(&options).expect("init should succeed");
    let status = plugin.flush(&batch(&[json!({"msg": "a"})])).await;

    assert_eq!(status, Status::Ok);
    mock.assert_async().await;
}
