//! Tool dispatch tests
//!
//! Argument validation, sanitization and error payloads for tool calls
//! routed through the dispatcher to a mock memory service.

use memory_bridge::client::RetryPolicy;
use memory_bridge::tools::{ToolDispatcher, ToolOutcome};
use memory_bridge::{ClientConfig, MemoryClient};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "mem_test_0123456789abcdefghijklmnopqrstu";
const MEMORY_ID: &str = "3f2504e0-4f89-41d3-9a0c-0305e82c3301";
const ENTITY_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

fn dispatcher_for(server: &MockServer) -> ToolDispatcher {
    let config = ClientConfig::new(KEY, server.uri(), "dispatch-agent", Duration::from_secs(5));
    let client = MemoryClient::new(config)
        .unwrap()
        .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(10)).with_jitter_ratio(0.0));
    ToolDispatcher::new(client)
}

fn memory_json(content: &str) -> Value {
    json!({
        "id": MEMORY_ID,
        "content": content,
        "created_at": "2026-01-01T12:00:00Z"
    })
}

fn success(outcome: ToolOutcome) -> Value {
    match outcome {
        ToolOutcome::Success(value) => value,
        ToolOutcome::Failure(payload) => panic!("Expected success, got {:?}", payload),
    }
}

fn failure_kind(outcome: &ToolOutcome) -> String {
    match outcome {
        ToolOutcome::Failure(payload) => payload.error.clone(),
        ToolOutcome::Success(value) => panic!("Expected failure, got {}", value),
    }
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

#[tokio::test]
async fn test_unknown_tool_is_error_payload() {
    let server = MockServer::start().await;
    let outcome = dispatcher_for(&server)
        .dispatch("memory_explode", json!({}))
        .await;

    assert!(outcome.is_error());
    assert_eq!(failure_kind(&outcome), "unknown_tool");
    assert!(outcome.to_text().contains("memory_explode"));
}

#[tokio::test]
async fn test_missing_required_argument() {
    let server = MockServer::start().await;
    let outcome = dispatcher_for(&server)
        .dispatch("memory_store", json!({"metadata": {"a": "b"}}))
        .await;

    assert_eq!(failure_kind(&outcome), "validation_error");
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_out_of_range_arguments_make_no_request() {
    let server = MockServer::start().await;
    let dispatcher = dispatcher_for(&server);

    let cases = [
        ("memory_search", json!({"query": "x", "limit": 0})),
        ("memory_search", json!({"query": "x", "limit": 101})),
        ("memory_search", json!({"query": "x", "threshold": 1.5})),
        ("memory_search", json!({"query": "   "})),
        ("memory_list", json!({"limit": 500})),
        ("memory_list", json!({"offset": -1})),
        ("memory_update", json!({"id": MEMORY_ID})),
        ("entity_create", json!({"name": "", "type": "person"})),
        ("entity_create", json!({"name": "x".repeat(201), "type": "person"})),
        ("entity_create", json!({"name": "Ada", "type": "robot"})),
        ("memory_get", json!({"id": "42"})),
    ];

    for (tool, args) in cases {
        let outcome = dispatcher.dispatch(tool, args.clone()).await;
        assert_eq!(failure_kind(&outcome), "validation_error", "{} {}", tool, args);
    }
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_control_character_only_text_is_rejected() {
    let server = MockServer::start().await;
    let dispatcher = dispatcher_for(&server);

    let cases = [
        ("memory_store", json!({"content": "\u{0000}\u{0007}"})),
        ("memory_search", json!({"query": "\u{001b}\u{0001}"})),
        ("memory_update", json!({"id": MEMORY_ID, "content": "\u{0008}"})),
        ("entity_create", json!({"name": "\u{0001}", "type": "person"})),
        ("entity_create", json!({"name": " \u{0002} ", "type": "place"})),
    ];

    for (tool, args) in cases {
        let outcome = dispatcher.dispatch(tool, args.clone()).await;
        assert_eq!(failure_kind(&outcome), "validation_error", "{} {}", tool, args);
    }
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_entity_name_limit_applies_after_escaping() {
    let server = MockServer::start().await;
    let outcome = dispatcher_for(&server)
        .dispatch("entity_create", json!({"name": "&".repeat(200), "type": "concept"}))
        .await;

    assert_eq!(failure_kind(&outcome), "validation_error");
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_blank_relationship_falls_back_to_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/entities/links"))
        .and(body_partial_json(json!({"relationship": "mentioned_in"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let value = success(
        dispatcher_for(&server)
            .dispatch(
                "entity_link",
                json!({"entity_id": ENTITY_ID, "memory_id": MEMORY_ID, "relationship": "\u{0000} "}),
            )
            .await,
    );
    assert_eq!(value["relationship"], "mentioned_in");
}

#[tokio::test]
async fn test_store_strips_control_characters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/memories"))
        .and(body_partial_json(json!({
            "content": "line one\nline two",
            "metadata": {"tag": "work"},
            "agent_id": "dispatch-agent"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(memory_json("line one\nline two")))
        .expect(1)
        .mount(&server)
        .await;

    let value = success(
        dispatcher_for(&server)
            .dispatch(
                "memory_store",
                json!({"content": "line one\u{0000}\nline two\u{0007}", "metadata": {"tag": "wo\u{001b}rk"}}),
            )
            .await,
    );
    assert_eq!(value["id"], MEMORY_ID);
}

#[tokio::test]
async fn test_search_uses_defaults_and_counts_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/memories/search"))
        .and(body_partial_json(json!({"query": "coffee", "limit": 10, "threshold": 0.7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"memory": memory_json("espresso"), "score": 0.91},
                {"memory": memory_json("latte"), "score": 0.80}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let value = success(
        dispatcher_for(&server)
            .dispatch("memory_search", json!({"query": "coffee"}))
            .await,
    );
    assert_eq!(value["count"], 2);
    assert_eq!(value["results"][1]["memory"]["content"], "latte");
}

#[tokio::test]
async fn test_list_defaults() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/memories"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let value = success(dispatcher_for(&server).dispatch("memory_list", Value::Null).await);
    assert_eq!(value["data"], json!([]));
}

#[tokio::test]
async fn test_delete_reports_id() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v1/memories/{}", MEMORY_ID)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let value = success(
        dispatcher_for(&server)
            .dispatch("memory_delete", json!({"id": MEMORY_ID}))
            .await,
    );
    assert_eq!(value, json!({"deleted": true, "id": MEMORY_ID}));
}

#[tokio::test]
async fn test_entity_name_is_escaped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/entities"))
        .and(body_partial_json(json!({
            "name": "&lt;b&gt;Ada &amp; Co&lt;/b&gt;",
            "type": "organization"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": ENTITY_ID,
            "name": "&lt;b&gt;Ada &amp; Co&lt;/b&gt;",
            "type": "organization",
            "created_at": "2026-01-01T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let value = success(
        dispatcher_for(&server)
            .dispatch(
                "entity_create",
                json!({"name": "  <b>Ada & Co</b> ", "type": "organization"}),
            )
            .await,
    );
    assert_eq!(value["type"], "organization");
}

#[tokio::test]
async fn test_entity_link_reports_relationship() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/entities/links"))
        .and(body_partial_json(json!({"relationship": "authored"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let value = success(
        dispatcher_for(&server)
            .dispatch(
                "entity_link",
                json!({"entity_id": ENTITY_ID, "memory_id": MEMORY_ID, "relationship": "authored"}),
            )
            .await,
    );
    assert_eq!(value["linked"], true);
    assert_eq!(value["relationship"], "authored");
}

#[tokio::test]
async fn test_api_error_becomes_payload_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/memories/{}", MEMORY_ID)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Memory not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = dispatcher_for(&server)
        .dispatch("memory_get", json!({"id": MEMORY_ID}))
        .await;
    let text = outcome.to_text();
    let payload: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(payload["error"], "not_found");
    assert_eq!(payload["details"]["status"], 404);
    assert_eq!(
        payload["message"],
        "API request failed: 404 Not Found - Memory not found"
    );
}

#[tokio::test]
async fn test_error_payload_never_contains_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/memories"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"error": format!("key {} is revoked", KEY)})),
        )
        .mount(&server)
        .await;

    let outcome = dispatcher_for(&server)
        .dispatch("memory_store", json!({"content": "secret plans"}))
        .await;
    assert_eq!(failure_kind(&outcome), "authentication_error");
    assert!(!outcome.to_text().contains(KEY));
}

#[tokio::test]
async fn test_health_tool_never_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let value = success(dispatcher_for(&server).dispatch("memory_health", json!({})).await);
    assert_eq!(value["status"], "unhealthy");
}
