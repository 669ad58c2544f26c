//! 列表/详情视图集成测试（wiremock 模拟后端）

use std::sync::Arc;

use chrono::NaiveDate;
use chat_logs_viewer::chat_logs::{
    ChatLogBackend, ChatLogsClient, DeleteOutcome, DetailOutcome, DetailView,
    FilterField, ListView, LoadState, Role, Route, Session,
};
use chat_logs_viewer::notification::{NotificationLevel, Notifications};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> Arc<dyn ChatLogBackend> {
    Arc::new(ChatLogsClient::new(reqwest::Client::new(), server.uri()))
}

fn admin() -> Session {
    Session::new("tok", Role::Admin)
}

fn rows(n: usize) -> Vec<serde_json::Value> {
    (0..n)
        .map(|i| {
            json!({
                "conversation_id": format!("c-{}", i),
                "user_name": "alice",
                "model": "llama3",
                "messages": [{"role": "user", "content": format!("q{}", i)}],
                "created_at": 1700000000 + i as i64
            })
        })
        .collect()
}

#[tokio::test]
async fn test_list_view_pages_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-logs/admin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": rows(50), "count": 120})),
        )
        .mount(&server)
        .await;

    let mut view = ListView::new(backend(&server), admin(), Notifications::new());
    view.mount().await;
    assert_eq!(view.state(), LoadState::Loaded);
    assert_eq!(view.results().unwrap().len(), 50);
    assert!(view.show_pagination());

    view.load_page(3).await;
    assert_eq!(view.skip(), 100);

    view.set_filter(FilterField::UserId, "u-1").await;
    assert_eq!(view.page(), 1);

    let requests = server.received_requests().await.unwrap();
    let skips: Vec<String> = requests
        .iter()
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "skip")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default()
        })
        .collect();
    assert_eq!(skips, vec!["0", "100", "0"]);
    assert!(
        requests[2]
            .url
            .query_pairs()
            .any(|(k, v)| k == "user_id" && v == "u-1")
    );
}

#[tokio::test]
async fn test_list_view_error_becomes_notification() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-logs/admin"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Forbidden"})))
        .mount(&server)
        .await;

    let notifications = Notifications::new();
    let mut view = ListView::new(backend(&server), admin(), notifications.clone());
    view.mount().await;

    assert_eq!(view.state(), LoadState::Errored);
    assert!(!view.is_loading());
    assert!(view.results().is_none());

    let toasts = notifications.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, NotificationLevel::Error);
    assert!(toasts[0].message.contains("Forbidden"));
}

#[tokio::test]
async fn test_delete_all_then_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/chat-logs/admin"))
        .and(query_param("model", "llama3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/chat-logs/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "count": 0})))
        .mount(&server)
        .await;

    let notifications = Notifications::new();
    let mut view = ListView::new(backend(&server), admin(), notifications.clone());
    view.set_filter(FilterField::Model, "llama3").await;

    assert_eq!(view.delete_all(true).await, DeleteOutcome::Deleted);
    assert_eq!(view.page(), 1);
    assert_eq!(view.total(), Some(0));

    let toasts = notifications.drain();
    assert!(toasts.iter().any(|t| t.level == NotificationLevel::Success));
}

#[tokio::test]
async fn test_export_matches_loaded_page() {
    let mut served = rows(3);
    served[0] = json!({
        "conversation_id": "c-0",
        "title": null,
        "user_name": "alice",
        "model": "llama3",
        "messages": [{"role": "user", "content": "hi", "id": "msg-1", "timestamp": 5}],
        "created_at": 1700000000,
        "tags": ["a"]
    });

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-logs/admin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": served.clone(), "count": 300})),
        )
        .mount(&server)
        .await;

    let mut view = ListView::new(backend(&server), admin(), Notifications::new());
    view.mount().await;

    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let path = view.export_on(dir.path(), date).unwrap();
    assert!(path.ends_with("chat-logs-2024-12-31.json"));

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    // 只包含当前页的 3 条，且与后端返回的原始 JSON 完全一致
    assert_eq!(exported, serde_json::Value::Array(served));
}

#[tokio::test]
async fn test_detail_view_renders_single_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-logs/admin"))
        .and(query_param("conversation_id", "c-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "conversation_id": "c-42",
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "rules"},
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"},
                    {"role": "user", "content": {"image": "cat.png"}}
                ],
                "response": "a cat",
                "created_at": 1700000000
            }],
            "count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = DetailView::new(backend(&server), admin(), Notifications::new(), "c-42");
    assert_eq!(view.activate().await, DetailOutcome::Loaded);

    let messages = view.messages();
    let numbers: Vec<usize> = messages.iter().map(|m| m.number).collect();
    let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);
    assert_eq!(messages[2].body, "{\n  \"image\": \"cat.png\"\n}");
    assert_eq!(messages[3].body, "a cat");
}

#[tokio::test]
async fn test_detail_view_not_found_returns_to_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat-logs/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "count": 0})))
        .mount(&server)
        .await;

    let notifications = Notifications::new();
    let mut view = DetailView::new(backend(&server), admin(), notifications.clone(), "gone");

    assert_eq!(view.activate().await, DetailOutcome::NotFound(Route::List));
    assert!(view.log().is_none());

    let toasts = notifications.drain();
    assert_eq!(toasts.len(), 1);
    assert!(toasts[0].message.contains("gone"));
}

#[tokio::test]
async fn test_detail_view_non_admin_never_fetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "count": 0})))
        .expect(0)
        .mount(&server)
        .await;

    let mut view = DetailView::new(
        backend(&server),
        Session::new("tok", Role::User),
        Notifications::new(),
        "c-1",
    );

    assert_eq!(view.activate().await, DetailOutcome::Redirect(Route::Home));
    assert!(server.received_requests().await.unwrap().is_empty());
}
