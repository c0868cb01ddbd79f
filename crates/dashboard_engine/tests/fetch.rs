use dashboard_core::{ConversationStatus, Role};
use dashboard_engine::{DataFetcher, FailureKind, FetchSettings, ReqwestDataFetcher};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer) -> ReqwestDataFetcher {
    ReqwestDataFetcher::new(FetchSettings {
        base_url: server.uri(),
        ..FetchSettings::default()
    })
    .expect("valid base url")
}

#[tokio::test]
async fn fetches_conversations_from_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "projectName": "alpha", "lastMessage": "hi", "messageCount": 2,
              "toolCallCount": 1, "lastActivity": "2026-03-14T12:00:00Z" },
            { "id": "b", "projectName": "beta" }
        ])))
        .mount(&server)
        .await;

    let conversations = fetcher_for(&server).get_conversations().await.unwrap();
    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0].id, "1");
    assert_eq!(conversations[1].project_name, "beta");
}

#[tokio::test]
async fn fetches_states_from_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "states": { "1": "active", "2": { "status": "inactive" } }
        })))
        .mount(&server)
        .await;

    let states = fetcher_for(&server)
        .get_conversation_states()
        .await
        .unwrap();
    assert_eq!(states.get("1"), Some(ConversationStatus::Active));
    assert_eq!(states.get("2"), Some(ConversationStatus::Inactive));
}

#[tokio::test]
async fn fetches_messages_for_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/42/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                { "role": "user", "content": "hello" },
                { "role": "assistant", "content": "hi there", "timestamp": "2026-03-14T12:00:05Z" }
            ]
        })))
        .mount(&server)
        .await;

    let messages = fetcher_for(&server)
        .get_conversation_messages("42")
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
}

#[tokio::test]
async fn fetches_plugin_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/plugins"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plugins": [
                { "id": "gh", "name": "GitHub Integration", "status": "enabled",
                  "marketplaceName": "official", "permissions": ["repo"] }
            ],
            "marketplaces": [ { "name": "official", "status": "online", "pluginCount": 1 } ],
            "summary": { "totalPlugins": 1, "enabledPlugins": 1, "totalMarketplaces": 1 }
        })))
        .mount(&server)
        .await;

    let catalog = fetcher_for(&server).get_plugin_data().await.unwrap();
    assert_eq!(catalog.plugins[0].name, "GitHub Integration");
    assert_eq!(catalog.marketplaces[0].plugin_count, 1);
    assert_eq!(catalog.summary.map(|s| s.enabled_plugins), Some(1));
}

#[tokio::test]
async fn http_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/plugins"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).get_plugin_data().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).get_conversations().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("[{}]", "1,".repeat(64) + "1")))
        .mount(&server)
        .await;

    let fetcher = ReqwestDataFetcher::new(FetchSettings {
        base_url: server.uri(),
        max_bytes: 16,
        ..FetchSettings::default()
    })
    .unwrap();
    let err = fetcher.get_conversations().await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. }));
}

#[tokio::test]
async fn unreachable_service_is_network_error() {
    // Nothing listens on the discard port.
    let fetcher = ReqwestDataFetcher::new(FetchSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        ..FetchSettings::default()
    })
    .unwrap();
    let err = fetcher.get_plugin_data().await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}
