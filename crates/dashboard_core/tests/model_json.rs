use dashboard_core::{
    Conversation, ConversationStates, ConversationStatus, Message, PluginCatalog, Role,
};
use serde_json::json;

#[test]
fn conversation_accepts_numeric_id_and_camel_case_fields() {
    let conversation: Conversation = serde_json::from_value(json!({
        "id": 1,
        "projectName": "crate",
        "lastMessage": "done",
        "messageCount": 12,
        "toolCallCount": 4,
        "lastActivity": "2026-03-14T12:00:00Z",
        "status": "active"
    }))
    .unwrap();

    assert_eq!(conversation.id, "1");
    assert_eq!(conversation.project_name, "crate");
    assert_eq!(conversation.tool_call_count, 4);
    assert_eq!(conversation.status, Some(ConversationStatus::Active));
    assert!(conversation.last_activity.is_some());
}

#[test]
fn missing_optional_fields_default() {
    let conversation: Conversation = serde_json::from_value(json!({ "id": "abc" })).unwrap();
    assert_eq!(conversation.message_count, 0);
    assert!(conversation.last_activity.is_none());
    assert!(conversation.status.is_none());
}

#[test]
fn state_map_accepts_tags_and_records() {
    let states: ConversationStates = serde_json::from_value(json!({
        "a": "active",
        "b": { "status": "ACTIVE" },
        "c": "idle"
    }))
    .unwrap();

    assert_eq!(states.len(), 3);
    assert_eq!(states.get("a"), Some(ConversationStatus::Active));
    assert_eq!(states.get("b"), Some(ConversationStatus::Active));
    assert_eq!(states.get("c"), Some(ConversationStatus::Inactive));
    assert_eq!(states.get("zzz"), None);
}

#[test]
fn plugin_catalog_summary_is_reported_or_derived() {
    let catalog: PluginCatalog = serde_json::from_value(json!({
        "plugins": [
            { "id": "gh", "name": "GitHub Integration", "status": "enabled",
              "marketplace": "official", "permissions": ["repo", "net"] },
            { "id": "pg", "name": "PostgreSQL", "status": "disabled" }
        ],
        "marketplaces": [ { "name": "official", "status": "online", "pluginCount": 2 } ]
    }))
    .unwrap();

    assert_eq!(catalog.plugins[0].marketplace_name, "official");
    let summary = catalog.effective_summary();
    assert_eq!(summary.total_plugins, 2);
    assert_eq!(summary.enabled_plugins, 1);
    assert_eq!(summary.total_marketplaces, 1);

    let reported: PluginCatalog = serde_json::from_value(json!({
        "plugins": [],
        "marketplaces": [],
        "summary": { "totalPlugins": 9, "enabledPlugins": 4, "totalMarketplaces": 2 }
    }))
    .unwrap();
    assert_eq!(reported.effective_summary().total_plugins, 9);
}

#[test]
fn message_roles_are_lowercase() {
    let message: Message = serde_json::from_value(json!({
        "role": "assistant",
        "content": "Sure.",
        "timestamp": "2026-03-14T12:00:00Z"
    }))
    .unwrap();
    assert_eq!(message.role, Role::Assistant);
    assert_eq!(message.role.to_string(), "assistant");
}
