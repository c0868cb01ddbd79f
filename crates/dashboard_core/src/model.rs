use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot of one conversation as returned by the data service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub tool_call_count: u32,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    /// Inline status tag; the state map takes precedence when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversationStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConversationStatus {
    Active,
    #[default]
    Inactive,
}

impl From<String> for ConversationStatus {
    fn from(tag: String) -> Self {
        if tag.trim().eq_ignore_ascii_case("active") {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

impl From<ConversationStatus> for String {
    fn from(status: ConversationStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::Active => write!(f, "active"),
            ConversationStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Conversation id → status tag. Keyed lookup only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationStates(HashMap<String, StateEntry>);

/// A state map value is either a bare tag or an object carrying `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum StateEntry {
    Tag(ConversationStatus),
    Record { status: ConversationStatus },
}

impl StateEntry {
    fn status(&self) -> ConversationStatus {
        match self {
            StateEntry::Tag(status) | StateEntry::Record { status } => *status,
        }
    }
}

impl ConversationStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, status: ConversationStatus) {
        self.0.insert(id.into(), StateEntry::Tag(status));
    }

    pub fn get(&self, id: &str) -> Option<ConversationStatus> {
        self.0.get(id).map(StateEntry::status)
    }

    /// Resolves the effective status: state map, then inline tag, then inactive.
    pub fn status_of(&self, conversation: &Conversation) -> ConversationStatus {
        self.get(&conversation.id)
            .or(conversation.status)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ConversationStatus)> for ConversationStates {
    fn from_iter<I: IntoIterator<Item = (String, ConversationStatus)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(id, status)| (id, StateEntry::Tag(status)))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "marketplace")]
    pub marketplace_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Plugin {
    /// `enabled` and `active` count as active; every other status does not.
    pub fn is_enabled(&self) -> bool {
        let status = self.status.trim();
        status.eq_ignore_ascii_case("enabled") || status.eq_ignore_ascii_case("active")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marketplace {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub plugin_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSummary {
    pub total_plugins: u32,
    pub enabled_plugins: u32,
    pub total_marketplaces: u32,
}

/// Payload of the plugin-data endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PluginCatalog {
    #[serde(default)]
    pub plugins: Vec<Plugin>,
    #[serde(default)]
    pub marketplaces: Vec<Marketplace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<CatalogSummary>,
}

impl PluginCatalog {
    /// Reported summary, or one derived from the lists when the service omits it.
    pub fn effective_summary(&self) -> CatalogSummary {
        self.summary.unwrap_or_else(|| CatalogSummary {
            total_plugins: saturating_u32(self.plugins.len()),
            enabled_plugins: saturating_u32(self.plugins.iter().filter(|p| p.is_enabled()).count()),
            total_marketplaces: saturating_u32(self.marketplaces.len()),
        })
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    })
}
