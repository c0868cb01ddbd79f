use chrono::{DateTime, Utc};

use crate::model::{CatalogSummary, ConversationStatus, Marketplace, Message, Plugin};
use crate::{Lifecycle, StatusFilter};

/// Status bar content shared by both pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeaderView {
    pub lifecycle: Lifecycle,
    pub loading: bool,
    pub error: Option<String>,
    pub filter: StatusFilter,
    pub search: String,
    /// Size of the unfiltered list.
    pub total: usize,
    pub last_refreshed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPageView {
    pub header: PageHeaderView,
    pub cards: Vec<ConversationCard>,
    pub detail: ConversationDetailView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationCard {
    pub id: String,
    pub project_name: String,
    pub last_message: String,
    pub message_count: u32,
    pub tool_call_count: u32,
    pub last_activity: Option<DateTime<Utc>>,
    pub status: ConversationStatus,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationDetailView {
    Closed,
    Loading {
        conversation_id: String,
    },
    Messages {
        conversation_id: String,
        project_name: Option<String>,
        messages: Vec<Message>,
    },
    /// Rendered as the fixed failure text.
    Failed {
        conversation_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginPageView {
    pub header: PageHeaderView,
    pub summary: CatalogSummary,
    pub marketplaces: Vec<Marketplace>,
    pub cards: Vec<PluginCard>,
    pub detail: Option<Plugin>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCard {
    pub id: String,
    pub name: String,
    pub marketplace_name: String,
    pub status: String,
    pub enabled: bool,
    pub description: String,
    pub permission_count: usize,
    pub is_selected: bool,
}
