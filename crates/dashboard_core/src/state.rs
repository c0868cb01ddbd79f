use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::filter::{ConversationRow, StatusFilter};
use crate::model::{CatalogSummary, Marketplace, Message, Plugin};
use crate::page::{DirtyRegions, Lifecycle, PageKind, PageState, Region, RequestSeq};
use crate::view_model::{
    ConversationCard, ConversationDetailView, ConversationPageView, PageHeaderView, PluginCard,
    PluginPageView,
};

/// Detail panel of the conversation page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationDetail {
    #[default]
    Closed,
    Loading {
        conversation_id: String,
    },
    Loaded {
        conversation_id: String,
        messages: Vec<Message>,
    },
    Failed {
        conversation_id: String,
    },
}

impl ConversationDetail {
    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            ConversationDetail::Closed => None,
            ConversationDetail::Loading { conversation_id }
            | ConversationDetail::Loaded {
                conversation_id, ..
            }
            | ConversationDetail::Failed { conversation_id } => Some(conversation_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPage {
    pub(crate) page: PageState<ConversationRow>,
    pub(crate) detail: ConversationDetail,
}

impl ConversationPage {
    fn new(poll_interval: Duration) -> Self {
        Self {
            page: PageState::new(poll_interval),
            detail: ConversationDetail::Closed,
        }
    }

    pub fn page(&self) -> &PageState<ConversationRow> {
        &self.page
    }

    pub fn detail(&self) -> &ConversationDetail {
        &self.detail
    }

    pub(crate) fn set_detail(&mut self, detail: ConversationDetail) {
        self.detail = detail;
        self.page.mark_dirty(Region::Detail);
        self.page.mark_dirty(Region::List);
    }

    pub fn view(&self, now: DateTime<Utc>) -> ConversationPageView {
        let selected = self.detail.conversation_id();
        let cards = self
            .page
            .visible(now)
            .into_iter()
            .map(|row| ConversationCard {
                id: row.conversation.id.clone(),
                project_name: row.conversation.project_name.clone(),
                last_message: row.conversation.last_message.clone(),
                message_count: row.conversation.message_count,
                tool_call_count: row.conversation.tool_call_count,
                last_activity: row.conversation.last_activity,
                status: row.status,
                is_selected: selected == Some(row.conversation.id.as_str()),
            })
            .collect();

        let detail = match &self.detail {
            ConversationDetail::Closed => ConversationDetailView::Closed,
            ConversationDetail::Loading { conversation_id } => ConversationDetailView::Loading {
                conversation_id: conversation_id.clone(),
            },
            ConversationDetail::Loaded {
                conversation_id,
                messages,
            } => ConversationDetailView::Messages {
                conversation_id: conversation_id.clone(),
                project_name: self.project_name_of(conversation_id),
                messages: messages.clone(),
            },
            ConversationDetail::Failed { conversation_id } => ConversationDetailView::Failed {
                conversation_id: conversation_id.clone(),
            },
        };

        ConversationPageView {
            header: header_of(&self.page),
            cards,
            detail,
        }
    }

    fn project_name_of(&self, conversation_id: &str) -> Option<String> {
        self.page
            .items()
            .iter()
            .find(|row| row.conversation.id == conversation_id)
            .map(|row| row.conversation.project_name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginPage {
    pub(crate) page: PageState<Plugin>,
    pub(crate) marketplaces: Vec<Marketplace>,
    pub(crate) summary: CatalogSummary,
    pub(crate) selected: Option<String>,
}

impl PluginPage {
    fn new(poll_interval: Duration) -> Self {
        Self {
            page: PageState::new(poll_interval),
            marketplaces: Vec::new(),
            summary: CatalogSummary::default(),
            selected: None,
        }
    }

    pub fn page(&self) -> &PageState<Plugin> {
        &self.page
    }

    pub fn marketplaces(&self) -> &[Marketplace] {
        &self.marketplaces
    }

    pub fn summary(&self) -> CatalogSummary {
        self.summary
    }

    pub fn selected(&self) -> Option<&Plugin> {
        let id = self.selected.as_deref()?;
        self.page.items().iter().find(|plugin| plugin.id == id)
    }

    pub(crate) fn select(&mut self, plugin_id: Option<String>) {
        self.selected = plugin_id;
        self.page.mark_dirty(Region::Detail);
        self.page.mark_dirty(Region::List);
    }

    pub fn view(&self, now: DateTime<Utc>) -> PluginPageView {
        let selected = self.selected.as_deref();
        let cards = self
            .page
            .visible(now)
            .into_iter()
            .map(|plugin| PluginCard {
                id: plugin.id.clone(),
                name: plugin.name.clone(),
                marketplace_name: plugin.marketplace_name.clone(),
                status: plugin.status.clone(),
                enabled: plugin.is_enabled(),
                description: plugin.description.clone(),
                permission_count: plugin.permissions.len(),
                is_selected: selected == Some(plugin.id.as_str()),
            })
            .collect();

        PluginPageView {
            header: header_of(&self.page),
            summary: self.summary,
            marketplaces: self.marketplaces.clone(),
            cards,
            detail: self.selected().cloned(),
        }
    }
}

fn header_of<T>(page: &PageState<T>) -> PageHeaderView {
    PageHeaderView {
        lifecycle: page.lifecycle(),
        loading: page.is_loading(),
        error: page.error().map(ToOwned::to_owned),
        filter: page.filter(),
        search: page.query().raw().to_owned(),
        total: page.items().len(),
        last_refreshed: page.last_refreshed(),
    }
}

/// Lifecycle operations common to both pages, independent of the item type.
pub(crate) trait PageControl {
    fn lifecycle(&self) -> Lifecycle;
    fn poll_interval(&self) -> Duration;
    fn filter(&self) -> StatusFilter;
    fn mount(&mut self) -> bool;
    fn skeleton_rendered(&mut self) -> bool;
    fn retry(&mut self) -> bool;
    fn set_loading(&mut self, loading: bool);
    fn fail(&mut self, seq: RequestSeq, message: String) -> bool;
    fn set_filter(&mut self, filter: StatusFilter) -> bool;
    fn set_search(&mut self, text: String) -> bool;
    fn teardown(&mut self) -> bool;
    fn mark_dirty(&mut self, region: Region);
    fn consume_dirty(&mut self) -> DirtyRegions;
}

impl<T> PageControl for PageState<T> {
    fn lifecycle(&self) -> Lifecycle {
        PageState::lifecycle(self)
    }
    fn poll_interval(&self) -> Duration {
        PageState::poll_interval(self)
    }
    fn filter(&self) -> StatusFilter {
        PageState::filter(self)
    }
    fn mount(&mut self) -> bool {
        PageState::mount(self)
    }
    fn skeleton_rendered(&mut self) -> bool {
        PageState::skeleton_rendered(self)
    }
    fn retry(&mut self) -> bool {
        PageState::retry(self)
    }
    fn set_loading(&mut self, loading: bool) {
        PageState::set_loading(self, loading)
    }
    fn fail(&mut self, seq: RequestSeq, message: String) -> bool {
        PageState::fail(self, seq, message)
    }
    fn set_filter(&mut self, filter: StatusFilter) -> bool {
        PageState::set_filter(self, filter)
    }
    fn set_search(&mut self, text: String) -> bool {
        PageState::set_search(self, text)
    }
    fn teardown(&mut self) -> bool {
        PageState::teardown(self)
    }
    fn mark_dirty(&mut self, region: Region) {
        PageState::mark_dirty(self, region)
    }
    fn consume_dirty(&mut self) -> DirtyRegions {
        PageState::consume_dirty(self)
    }
}

/// Both page controllers. The pages share no state with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) conversations: ConversationPage,
    pub(crate) plugins: PluginPage,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_intervals(
            PageKind::Conversations.default_poll_interval(),
            PageKind::Plugins.default_poll_interval(),
        )
    }

    pub fn with_intervals(conversations: Duration, plugins: Duration) -> Self {
        Self {
            conversations: ConversationPage::new(conversations),
            plugins: PluginPage::new(plugins),
        }
    }

    pub fn conversations(&self) -> &ConversationPage {
        &self.conversations
    }

    pub fn plugins(&self) -> &PluginPage {
        &self.plugins
    }

    pub fn lifecycle(&self, page: PageKind) -> Lifecycle {
        self.control(page).lifecycle()
    }

    /// Regions of `page` changed since the last call.
    pub fn consume_dirty(&mut self, page: PageKind) -> DirtyRegions {
        self.control_mut(page).consume_dirty()
    }

    pub(crate) fn control(&self, page: PageKind) -> &dyn PageControl {
        match page {
            PageKind::Conversations => &self.conversations.page,
            PageKind::Plugins => &self.plugins.page,
        }
    }

    pub(crate) fn control_mut(&mut self, page: PageKind) -> &mut dyn PageControl {
        match page {
            PageKind::Conversations => &mut self.conversations.page,
            PageKind::Plugins => &mut self.plugins.page,
        }
    }

    pub(crate) fn close_detail(&mut self, page: PageKind) {
        match page {
            PageKind::Conversations => {
                if self.conversations.detail != ConversationDetail::Closed {
                    self.conversations.set_detail(ConversationDetail::Closed);
                }
            }
            PageKind::Plugins => {
                if self.plugins.selected.is_some() {
                    self.plugins.select(None);
                }
            }
        }
    }
}
