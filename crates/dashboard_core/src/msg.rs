use crate::{Message, PageKind, StatusFilter, ViewAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page opened.
    Mount(PageKind),
    /// Region skeleton for the page exists.
    SkeletonRendered(PageKind),
    /// Broadcast received through the page's store subscription.
    View(ViewAction),
    /// User picked a status filter.
    FilterChanged { page: PageKind, filter: StatusFilter },
    /// User edited the search box.
    SearchChanged { page: PageKind, text: String },
    RefreshClicked(PageKind),
    RetryClicked(PageKind),
    /// User opened a conversation card.
    ConversationSelected { conversation_id: String },
    /// Detail fetch finished; `None` means it failed.
    MessagesLoaded {
        conversation_id: String,
        messages: Option<Vec<Message>>,
    },
    /// User opened a plugin card.
    PluginSelected { plugin_id: String },
    DetailClosed(PageKind),
    /// Page closed.
    Teardown(PageKind),
    /// Render tick; re-evaluates time-dependent filters.
    Tick,
    NoOp,
}
