//! Dashboard core: data model, filter predicate and the pure page state machine.
mod effect;
mod filter;
mod model;
mod msg;
mod page;
mod state;
mod store;
mod update;
mod view_model;

pub use effect::Effect;
pub use filter::{
    filter_items, is_recent, matches, matches_status, Activity, ConversationRow, Filterable,
    SearchQuery, StatusFilter, RECENT_WINDOW_SECS,
};
pub use model::{
    CatalogSummary, Conversation, ConversationStates, ConversationStatus, Marketplace, Message,
    Plugin, PluginCatalog, Role,
};
pub use msg::Msg;
pub use page::{DirtyRegions, Lifecycle, PageKind, PageState, Region, RequestSeq};
pub use state::{AppState, ConversationDetail, ConversationPage, PluginPage};
pub use store::{SubscriptionId, ViewAction, ViewStateStore};
pub use update::update;
pub use view_model::{
    ConversationCard, ConversationDetailView, ConversationPageView, PageHeaderView, PluginCard,
    PluginPageView,
};
