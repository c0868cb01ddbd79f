//! View-state broadcast hub.
//!
//! Fetch outcomes are dispatched here as [`ViewAction`]s; every page
//! controller holds a subscription for its own page and turns the actions it
//! receives into messages. Releasing the subscription on teardown is what
//! stops a page from reacting to data that is still in flight.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::{Conversation, ConversationStates, PluginCatalog};
use crate::page::{PageKind, RequestSeq};

pub type SubscriptionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    SetLoading {
        page: PageKind,
        loading: bool,
    },
    SetError {
        page: PageKind,
        seq: RequestSeq,
        message: String,
    },
    UpdateConversations {
        seq: RequestSeq,
        conversations: Vec<Conversation>,
        states: ConversationStates,
        fetched_at: DateTime<Utc>,
    },
    UpdatePlugins {
        seq: RequestSeq,
        catalog: PluginCatalog,
        fetched_at: DateTime<Utc>,
    },
}

impl ViewAction {
    pub fn page(&self) -> PageKind {
        match self {
            ViewAction::SetLoading { page, .. } | ViewAction::SetError { page, .. } => *page,
            ViewAction::UpdateConversations { .. } => PageKind::Conversations,
            ViewAction::UpdatePlugins { .. } => PageKind::Plugins,
        }
    }

    /// Wire-style action tag.
    pub fn tag(&self) -> &'static str {
        match self {
            ViewAction::SetLoading { .. } => "set_loading",
            ViewAction::SetError { .. } => "set_error",
            ViewAction::UpdateConversations { .. } => "update_conversations",
            ViewAction::UpdatePlugins { .. } => "update_plugins",
        }
    }
}

type Listener = Box<dyn FnMut(&ViewAction) + Send>;

struct Subscription {
    page: PageKind,
    listener: Listener,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct PageSnapshot {
    loading: bool,
    error: Option<String>,
}

#[derive(Default)]
pub struct ViewStateStore {
    next_id: SubscriptionId,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    snapshots: BTreeMap<PageKind, PageSnapshot>,
}

impl ViewStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, page: PageKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&ViewAction) + Send + 'static,
    {
        self.next_id += 1;
        let id = self.next_id;
        self.subscriptions.insert(
            id,
            Subscription {
                page,
                listener: Box::new(listener),
            },
        );
        id
    }

    /// Returns false if the subscription was already released.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    pub fn subscriber_count(&self, page: PageKind) -> usize {
        self.subscriptions
            .values()
            .filter(|sub| sub.page == page)
            .count()
    }

    /// Records the action and notifies every subscriber of its page.
    /// Returns the number of listeners notified.
    pub fn dispatch(&mut self, action: ViewAction) -> usize {
        let snapshot = self.snapshots.entry(action.page()).or_default();
        match &action {
            ViewAction::SetLoading { loading, .. } => snapshot.loading = *loading,
            ViewAction::SetError { message, .. } => {
                snapshot.loading = false;
                snapshot.error = Some(message.clone());
            }
            ViewAction::UpdateConversations { .. } | ViewAction::UpdatePlugins { .. } => {
                snapshot.loading = false;
                snapshot.error = None;
            }
        }

        let page = action.page();
        let mut notified = 0;
        for subscription in self.subscriptions.values_mut() {
            if subscription.page == page {
                (subscription.listener)(&action);
                notified += 1;
            }
        }
        notified
    }

    pub fn is_loading(&self, page: PageKind) -> bool {
        self.snapshots.get(&page).is_some_and(|s| s.loading)
    }

    pub fn error(&self, page: PageKind) -> Option<&str> {
        self.snapshots.get(&page).and_then(|s| s.error.as_deref())
    }
}
