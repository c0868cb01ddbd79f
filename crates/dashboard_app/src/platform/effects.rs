use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Duration;

use dashboard_core::{Effect, Msg, PageKind, SubscriptionId, ViewAction, ViewStateStore};
use dashboard_engine::{EngineEvent, EngineHandle};
use dashboard_logging::{dash_debug, dash_info, dash_warn};

/// Executes IO effects against the engine and routes engine events through
/// the view-state store.
pub struct EffectRunner {
    engine: EngineHandle,
    store: ViewStateStore,
    subscriptions: HashMap<PageKind, SubscriptionId>,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self {
            engine,
            store: ViewStateStore::new(),
            subscriptions: HashMap::new(),
            msg_tx,
        }
    }

    pub fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Subscribe(page) => {
                let msg_tx = self.msg_tx.clone();
                let id = self.store.subscribe(page, move |action: &ViewAction| {
                    let _ = msg_tx.send(Msg::View(action.clone()));
                });
                if let Some(previous) = self.subscriptions.insert(page, id) {
                    self.store.unsubscribe(previous);
                }
                dash_debug!("Subscribed {} to view state ({})", page, id);
            }
            Effect::ReleaseSubscription(page) => {
                if let Some(id) = self.subscriptions.remove(&page) {
                    self.store.unsubscribe(id);
                    dash_debug!("Released view state subscription of {}", page);
                }
            }
            Effect::StartPolling { page, interval } => self.engine.start_polling(page, interval),
            Effect::StopPolling(page) => self.engine.stop_polling(page),
            Effect::FetchNow(page) => {
                dash_info!("Manual refresh of {}", page);
                self.engine.fetch_now(page);
            }
            Effect::LoadMessages { conversation_id } => {
                self.engine.load_messages(conversation_id);
            }
            Effect::RenderSkeleton(page) => {
                dash_warn!("Skeleton render for {} reached the effect runner", page);
            }
        }
    }

    pub fn recv_event(&self, timeout: Duration) -> Option<EngineEvent> {
        self.engine.recv_timeout(timeout)
    }

    pub fn try_recv_event(&self) -> Option<EngineEvent> {
        self.engine.try_recv()
    }

    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::FetchStarted { page, seq } => {
                dash_debug!("Fetch {} for {} started", seq, page);
                self.store.dispatch(ViewAction::SetLoading {
                    page,
                    loading: true,
                });
            }
            EngineEvent::ConversationsFetched {
                seq,
                conversations,
                states,
                fetched_at,
            } => {
                dash_info!(
                    "Fetched {} conversations ({} states)",
                    conversations.len(),
                    states.len()
                );
                self.store.dispatch(ViewAction::UpdateConversations {
                    seq,
                    conversations,
                    states,
                    fetched_at,
                });
            }
            EngineEvent::PluginsFetched {
                seq,
                catalog,
                fetched_at,
            } => {
                dash_info!(
                    "Fetched {} plugins from {} marketplaces",
                    catalog.plugins.len(),
                    catalog.marketplaces.len()
                );
                self.store.dispatch(ViewAction::UpdatePlugins {
                    seq,
                    catalog,
                    fetched_at,
                });
            }
            EngineEvent::FetchFailed { page, seq, error } => {
                dash_warn!("Fetch {} for {} failed: {}", seq, page, error);
                self.store.dispatch(ViewAction::SetError {
                    page,
                    seq,
                    message: format!("Could not load {page}: {}", error.kind),
                });
            }
            EngineEvent::MessagesLoaded {
                conversation_id,
                messages,
            } => {
                let _ = self.msg_tx.send(Msg::MessagesLoaded {
                    conversation_id,
                    messages,
                });
            }
        }
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}
