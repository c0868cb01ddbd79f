use crate::filter::{ConversationRow, StatusFilter};
use crate::page::{Lifecycle, PageKind, Region};
use crate::state::ConversationDetail;
use crate::{AppState, Effect, Msg, ViewAction};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mount(page) => {
            if state.control_mut(page).mount() {
                state.close_detail(page);
                vec![Effect::RenderSkeleton(page), Effect::Subscribe(page)]
            } else {
                Vec::new()
            }
        }
        Msg::SkeletonRendered(page) => {
            let control = state.control_mut(page);
            if control.skeleton_rendered() {
                vec![Effect::StartPolling {
                    page,
                    interval: control.poll_interval(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::View(action) => {
            apply_view_action(&mut state, action);
            Vec::new()
        }
        Msg::FilterChanged { page, filter } => {
            state.control_mut(page).set_filter(filter);
            Vec::new()
        }
        Msg::SearchChanged { page, text } => {
            state.control_mut(page).set_search(text);
            Vec::new()
        }
        Msg::RefreshClicked(page) => match state.lifecycle(page) {
            Lifecycle::Ready | Lifecycle::Error => vec![Effect::FetchNow(page)],
            _ => Vec::new(),
        },
        Msg::RetryClicked(page) => {
            // Retry re-runs initialization: the poll loop restarts and fetches at once.
            let control = state.control_mut(page);
            if control.retry() {
                vec![
                    Effect::StopPolling(page),
                    Effect::StartPolling {
                        page,
                        interval: control.poll_interval(),
                    },
                ]
            } else {
                Vec::new()
            }
        }
        Msg::ConversationSelected { conversation_id } => {
            if state.lifecycle(PageKind::Conversations).accepts_data() {
                state.conversations.set_detail(ConversationDetail::Loading {
                    conversation_id: conversation_id.clone(),
                });
                vec![Effect::LoadMessages { conversation_id }]
            } else {
                Vec::new()
            }
        }
        Msg::MessagesLoaded {
            conversation_id,
            messages,
        } => {
            let pending = matches!(
                &state.conversations.detail,
                ConversationDetail::Loading { conversation_id: id } if *id == conversation_id
            );
            if pending {
                let detail = match messages {
                    Some(messages) => ConversationDetail::Loaded {
                        conversation_id,
                        messages,
                    },
                    None => ConversationDetail::Failed { conversation_id },
                };
                state.conversations.set_detail(detail);
            }
            Vec::new()
        }
        Msg::PluginSelected { plugin_id } => {
            let known = state
                .plugins
                .page
                .items()
                .iter()
                .any(|plugin| plugin.id == plugin_id);
            if known {
                state.plugins.select(Some(plugin_id));
            }
            Vec::new()
        }
        Msg::DetailClosed(page) => {
            state.close_detail(page);
            Vec::new()
        }
        Msg::Teardown(page) => {
            if state.control_mut(page).teardown() {
                state.close_detail(page);
                vec![Effect::StopPolling(page), Effect::ReleaseSubscription(page)]
            } else {
                Vec::new()
            }
        }
        Msg::Tick => {
            // "Recent" is evaluated against the current clock, so items can age out.
            for page in PageKind::ALL {
                let control = state.control_mut(page);
                if control.lifecycle() == Lifecycle::Ready
                    && control.filter() == StatusFilter::Recent
                {
                    control.mark_dirty(Region::List);
                }
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_view_action(state: &mut AppState, action: ViewAction) {
    match action {
        ViewAction::SetLoading { page, loading } => {
            state.control_mut(page).set_loading(loading);
        }
        ViewAction::SetError { page, seq, message } => {
            state.control_mut(page).fail(seq, message);
        }
        ViewAction::UpdateConversations {
            seq,
            conversations,
            states,
            fetched_at,
        } => {
            let rows = conversations
                .into_iter()
                .map(|conversation| ConversationRow {
                    status: states.status_of(&conversation),
                    conversation,
                })
                .collect();
            state
                .conversations
                .page
                .replace_items(seq, rows, fetched_at);
        }
        ViewAction::UpdatePlugins {
            seq,
            catalog,
            fetched_at,
        } => {
            let summary = catalog.effective_summary();
            let plugins = &mut state.plugins;
            if plugins.page.replace_items(seq, catalog.plugins, fetched_at) {
                plugins.marketplaces = catalog.marketplaces;
                plugins.summary = summary;
                if plugins.selected.is_some() && plugins.selected().is_none() {
                    plugins.select(None);
                } else {
                    plugins.page.mark_dirty(Region::Detail);
                }
            }
        }
    }
}
