use chrono::{DateTime, Utc};
use dashboard_core::{
    ConversationCard, ConversationDetailView, ConversationPageView, Lifecycle, PageHeaderView,
    PageKind, Plugin, PluginCard, PluginPageView, Region,
};

/// Shown in the detail panel when a conversation's messages could not be fetched.
pub const MESSAGES_FAILED_TEXT: &str = "Failed to load messages";

const PREVIEW_CHARS: usize = 120;

/// Replaces the content of one region of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCommand {
    pub page: PageKind,
    pub region: Region,
    pub html: String,
}

pub fn render_conversations(
    view: &ConversationPageView,
    regions: impl IntoIterator<Item = Region>,
    now: DateTime<Utc>,
) -> Vec<RenderCommand> {
    regions
        .into_iter()
        .filter_map(|region| {
            let html = match region {
                Region::Status => status_html(PageKind::Conversations, &view.header, now),
                Region::List => conversation_list_html(view, now),
                Region::Detail => conversation_detail_html(&view.detail),
                Region::Summary => return None,
            };
            Some(RenderCommand {
                page: PageKind::Conversations,
                region,
                html,
            })
        })
        .collect()
}

pub fn render_plugins(
    view: &PluginPageView,
    regions: impl IntoIterator<Item = Region>,
    now: DateTime<Utc>,
) -> Vec<RenderCommand> {
    regions
        .into_iter()
        .map(|region| {
            let html = match region {
                Region::Status => status_html(PageKind::Plugins, &view.header, now),
                Region::Summary => plugin_summary_html(view),
                Region::List => plugin_list_html(view),
                Region::Detail => plugin_detail_html(view.detail.as_ref()),
            };
            RenderCommand {
                page: PageKind::Plugins,
                region,
                html,
            }
        })
        .collect()
}

fn status_html(page: PageKind, header: &PageHeaderView, now: DateTime<Utc>) -> String {
    match header.lifecycle {
        Lifecycle::Uninitialized | Lifecycle::Rendering | Lifecycle::TornDown => String::new(),
        Lifecycle::Loading => format!("<p data-state=\"loading\">Loading {page}…</p>"),
        Lifecycle::Error => format!(
            "<div data-state=\"error\"><p>{}</p><button data-action=\"retry\">Retry</button></div>",
            escape(header.error.as_deref().unwrap_or("Something went wrong"))
        ),
        Lifecycle::Ready => {
            let mut parts = vec![format!("{} {page}", header.total)];
            if let Some(refreshed) = header.last_refreshed {
                parts.push(format!("updated {}", format_relative(refreshed, now)));
            }
            parts.push(format!("filter: {}", header.filter));
            if !header.search.trim().is_empty() {
                parts.push(format!("search: \"{}\"", escape(header.search.trim())));
            }
            if header.loading {
                parts.push("refreshing…".to_string());
            }
            format!("<p data-state=\"ready\">{}</p>", parts.join(" · "))
        }
    }
}

fn conversation_list_html(view: &ConversationPageView, now: DateTime<Utc>) -> String {
    if view.header.lifecycle != Lifecycle::Ready && view.header.total == 0 {
        return String::new();
    }
    if view.cards.is_empty() {
        return empty_list_html(view.header.total, "conversations");
    }
    view.cards
        .iter()
        .map(|card| conversation_card_html(card, now))
        .collect()
}

fn conversation_card_html(card: &ConversationCard, now: DateTime<Utc>) -> String {
    let when = card
        .last_activity
        .map(|ts| format_relative(ts, now))
        .unwrap_or_else(|| "never".to_string());
    format!(
        "<article data-id=\"{id}\" data-status=\"{status}\"{selected}><h3>{project}</h3><p>{preview}</p><footer>{messages} · {tools} · {when}</footer></article>",
        id = escape(&card.id),
        status = card.status,
        selected = selected_attr(card.is_selected),
        project = escape(&card.project_name),
        preview = escape(&truncate_chars(&card.last_message, PREVIEW_CHARS)),
        messages = plural(card.message_count as usize, "message"),
        tools = plural(card.tool_call_count as usize, "tool call"),
    )
}

fn conversation_detail_html(detail: &ConversationDetailView) -> String {
    match detail {
        ConversationDetailView::Closed => String::new(),
        ConversationDetailView::Loading { .. } => "<p>Loading messages…</p>".to_string(),
        ConversationDetailView::Failed { .. } => {
            format!("<p data-state=\"error\">{MESSAGES_FAILED_TEXT}</p>")
        }
        ConversationDetailView::Messages {
            conversation_id,
            project_name,
            messages,
        } => {
            let title = project_name.as_deref().unwrap_or(conversation_id);
            let body = if messages.is_empty() {
                "<p>No messages.</p>".to_string()
            } else {
                let items: String = messages
                    .iter()
                    .map(|message| {
                        let time = message
                            .timestamp
                            .map(|ts| format!(" <time>{}</time>", ts.format("%Y-%m-%d %H:%M:%S")))
                            .unwrap_or_default();
                        format!(
                            "<li data-role=\"{role}\"><strong>{role}</strong>{time}<p>{content}</p></li>",
                            role = message.role,
                            content = escape(&message.content),
                        )
                    })
                    .collect();
                format!("<ol>{items}</ol>")
            };
            format!(
                "<div data-conversation=\"{}\"><h2>{}</h2>{body}</div>",
                escape(conversation_id),
                escape(title)
            )
        }
    }
}

fn plugin_summary_html(view: &PluginPageView) -> String {
    if view.header.lifecycle != Lifecycle::Ready && view.header.total == 0 {
        return String::new();
    }
    let summary = view.summary;
    let marketplaces: String = view
        .marketplaces
        .iter()
        .map(|market| {
            format!(
                "<li>{} ({}) · {}</li>",
                escape(&market.name),
                escape(&market.status),
                plural(market.plugin_count as usize, "plugin")
            )
        })
        .collect();
    format!(
        "<dl><dt>Plugins</dt><dd>{}</dd><dt>Enabled</dt><dd>{}</dd><dt>Marketplaces</dt><dd>{}</dd></dl><ul>{marketplaces}</ul>",
        summary.total_plugins, summary.enabled_plugins, summary.total_marketplaces
    )
}

fn plugin_list_html(view: &PluginPageView) -> String {
    if view.header.lifecycle != Lifecycle::Ready && view.header.total == 0 {
        return String::new();
    }
    if view.cards.is_empty() {
        return empty_list_html(view.header.total, "plugins");
    }
    view.cards.iter().map(plugin_card_html).collect()
}

fn plugin_card_html(card: &PluginCard) -> String {
    format!(
        "<article data-id=\"{id}\" data-enabled=\"{enabled}\"{selected}><h3>{name}</h3><p>{description}</p><footer>{marketplace} · {status} · {permissions}</footer></article>",
        id = escape(&card.id),
        enabled = card.enabled,
        selected = selected_attr(card.is_selected),
        name = escape(&card.name),
        description = escape(&truncate_chars(&card.description, PREVIEW_CHARS)),
        marketplace = escape(&card.marketplace_name),
        status = escape(&card.status),
        permissions = plural(card.permission_count, "permission"),
    )
}

fn plugin_detail_html(plugin: Option<&Plugin>) -> String {
    let Some(plugin) = plugin else {
        return String::new();
    };
    let mut meta = vec![escape(&plugin.status), escape(&plugin.marketplace_name)];
    if let Some(version) = &plugin.version {
        meta.push(format!("v{}", escape(version)));
    }
    if let Some(author) = &plugin.author {
        meta.push(format!("by {}", escape(author)));
    }
    let permissions = if plugin.permissions.is_empty() {
        "<p>No permissions requested.</p>".to_string()
    } else {
        let items: String = plugin
            .permissions
            .iter()
            .map(|permission| format!("<li>{}</li>", escape(permission)))
            .collect();
        format!("<ul>{items}</ul>")
    };
    format!(
        "<div data-plugin=\"{}\"><h2>{}</h2><p>{}</p><p>{}</p><h4>Permissions</h4>{permissions}</div>",
        escape(&plugin.id),
        escape(&plugin.name),
        meta.join(" · "),
        escape(&plugin.description),
    )
}

fn empty_list_html(total: usize, noun: &str) -> String {
    if total == 0 {
        format!("<p>No {noun} yet.</p>")
    } else {
        format!("<p>No {noun} match the current filter.</p>")
    }
}

fn selected_attr(selected: bool) -> &'static str {
    if selected {
        " data-selected=\"true\""
    } else {
        ""
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(timestamp).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use dashboard_core::{
        update, AppState, Conversation, ConversationStates, Msg, PluginCatalog, StatusFilter,
        ViewAction,
    };
    use pretty_assertions::assert_eq;

    fn ready_state(now: DateTime<Utc>) -> AppState {
        let mut state = AppState::new();
        for page in PageKind::ALL {
            state = update(state, Msg::Mount(page)).0;
            state = update(state, Msg::SkeletonRendered(page)).0;
        }
        let conversations = vec![
            Conversation {
                id: "1".to_string(),
                project_name: "alpha <dev>".to_string(),
                last_message: "x".repeat(200),
                message_count: 1,
                tool_call_count: 3,
                last_activity: Some(now - TimeDelta::minutes(5)),
                status: None,
            },
            Conversation {
                id: "2".to_string(),
                project_name: "beta".to_string(),
                last_message: "bye".to_string(),
                message_count: 4,
                tool_call_count: 0,
                last_activity: None,
                status: None,
            },
        ];
        let states: ConversationStates =
            [("1".to_string(), dashboard_core::ConversationStatus::Active)]
                .into_iter()
                .collect();
        state = update(
            state,
            Msg::View(ViewAction::UpdateConversations {
                seq: 1,
                conversations,
                states,
                fetched_at: now,
            }),
        )
        .0;
        let catalog: PluginCatalog = PluginCatalog {
            plugins: vec![
                Plugin {
                    id: "gh".to_string(),
                    name: "GitHub Integration".to_string(),
                    status: "enabled".to_string(),
                    marketplace_name: "official".to_string(),
                    description: "Issues & PRs".to_string(),
                    permissions: vec!["repo".to_string()],
                    version: Some("1.2.0".to_string()),
                    author: None,
                },
                Plugin {
                    id: "pg".to_string(),
                    name: "PostgreSQL".to_string(),
                    status: "disabled".to_string(),
                    marketplace_name: "community".to_string(),
                    description: String::new(),
                    permissions: vec![],
                    version: None,
                    author: None,
                },
            ],
            ..PluginCatalog::default()
        };
        update(
            state,
            Msg::View(ViewAction::UpdatePlugins {
                seq: 2,
                catalog,
                fetched_at: now,
            }),
        )
        .0
    }

    #[test]
    fn conversation_cards_are_escaped_and_truncated() {
        let now = Utc::now();
        let state = ready_state(now);
        let view = state.conversations().view(now);
        let commands = render_conversations(&view, [Region::List], now);

        assert_eq!(commands.len(), 1);
        let html = &commands[0].html;
        assert!(html.contains("<h3>alpha &lt;dev&gt;</h3>"));
        assert!(html.contains(&format!("{}…", "x".repeat(PREVIEW_CHARS))));
        assert!(html.contains("1 message · 3 tool calls · 5m ago"));
        assert!(html.contains("data-status=\"active\""));
        assert!(html.contains("4 messages · 0 tool calls · never"));
    }

    #[test]
    fn conversation_page_has_no_summary_region() {
        let now = Utc::now();
        let view = ready_state(now).conversations().view(now);
        let regions: Vec<_> = render_conversations(&view, Region::ALL, now)
            .into_iter()
            .map(|command| command.region)
            .collect();
        assert_eq!(regions, vec![Region::Status, Region::List, Region::Detail]);
    }

    #[test]
    fn filtered_out_cards_are_not_rendered() {
        let now = Utc::now();
        let state = ready_state(now);
        let (state, _) = update(
            state,
            Msg::FilterChanged {
                page: PageKind::Conversations,
                filter: StatusFilter::Inactive,
            },
        );
        let view = state.conversations().view(now);
        let html = &render_conversations(&view, [Region::List], now)[0].html;
        assert!(html.contains("data-id=\"2\""));
        assert!(!html.contains("data-id=\"1\""));
    }

    #[test]
    fn empty_filter_result_says_so() {
        let now = Utc::now();
        let state = ready_state(now);
        let (state, _) = update(
            state,
            Msg::SearchChanged {
                page: PageKind::Plugins,
                text: "nothing-like-this".to_string(),
            },
        );
        let view = state.plugins().view(now);
        assert_eq!(
            render_plugins(&view, [Region::List], now)[0].html,
            "<p>No plugins match the current filter.</p>"
        );
    }

    #[test]
    fn failed_detail_shows_fixed_text() {
        let html = conversation_detail_html(&ConversationDetailView::Failed {
            conversation_id: "1".to_string(),
        });
        assert_eq!(html, "<p data-state=\"error\">Failed to load messages</p>");
    }

    #[test]
    fn error_status_offers_retry() {
        let header = PageHeaderView {
            lifecycle: Lifecycle::Error,
            loading: false,
            error: Some("Could not load plugins: timeout".to_string()),
            filter: StatusFilter::All,
            search: String::new(),
            total: 0,
            last_refreshed: None,
        };
        let html = status_html(PageKind::Plugins, &header, Utc::now());
        assert!(html.contains("Could not load plugins: timeout"));
        assert!(html.contains("data-action=\"retry\""));
    }

    #[test]
    fn plugin_detail_lists_permissions() {
        let now = Utc::now();
        let state = ready_state(now);
        let (state, _) = update(
            state,
            Msg::PluginSelected {
                plugin_id: "gh".to_string(),
            },
        );
        let view = state.plugins().view(now);
        let html = &render_plugins(&view, [Region::Detail], now)[0].html;
        assert_eq!(
            html,
            "<div data-plugin=\"gh\"><h2>GitHub Integration</h2><p>enabled · official · v1.2.0</p><p>Issues &amp; PRs</p><h4>Permissions</h4><ul><li>repo</li></ul></div>"
        );
    }

    #[test]
    fn plugin_summary_is_derived_when_missing() {
        let now = Utc::now();
        let view = ready_state(now).plugins().view(now);
        let html = &render_plugins(&view, [Region::Summary], now)[0].html;
        assert!(html.starts_with(
            "<dl><dt>Plugins</dt><dd>2</dd><dt>Enabled</dt><dd>1</dd><dt>Marketplaces</dt><dd>0</dd></dl>"
        ));
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(format_relative(now - TimeDelta::seconds(10), now), "just now");
        assert_eq!(format_relative(now - TimeDelta::minutes(59), now), "59m ago");
        assert_eq!(format_relative(now - TimeDelta::hours(5), now), "5h ago");
        assert_eq!(format_relative(now - TimeDelta::days(3), now), "3d ago");
    }
}
