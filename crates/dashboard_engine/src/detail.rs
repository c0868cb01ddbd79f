use dashboard_core::Message;
use dashboard_logging::{dash_info, dash_warn};

use crate::DataFetcher;

/// Fetches the messages shown in a conversation's detail panel.
///
/// Failures stop here: they are logged and reported as `None`, which the
/// panel renders as its fixed failure text. Nothing is retried.
pub async fn load_conversation_messages(
    fetcher: &dyn DataFetcher,
    conversation_id: &str,
) -> Option<Vec<Message>> {
    match fetcher.get_conversation_messages(conversation_id).await {
        Ok(messages) => {
            dash_info!(
                "Loaded {} messages for conversation {}",
                messages.len(),
                conversation_id
            );
            Some(messages)
        }
        Err(err) => {
            dash_warn!(
                "Failed to load messages for conversation {}: {}",
                conversation_id,
                err
            );
            None
        }
    }
}
