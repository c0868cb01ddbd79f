use std::fmt;

use chrono::{DateTime, Utc};
use dashboard_core::{
    Conversation, ConversationStates, Message, PageKind, PluginCatalog, RequestSeq,
};

/// Events reported by the engine thread to the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    FetchStarted {
        page: PageKind,
        seq: RequestSeq,
    },
    ConversationsFetched {
        seq: RequestSeq,
        conversations: Vec<Conversation>,
        states: ConversationStates,
        fetched_at: DateTime<Utc>,
    },
    PluginsFetched {
        seq: RequestSeq,
        catalog: PluginCatalog,
        fetched_at: DateTime<Utc>,
    },
    FetchFailed {
        page: PageKind,
        seq: RequestSeq,
        error: DataError,
    },
    /// `messages` is `None` when the detail fetch failed.
    MessagesLoaded {
        conversation_id: String,
        messages: Option<Vec<Message>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataError {
    pub kind: FailureKind,
    pub message: String,
}

impl DataError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for DataError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "invalid response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
