//! Dashboard engine: data-service access, poll loops and page output.
mod detail;
mod engine;
mod fetch;
mod persist;
mod poll;
mod types;

pub use detail::load_conversation_messages;
pub use engine::EngineHandle;
pub use fetch::{DataFetcher, FetchSettings, ReqwestDataFetcher};
pub use persist::{ensure_output_dir, PageWriter, PersistError};
pub use poll::{PollHandle, PollLoop};
pub use types::{DataError, EngineEvent, FailureKind};
