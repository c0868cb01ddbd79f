use std::time::Duration;

use crate::PageKind;

/// Side effects requested by [`crate::update`]; executed by the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Build the page's empty region skeleton, then report `Msg::SkeletonRendered`.
    RenderSkeleton(PageKind),
    /// Subscribe the page to the view-state store.
    Subscribe(PageKind),
    ReleaseSubscription(PageKind),
    /// Start (or restart) the page's poll loop; it fetches immediately.
    StartPolling { page: PageKind, interval: Duration },
    StopPolling(PageKind),
    /// One-shot fetch outside the poll schedule.
    FetchNow(PageKind),
    LoadMessages { conversation_id: String },
}
