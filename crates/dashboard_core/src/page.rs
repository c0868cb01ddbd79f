use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::filter::{filter_items, Filterable, SearchQuery, StatusFilter};

/// Sequence number stamped on every fetch so late results can be dropped.
pub type RequestSeq = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageKind {
    Conversations,
    Plugins,
}

impl PageKind {
    pub const ALL: [PageKind; 2] = [PageKind::Conversations, PageKind::Plugins];

    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Conversations => "conversations",
            PageKind::Plugins => "plugins",
        }
    }

    pub fn default_poll_interval(self) -> Duration {
        match self {
            PageKind::Conversations => Duration::from_secs(30),
            PageKind::Plugins => Duration::from_secs(60),
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageKind {
    type Err = String;

    /// Accepts the full name or any prefix of at least four characters.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        if wanted.len() >= 4 {
            if let Some(page) = Self::ALL
                .into_iter()
                .find(|page| page.as_str().starts_with(&wanted))
            {
                return Ok(page);
            }
        }
        Err(format!("unknown page '{}'", value.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    /// Skeleton is being built.
    Rendering,
    /// First fetch in flight.
    Loading,
    Ready,
    Error,
    TornDown,
}

impl Lifecycle {
    /// States in which fetched data is accepted.
    pub fn accepts_data(self) -> bool {
        matches!(
            self,
            Lifecycle::Loading | Lifecycle::Ready | Lifecycle::Error
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Status,
    Summary,
    List,
    Detail,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Status, Region::Summary, Region::List, Region::Detail];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Status => "status",
            Region::Summary => "summary",
            Region::List => "list",
            Region::Detail => "detail",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Region::Status => 1,
            Region::Summary => 1 << 1,
            Region::List => 1 << 2,
            Region::Detail => 1 << 3,
        }
    }
}

/// Set of regions that need re-rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyRegions(u8);

impl DirtyRegions {
    pub fn all() -> Self {
        Region::ALL.into_iter().collect()
    }

    pub fn insert(&mut self, region: Region) {
        self.0 |= region.bit();
    }

    pub fn contains(self, region: Region) -> bool {
        self.0 & region.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Region> {
        Region::ALL
            .into_iter()
            .filter(move |region| self.contains(*region))
    }
}

impl FromIterator<Region> for DirtyRegions {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        let mut dirty = DirtyRegions::default();
        for region in iter {
            dirty.insert(region);
        }
        dirty
    }
}

/// State shared by both pages: lifecycle, the in-memory list and the filter inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState<T> {
    lifecycle: Lifecycle,
    items: Vec<T>,
    filter: StatusFilter,
    query: SearchQuery,
    loading: bool,
    error: Option<String>,
    last_refreshed: Option<DateTime<Utc>>,
    last_applied_seq: Option<RequestSeq>,
    poll_interval: Duration,
    dirty: DirtyRegions,
}

impl<T> PageState<T> {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            lifecycle: Lifecycle::Uninitialized,
            items: Vec::new(),
            filter: StatusFilter::All,
            query: SearchQuery::default(),
            loading: false,
            error: None,
            last_refreshed: None,
            last_applied_seq: None,
            poll_interval,
            dirty: DirtyRegions::default(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn is_live(&self) -> bool {
        !matches!(
            self.lifecycle,
            Lifecycle::Uninitialized | Lifecycle::TornDown
        )
    }

    pub(crate) fn mark_dirty(&mut self, region: Region) {
        self.dirty.insert(region);
    }

    pub fn consume_dirty(&mut self) -> DirtyRegions {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mount(&mut self) -> bool {
        if !matches!(
            self.lifecycle,
            Lifecycle::Uninitialized | Lifecycle::TornDown
        ) {
            return false;
        }
        self.lifecycle = Lifecycle::Rendering;
        self.items.clear();
        self.loading = false;
        self.error = None;
        self.dirty = DirtyRegions::all();
        true
    }

    pub(crate) fn skeleton_rendered(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Rendering {
            return false;
        }
        self.lifecycle = Lifecycle::Loading;
        self.mark_dirty(Region::Status);
        true
    }

    pub(crate) fn retry(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Error {
            return false;
        }
        self.lifecycle = Lifecycle::Loading;
        self.error = None;
        self.mark_dirty(Region::Status);
        true
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        if self.lifecycle.accepts_data() && self.loading != loading {
            self.loading = loading;
            self.mark_dirty(Region::Status);
        }
    }

    /// Returns false when `seq` is older than the last applied result.
    fn accept_seq(&mut self, seq: RequestSeq) -> bool {
        if self.last_applied_seq.is_some_and(|last| seq < last) {
            return false;
        }
        self.last_applied_seq = Some(seq);
        true
    }

    /// Replaces the whole list. Returns false when the result was ignored.
    pub(crate) fn replace_items(
        &mut self,
        seq: RequestSeq,
        items: Vec<T>,
        fetched_at: DateTime<Utc>,
    ) -> bool {
        if !self.lifecycle.accepts_data() || !self.accept_seq(seq) {
            return false;
        }
        self.items = items;
        self.lifecycle = Lifecycle::Ready;
        self.loading = false;
        self.error = None;
        self.last_refreshed = Some(fetched_at);
        self.mark_dirty(Region::Status);
        self.mark_dirty(Region::Summary);
        self.mark_dirty(Region::List);
        true
    }

    pub(crate) fn fail(&mut self, seq: RequestSeq, message: String) -> bool {
        if !self.lifecycle.accepts_data() || !self.accept_seq(seq) {
            return false;
        }
        self.lifecycle = Lifecycle::Error;
        self.loading = false;
        self.error = Some(message);
        self.mark_dirty(Region::Status);
        true
    }

    pub(crate) fn set_filter(&mut self, filter: StatusFilter) -> bool {
        if self.filter == filter {
            return false;
        }
        self.filter = filter;
        self.mark_dirty(Region::List);
        true
    }

    pub(crate) fn set_search(&mut self, text: String) -> bool {
        let query = SearchQuery::new(text);
        if self.query == query {
            return false;
        }
        self.query = query;
        self.mark_dirty(Region::List);
        true
    }

    pub(crate) fn teardown(&mut self) -> bool {
        if !self.is_live() {
            return false;
        }
        self.lifecycle = Lifecycle::TornDown;
        self.loading = false;
        true
    }
}

impl<T: Filterable> PageState<T> {
    /// Items that pass the current filter, evaluated against `now`.
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<&T> {
        filter_items(&self.items, self.filter, &self.query, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_kind_accepts_prefixes() {
        assert_eq!("conv".parse::<PageKind>(), Ok(PageKind::Conversations));
        assert_eq!("PLUGINS".parse::<PageKind>(), Ok(PageKind::Plugins));
        assert!("p".parse::<PageKind>().is_err());
        assert!("settings".parse::<PageKind>().is_err());
    }

    #[test]
    fn dirty_regions_iterate_in_render_order() {
        let dirty: DirtyRegions = [Region::Detail, Region::Status].into_iter().collect();
        assert_eq!(
            dirty.iter().collect::<Vec<_>>(),
            vec![Region::Status, Region::Detail]
        );
        assert!(!dirty.contains(Region::List));
    }

    #[test]
    fn older_sequence_is_ignored() {
        let mut page: PageState<u8> = PageState::new(Duration::from_secs(1));
        assert!(page.mount());
        assert!(page.skeleton_rendered());
        let now = Utc::now();
        assert!(page.replace_items(2, vec![2], now));
        assert!(!page.replace_items(1, vec![1], now));
        assert!(!page.fail(1, "late".into()));
        assert_eq!(page.items(), &[2]);
        assert_eq!(page.lifecycle(), Lifecycle::Ready);
    }
}
