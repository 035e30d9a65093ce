//! Append-only list state with incremental page loading.
//!
//! A `PagedList` tracks an offset cursor and a `has_more` flag. At most one
//! page request is in flight at a time; a load requested while another is
//! running, or after the last page, is skipped rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use kmanager_core::models::{ContentGridItem, DocumentGridItem, Page, TutorialListItem};
use kmanager_core::ClientResult;
use tracing::debug;

/// Identity of a list row
pub trait ListItem {
    fn key(&self) -> String;
}

impl ListItem for ContentGridItem {
    fn key(&self) -> String {
        ContentGridItem::key(self)
    }
}

impl ListItem for DocumentGridItem {
    fn key(&self) -> String {
        self.key.clone()
    }
}

impl ListItem for TutorialListItem {
    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Backend listing behind a `PagedList`
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: ListItem + Clone + Send + Sync;

    async fn fetch_page(&self, offset: u64, limit: u64) -> ClientResult<Page<Self::Item>>;

    async fn delete_item(&self, item: &Self::Item) -> ClientResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and `added` items appended
    Loaded { added: usize },
    /// A load was already running or the list is exhausted
    Skipped,
}

struct ListState<T> {
    items: Vec<T>,
    offset: u64,
    total: u64,
    has_more: bool,
}

impl<T> ListState<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            offset: 0,
            total: 0,
            has_more: true,
        }
    }
}

/// Clears the in-flight flag even if the fetch future is dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct PagedList<S: PageSource> {
    source: S,
    page_size: u64,
    loading: AtomicBool,
    state: Mutex<ListState<S::Item>>,
}

impl<S: PageSource> PagedList<S> {
    pub fn new(source: S, page_size: u64) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            loading: AtomicBool::new(false),
            state: Mutex::new(ListState::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ListState<S::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the next page unless a fetch is in flight or no pages remain.
    pub async fn load_more(&self) -> ClientResult<LoadOutcome> {
        if !self.has_more() {
            return Ok(LoadOutcome::Skipped);
        }
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Page load already in flight, skipping");
            return Ok(LoadOutcome::Skipped);
        }
        let _guard = LoadingGuard(&self.loading);

        let offset = {
            let state = self.state();
            if !state.has_more {
                return Ok(LoadOutcome::Skipped);
            }
            state.offset
        };

        let page = self.source.fetch_page(offset, self.page_size).await?;
        let added = page.items.len();

        let mut state = self.state();
        state.has_more = offset + self.page_size < page.total;
        state.total = page.total;
        state.offset = offset + self.page_size;
        state.items.extend(page.items);

        debug!(
            offset = offset,
            added = added,
            total = page.total,
            has_more = state.has_more,
            "Page loaded"
        );
        Ok(LoadOutcome::Loaded { added })
    }

    /// Delete an item on the backend, then drop exactly that row locally.
    ///
    /// Returns `false` when no row has the key. On backend failure the list is
    /// left untouched.
    pub async fn delete(&self, key: &str) -> ClientResult<bool> {
        let item = {
            let state = self.state();
            match state.items.iter().find(|item| item.key() == key) {
                Some(item) => item.clone(),
                None => return Ok(false),
            }
        };

        self.source.delete_item(&item).await?;

        let mut state = self.state();
        if let Some(position) = state.items.iter().position(|item| item.key() == key) {
            state.items.remove(position);
            state.total = state.total.saturating_sub(1);
            // Rows behind the deleted one moved up on the backend
            state.offset = state.offset.saturating_sub(1);
        }
        Ok(true)
    }

    /// Drop all loaded rows and start over from the first page.
    pub fn reset(&self) {
        *self.state() = ListState::new();
    }

    pub fn items(&self) -> Vec<S::Item> {
        self.state().items.clone()
    }

    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_more(&self) -> bool {
        self.state().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Total reported by the last page
    pub fn total(&self) -> u64 {
        self.state().total
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
