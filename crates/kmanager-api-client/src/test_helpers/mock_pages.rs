//! In-memory `PageSource` for paging tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kmanager_core::models::Page;
use kmanager_core::{ClientError, ClientResult};

use crate::paging::{ListItem, PageSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeRow {
    id: String,
}

impl ListItem for FakeRow {
    fn key(&self) -> String {
        self.id.clone()
    }
}

struct PagesInner {
    rows: Mutex<Vec<FakeRow>>,
    delay: Duration,
    fetch_calls: Mutex<Vec<(u64, u64)>>,
    deleted: Mutex<Vec<String>>,
    fail_fetch: AtomicBool,
    fail_delete: AtomicBool,
}

/// Rows `row-0..row-{n}` served by offset and limit
#[derive(Clone)]
pub struct FakePageSource {
    inner: Arc<PagesInner>,
}

impl FakePageSource {
    pub fn with_rows(count: usize) -> Self {
        let rows = (0..count)
            .map(|i| FakeRow {
                id: format!("row-{}", i),
            })
            .collect();
        Self::build(rows, Duration::ZERO)
    }

    /// Hold every page request open for `ms` milliseconds.
    pub fn with_delay_ms(self, ms: u64) -> Self {
        let rows = self.inner.rows.lock().unwrap().clone();
        Self::build(rows, Duration::from_millis(ms))
    }

    fn build(rows: Vec<FakeRow>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(PagesInner {
                rows: Mutex::new(rows),
                delay,
                fetch_calls: Mutex::new(Vec::new()),
                deleted: Mutex::new(Vec::new()),
                fail_fetch: AtomicBool::new(false),
                fail_delete: AtomicBool::new(false),
            }),
        }
    }

    pub fn fail_next_fetch(&self) {
        self.inner.fail_fetch.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_delete(&self) {
        self.inner.fail_delete.store(true, Ordering::SeqCst);
    }

    /// `(offset, limit)` of every page request, in order
    pub fn fetch_calls(&self) -> Vec<(u64, u64)> {
        self.inner.fetch_calls.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.inner.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for FakePageSource {
    type Item = FakeRow;

    async fn fetch_page(&self, offset: u64, limit: u64) -> ClientResult<Page<FakeRow>> {
        self.inner.fetch_calls.lock().unwrap().push((offset, limit));
        if !self.inner.delay.is_zero() {
            tokio::time::sleep(self.inner.delay).await;
        }
        if self.inner.fail_fetch.swap(false, Ordering::SeqCst) {
            return Err(ClientError::Network("connection reset".to_string()));
        }

        let rows = self.inner.rows.lock().unwrap();
        let items = rows
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(Page {
            items,
            total: rows.len() as u64,
        })
    }

    async fn delete_item(&self, item: &FakeRow) -> ClientResult<()> {
        if self.inner.fail_delete.swap(false, Ordering::SeqCst) {
            return Err(ClientError::Http {
                status: 500,
                message: "Delete failed".to_string(),
            });
        }
        self.inner.rows.lock().unwrap().retain(|row| row != item);
        self.inner.deleted.lock().unwrap().push(item.key());
        Ok(())
    }
}
