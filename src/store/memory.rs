// src/store/memory.rs
//! In-memory news store with the same range-query semantics as the table.
//!
//! Partitions are kept sorted by timestamp. Seeded once and read-only
//! afterwards, so no locking is needed.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;

use super::{key_item, Item, NewsStore, QueryPage, RangeQuery, ScanOrder, StoreError};
use crate::models::{key_of, NewsItem};

#[derive(Debug, Default, Clone)]
pub struct MemoryNewsStore {
    partitions: HashMap<String, BTreeMap<i64, Item>>,
}

impl MemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from typed items. A later item with the same
    /// `(category, timestamp)` replaces the earlier one.
    pub fn from_news<I>(items: I) -> Self
    where
        I: IntoIterator<Item = NewsItem>,
    {
        let mut store = Self::new();
        for item in items {
            store.insert_news(&item);
        }
        store
    }

    /// Load a JSON array of news items, the shape `/news` responds with.
    pub fn from_fixture(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading news fixtures from {}", path.display()))?;
        let items: Vec<NewsItem> = serde_json::from_str(&content)
            .with_context(|| format!("parsing news fixtures from {}", path.display()))?;
        Ok(Self::from_news(items))
    }

    pub fn insert_news(&mut self, item: &NewsItem) {
        self.partitions
            .entry(item.category.clone())
            .or_default()
            .insert(item.timestamp, item.to_item());
    }

    /// Insert a raw record, e.g. one the mapper is expected to reject.
    /// Records without a readable key are refused.
    pub fn insert_raw(&mut self, item: Item) -> anyhow::Result<()> {
        let (category, timestamp) = key_of(&item).context("raw record has no usable key")?;
        self.partitions
            .entry(category)
            .or_default()
            .insert(timestamp, item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.partitions.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl NewsStore for MemoryNewsStore {
    async fn query(&self, query: &RangeQuery) -> Result<QueryPage, StoreError> {
        if query.limit == 0 {
            return Err(StoreError::Rejected("limit must be at least 1".into()));
        }
        if let Some(start) = &query.exclusive_start_key {
            if start.category != query.partition {
                return Err(StoreError::Rejected(format!(
                    "exclusive start key partition `{}` does not match `{}`",
                    start.category, query.partition
                )));
            }
        }

        let Some(partition) = self.partitions.get(&query.partition) else {
            return Ok(QueryPage::default());
        };

        let start = query.exclusive_start_key.as_ref().map(|k| k.timestamp);
        let mut remaining: Box<dyn Iterator<Item = (&i64, &Item)> + Send + '_> = match query.order
        {
            ScanOrder::Ascending => Box::new(
                partition
                    .iter()
                    .filter(move |(ts, _)| start.map_or(true, |s| **ts > s)),
            ),
            ScanOrder::Descending => Box::new(
                partition
                    .iter()
                    .rev()
                    .filter(move |(ts, _)| start.map_or(true, |s| **ts < s)),
            ),
        };

        let mut items = Vec::new();
        let mut last_ts = None;
        for (ts, item) in remaining.by_ref().take(query.limit as usize) {
            items.push(item.clone());
            last_ts = Some(*ts);
        }

        let last_evaluated_key = match (last_ts, remaining.next()) {
            (Some(ts), Some(_)) => Some(key_item(&crate::cursor::Cursor::new(
                query.partition.clone(),
                ts,
            ))),
            _ => None,
        };

        Ok(QueryPage {
            items,
            last_evaluated_key,
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Cursor;
    use crate::models::key_of;

    fn news(category: &str, ts: i64) -> NewsItem {
        NewsItem {
            category: category.into(),
            timestamp: ts,
            news_id: format!("{category}-{ts}"),
            title: format!("{category} at {ts}"),
            points: Vec::new(),
            fetched_at: ts,
            ttl: 0,
        }
    }

    fn query(partition: &str, limit: u32, start: Option<i64>) -> RangeQuery {
        RangeQuery {
            partition: partition.into(),
            limit,
            order: ScanOrder::Descending,
            exclusive_start_key: start.map(|ts| Cursor::new(partition, ts)),
        }
    }

    fn timestamps(page: &QueryPage) -> Vec<i64> {
        page.items.iter().map(|i| key_of(i).unwrap().1).collect()
    }

    #[tokio::test]
    async fn descending_pages_resume_after_the_start_key() {
        let store = MemoryNewsStore::from_news((1..=5).map(|ts| news("tech", ts)));

        let p1 = store.query(&query("tech", 2, None)).await.unwrap();
        assert_eq!(timestamps(&p1), vec![5, 4]);
        assert_eq!(key_of(p1.last_evaluated_key.as_ref().unwrap()).unwrap().1, 4);

        let p2 = store.query(&query("tech", 2, Some(4))).await.unwrap();
        assert_eq!(timestamps(&p2), vec![3, 2]);

        let p3 = store.query(&query("tech", 2, Some(2))).await.unwrap();
        assert_eq!(timestamps(&p3), vec![1]);
        assert!(p3.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn exact_final_page_reports_no_more_items() {
        let store = MemoryNewsStore::from_news((1..=4).map(|ts| news("tech", ts)));
        let page = store.query(&query("tech", 2, Some(3))).await.unwrap();
        assert_eq!(timestamps(&page), vec![2, 1]);
        assert!(page.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn ascending_order_is_supported() {
        let store = MemoryNewsStore::from_news((1..=3).map(|ts| news("tech", ts)));
        let mut q = query("tech", 10, Some(1));
        q.order = ScanOrder::Ascending;
        let page = store.query(&q).await.unwrap();
        assert_eq!(timestamps(&page), vec![2, 3]);
    }

    #[tokio::test]
    async fn partitions_are_isolated() {
        let store = MemoryNewsStore::from_news([news("sports", 10), news("business", 20)]);
        let page = store.query(&query("sports", 10, None)).await.unwrap();
        assert_eq!(timestamps(&page), vec![10]);

        let empty = store.query(&query("science", 10, None)).await.unwrap();
        assert!(empty.items.is_empty());
        assert!(empty.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn foreign_start_key_and_zero_limit_are_rejected() {
        let store = MemoryNewsStore::from_news([news("sports", 10)]);
        let mut q = query("sports", 10, None);
        q.exclusive_start_key = Some(Cursor::new("business", 20));
        assert!(matches!(store.query(&q).await, Err(StoreError::Rejected(_))));

        assert!(store.query(&query("sports", 0, None)).await.is_err());
    }

    #[test]
    fn fixtures_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news.json");
        std::fs::write(
            &path,
            r#"[{"category":"ai","timestamp":1,"title":"a"},{"category":"ai","timestamp":2}]"#,
        )
        .unwrap();
        let store = MemoryNewsStore::from_fixture(&path).unwrap();
        assert_eq!(store.len(), 2);

        assert!(MemoryNewsStore::from_fixture(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn bundled_sample_fixtures_load() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/news.sample.json");
        let store = MemoryNewsStore::from_fixture(&path).unwrap();
        assert_eq!(store.len(), 3);
    }
}
