// src/store/mod.rs
//! Range-query seam over a partition + sort-key table.
//!
//! Handlers only see [`NewsStore`]; production wires [`dynamo::DynamoNewsStore`],
//! tests and local development use [`memory::MemoryNewsStore`].

pub mod dynamo;
pub mod memory;

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::cursor::Cursor;

/// A raw record as the table returns it.
pub type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    Ascending,
    Descending,
}

/// A single-partition range query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub partition: String,
    pub limit: u32,
    pub order: ScanOrder,
    /// Resume strictly after this key in `order`.
    pub exclusive_start_key: Option<Cursor>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub items: Vec<Item>,
    /// Present when the store may hold more items past this page.
    pub last_evaluated_key: Option<Item>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("query rejected: {0}")]
    Rejected(String),
}

#[async_trait::async_trait]
pub trait NewsStore: Send + Sync {
    async fn query(&self, query: &RangeQuery) -> Result<QueryPage, StoreError>;

    fn name(&self) -> &'static str;
}

/// Build a key-only record from a cursor, as used for exclusive start keys.
pub fn key_item(key: &Cursor) -> Item {
    let mut item = HashMap::with_capacity(2);
    item.insert(
        crate::models::ATTR_CATEGORY.to_string(),
        AttributeValue::S(key.category.clone()),
    );
    item.insert(
        crate::models::ATTR_TIMESTAMP.to_string(),
        AttributeValue::N(key.timestamp.to_string()),
    );
    item
}
