// src/query.rs
//! Turns `/news/{category}` request parameters into a store range query.

use crate::cursor::{self, Cursor};
use crate::error::NewsError;
use crate::store::{RangeQuery, ScanOrder};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default: u32,
    pub max: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default: DEFAULT_PAGE_SIZE,
            max: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// Absent, non-numeric and non-positive values fall back to the default;
    /// anything above `max` is capped.
    pub fn parse_limit(&self, raw: Option<&str>) -> u32 {
        match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
            Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX).min(self.max),
            _ => self.default,
        }
    }
}

/// Decode an optional raw token. An empty string counts as absent.
pub fn decode_cursor(raw: Option<&str>) -> Result<Option<Cursor>, NewsError> {
    match raw {
        Some(token) if !token.trim().is_empty() => Ok(Some(cursor::decode(token)?)),
        _ => Ok(None),
    }
}

/// Newest-first query over one category. A cursor issued for a different
/// category is refused instead of being handed to the store.
pub fn build(category: &str, limit: u32, cursor: Option<Cursor>) -> Result<RangeQuery, NewsError> {
    if let Some(c) = &cursor {
        if c.category != category {
            return Err(NewsError::InvalidCursor(format!(
                "cursor issued for `{}` used on `{}`",
                c.category, category
            )));
        }
    }

    Ok(RangeQuery {
        partition: category.to_string(),
        limit,
        order: ScanOrder::Descending,
        exclusive_start_key: cursor,
    })
}
