// src/projector.rs
//! Maps a store page into API items plus the token for the next page.

use crate::cursor::{self, Cursor};
use crate::error::NewsError;
use crate::models::{key_of, NewsItem};
use crate::store::QueryPage;

/// One bad record fails the whole page. The next-page token is present
/// only when the store reported a last evaluated key.
pub fn project(page: QueryPage) -> Result<(Vec<NewsItem>, Option<String>), NewsError> {
    let items = page
        .items
        .iter()
        .map(NewsItem::from_item)
        .collect::<Result<Vec<_>, _>>()?;

    let next_cursor = match page.last_evaluated_key {
        Some(key) => {
            let (category, timestamp) = key_of(&key)?;
            Some(cursor::encode(&Cursor {
                category,
                timestamp,
            }))
        }
        None => None,
    };

    Ok((items, next_cursor))
}
