// src/models.rs
//! Public news shapes and their mapping to/from raw store records.
//!
//! Attribute names in the table match the JSON field names, so a record
//! written by the ingest job reads back as exactly the object the API
//! returns.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::store::Item;

pub const ATTR_CATEGORY: &str = "category";
pub const ATTR_TIMESTAMP: &str = "timestamp";
const ATTR_NEWS_ID: &str = "newsId";
const ATTR_TITLE: &str = "title";
const ATTR_POINTS: &str = "points";
const ATTR_FETCHED_AT: &str = "fetchedAt";
const ATTR_TTL: &str = "ttl";

const ATTR_TEXT: &str = "text";
const ATTR_DESCRIPTION: &str = "description";
const ATTR_URL: &str = "url";
const ATTR_SOURCE: &str = "source";
const ATTR_PUBLISHED_AT: &str = "publishedAt";

/// One bullet of a news summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPoint {
    pub text: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: String,
}

/// A stored news item. `category` is the partition key, `timestamp`
/// (epoch millis) the sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub category: String,
    pub timestamp: i64,
    #[serde(default)]
    pub news_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub points: Vec<NewsPoint>,
    #[serde(default)]
    pub fetched_at: i64,
    /// Epoch seconds after which the table's TTL sweeper may drop the record.
    #[serde(default)]
    pub ttl: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("missing required attribute `{0}`")]
    Missing(String),
    #[error("attribute `{attr}` is not of type {expected}")]
    WrongType { attr: String, expected: &'static str },
    #[error("attribute `{attr}` holds an invalid number: {value}")]
    BadNumber { attr: String, value: String },
}

impl NewsItem {
    /// Map a raw record. Only the key attributes are required; everything
    /// else falls back to its empty value when absent.
    pub fn from_item(item: &Item) -> Result<Self, ProjectionError> {
        let category = required(item, ATTR_CATEGORY, string_attr)?;
        let timestamp = required(item, ATTR_TIMESTAMP, number_attr)?;

        let points = match item.get(ATTR_POINTS) {
            None | Some(AttributeValue::Null(_)) => Vec::new(),
            Some(value) => {
                let list = value.as_l().map_err(|_| ProjectionError::WrongType {
                    attr: ATTR_POINTS.to_string(),
                    expected: "L",
                })?;
                list.iter()
                    .map(NewsPoint::from_attr)
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(Self {
            category,
            timestamp,
            news_id: optional(item, ATTR_NEWS_ID, string_attr)?.unwrap_or_default(),
            title: optional(item, ATTR_TITLE, string_attr)?.unwrap_or_default(),
            points,
            fetched_at: optional(item, ATTR_FETCHED_AT, number_attr)?.unwrap_or_default(),
            ttl: optional(item, ATTR_TTL, number_attr)?.unwrap_or_default(),
        })
    }

    pub fn to_item(&self) -> Item {
        let mut item = HashMap::with_capacity(7);
        item.insert(ATTR_CATEGORY.into(), AttributeValue::S(self.category.clone()));
        item.insert(ATTR_TIMESTAMP.into(), AttributeValue::N(self.timestamp.to_string()));
        item.insert(ATTR_NEWS_ID.into(), AttributeValue::S(self.news_id.clone()));
        item.insert(ATTR_TITLE.into(), AttributeValue::S(self.title.clone()));
        item.insert(
            ATTR_POINTS.into(),
            AttributeValue::L(self.points.iter().map(NewsPoint::to_attr).collect()),
        );
        item.insert(ATTR_FETCHED_AT.into(), AttributeValue::N(self.fetched_at.to_string()));
        item.insert(ATTR_TTL.into(), AttributeValue::N(self.ttl.to_string()));
        item
    }
}

impl NewsPoint {
    fn from_attr(value: &AttributeValue) -> Result<Self, ProjectionError> {
        let map = value.as_m().map_err(|_| ProjectionError::WrongType {
            attr: ATTR_POINTS.to_string(),
            expected: "M",
        })?;
        Ok(Self {
            text: optional(map, ATTR_TEXT, string_attr)?.unwrap_or_default(),
            description: optional(map, ATTR_DESCRIPTION, string_attr)?.unwrap_or_default(),
            url: optional(map, ATTR_URL, string_attr)?.unwrap_or_default(),
            source: optional(map, ATTR_SOURCE, string_attr)?.unwrap_or_default(),
            published_at: optional(map, ATTR_PUBLISHED_AT, string_attr)?.unwrap_or_default(),
        })
    }

    fn to_attr(&self) -> AttributeValue {
        let mut map = HashMap::with_capacity(5);
        map.insert(ATTR_TEXT.into(), AttributeValue::S(self.text.clone()));
        map.insert(ATTR_DESCRIPTION.into(), AttributeValue::S(self.description.clone()));
        map.insert(ATTR_URL.into(), AttributeValue::S(self.url.clone()));
        map.insert(ATTR_SOURCE.into(), AttributeValue::S(self.source.clone()));
        map.insert(ATTR_PUBLISHED_AT.into(), AttributeValue::S(self.published_at.clone()));
        AttributeValue::M(map)
    }
}

type Extract<T> = fn(&str, &AttributeValue) -> Result<T, ProjectionError>;

fn required<T>(item: &Item, attr: &str, extract: Extract<T>) -> Result<T, ProjectionError> {
    optional(item, attr, extract)?.ok_or_else(|| ProjectionError::Missing(attr.to_string()))
}

fn optional<T>(item: &Item, attr: &str, extract: Extract<T>) -> Result<Option<T>, ProjectionError> {
    match item.get(attr) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(value) => extract(attr, value).map(Some),
    }
}

pub(crate) fn string_attr(attr: &str, value: &AttributeValue) -> Result<String, ProjectionError> {
    value
        .as_s()
        .cloned()
        .map_err(|_| ProjectionError::WrongType {
            attr: attr.to_string(),
            expected: "S",
        })
}

pub(crate) fn number_attr(attr: &str, value: &AttributeValue) -> Result<i64, ProjectionError> {
    let raw = value.as_n().map_err(|_| ProjectionError::WrongType {
        attr: attr.to_string(),
        expected: "N",
    })?;
    raw.parse::<i64>().map_err(|_| ProjectionError::BadNumber {
        attr: attr.to_string(),
        value: raw.clone(),
    })
}

/// Key attributes of a record as `(category, timestamp)`.
pub(crate) fn key_of(item: &Item) -> Result<(String, i64), ProjectionError> {
    Ok((
        required(item, ATTR_CATEGORY, string_attr)?,
        required(item, ATTR_TIMESTAMP, number_attr)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewsItem {
        NewsItem {
            category: "technology".into(),
            timestamp: 1_700_000_000_000,
            news_id: "n-1".into(),
            title: "Chips".into(),
            points: vec![NewsPoint {
                text: "Fab opens".into(),
                description: "A new fab opened.".into(),
                url: "https://example.com/fab".into(),
                source: "Wire".into(),
                published_at: "2024-01-01T00:00:00Z".into(),
            }],
            fetched_at: 1_700_000_000_500,
            ttl: 1_700_600_000,
        }
    }

    #[test]
    fn stored_record_maps_back_to_the_same_item() {
        let item = sample();
        assert_eq!(NewsItem::from_item(&item.to_item()).unwrap(), item);
    }

    #[test]
    fn optional_attributes_default_when_absent() {
        let mut raw = Item::new();
        raw.insert(ATTR_CATEGORY.into(), AttributeValue::S("ai".into()));
        raw.insert(ATTR_TIMESTAMP.into(), AttributeValue::N("7".into()));

        let item = NewsItem::from_item(&raw).unwrap();
        assert_eq!(item.category, "ai");
        assert_eq!(item.timestamp, 7);
        assert!(item.points.is_empty());
        assert_eq!(item.ttl, 0);
    }

    #[test]
    fn missing_sort_key_is_an_error() {
        let mut raw = Item::new();
        raw.insert(ATTR_CATEGORY.into(), AttributeValue::S("ai".into()));
        assert_eq!(
            NewsItem::from_item(&raw),
            Err(ProjectionError::Missing(ATTR_TIMESTAMP.into()))
        );
    }

    #[test]
    fn wrong_types_are_rejected() {
        let mut raw = sample().to_item();
        raw.insert(ATTR_TITLE.into(), AttributeValue::N("1".into()));
        assert!(matches!(
            NewsItem::from_item(&raw),
            Err(ProjectionError::WrongType { .. })
        ));

        let mut raw = sample().to_item();
        raw.insert(ATTR_POINTS.into(), AttributeValue::L(vec![AttributeValue::S("x".into())]));
        assert!(NewsItem::from_item(&raw).is_err());

        let mut raw = sample().to_item();
        raw.insert(ATTR_TTL.into(), AttributeValue::N("1.5e3x".into()));
        assert!(matches!(
            NewsItem::from_item(&raw),
            Err(ProjectionError::BadNumber { .. })
        ));
    }

    #[test]
    fn json_uses_camel_case_field_names() {
        let v = serde_json::to_value(sample()).unwrap();
        assert!(v.get("newsId").is_some());
        assert!(v.get("fetchedAt").is_some());
        assert!(v["points"][0].get("publishedAt").is_some());
    }
}
