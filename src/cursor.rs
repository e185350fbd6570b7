// src/cursor.rs
//! Opaque pagination tokens.
//!
//! A token is the base64 form of `{"category": .., "timestamp": ..}`, the
//! key of the last item a client has seen. Clients must treat it as opaque;
//! the JSON shape is still a compatibility contract and must not change
//! without versioning.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Key of the last item on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cursor {
    pub category: String,
    pub timestamp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("token is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("token payload does not match the cursor shape: {0}")]
    Shape(#[from] serde_json::Error),
}

impl Cursor {
    pub fn new(category: impl Into<String>, timestamp: i64) -> Self {
        Self {
            category: category.into(),
            timestamp,
        }
    }
}

/// Encode a cursor as URL-safe base64 without padding, so it can be pasted
/// into a query string as-is.
pub fn encode(cursor: &Cursor) -> String {
    // Serializing a struct of a String and an i64 cannot fail.
    let json = serde_json::to_vec(cursor).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode a token produced by [`encode`]. Padded standard base64 is also
/// accepted since earlier deployments issued tokens in that alphabet.
pub fn decode(token: &str) -> Result<Cursor, CursorError> {
    let token = token.trim();
    let bytes = match URL_SAFE_NO_PAD.decode(token) {
        Ok(bytes) => bytes,
        Err(url_err) => STANDARD.decode(token).map_err(|_| url_err)?,
    };
    Ok(serde_json::from_slice(&bytes)?)
}
