// src/error.rs
//! Request-level error taxonomy and its HTTP mapping.
//!
//! Clients only ever see a fixed message per kind; the detail goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::Serialize;
use tracing::{error, warn};

use crate::cursor::CursorError;
use crate::models::ProjectionError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    QueryFailed(#[from] StoreError),
    #[error("projection failed: {0}")]
    ProjectionFailed(#[from] ProjectionError),
}

impl From<CursorError> for NewsError {
    fn from(err: CursorError) -> Self {
        Self::InvalidCursor(err.to_string())
    }
}

impl NewsError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCursor(_) => "invalid_cursor",
            Self::QueryFailed(_) => "query_failed",
            Self::ProjectionFailed(_) => "projection_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCursor(_) => StatusCode::BAD_REQUEST,
            Self::QueryFailed(_) | Self::ProjectionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidCursor(_) => "Invalid pagination token",
            Self::QueryFailed(_) => "Failed to fetch news",
            Self::ProjectionFailed(_) => "Failed to process news data",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for NewsError {
    fn into_response(self) -> Response {
        match &self {
            Self::InvalidCursor(detail) => warn!(kind = self.kind(), %detail, "rejected request"),
            _ => error!(kind = self.kind(), error = %self, "news request failed"),
        }
        counter!("news_errors_total", "kind" => self.kind()).increment(1);

        (
            self.status(),
            Json(ErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
