use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics::{counter, histogram};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::NewsError;
use crate::models::NewsItem;
use crate::projector;
use crate::query::{self, PageLimits};
use crate::store::NewsStore;

/// Categories offered to clients. These are stored partition keys, so the
/// spellings must match what the ingest job writes.
pub const CATEGORIES: [&str; 15] = [
    "technology",
    "business",
    "health",
    "science",
    "sports",
    "entertainment",
    "politics",
    "world",
    "ai",
    "hollyood",
    "defence",
    "automobile",
    "space",
    "economy",
    "bollywood",
];

/// Shared, read-only per-process state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NewsStore>,
    pub limits: PageLimits,
}

impl AppState {
    pub fn new(store: Arc<dyn NewsStore>, limits: PageLimits) -> Self {
        Self { store, limits }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(home))
        .route("/categories", get(categories))
        .route("/news/{category}", get(news_by_category))
        .layer(middleware::from_fn(answer_options))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any OPTIONS request that is not a CORS preflight (those are answered by
/// the CORS layer) gets an empty 204.
async fn answer_options(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    next.run(req).await
}

#[derive(Serialize)]
struct HomeResp {
    message: &'static str,
}

async fn home() -> Json<HomeResp> {
    counter!("news_requests_total", "route" => "home").increment(1);
    Json(HomeResp {
        message: "Hello from home route",
    })
}

#[derive(Serialize)]
struct CategoriesResp {
    categories: &'static [&'static str],
}

async fn categories() -> Json<CategoriesResp> {
    counter!("news_requests_total", "route" => "categories").increment(1);
    Json(CategoriesResp {
        categories: &CATEGORIES,
    })
}

// Raw pairs rather than a typed struct: a bad or repeated `limit` must fall
// back to the default instead of failing extraction. First value wins.
#[derive(Debug, Default)]
struct NewsParams {
    limit: Option<String>,
    cursor: Option<String>,
}

impl NewsParams {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "limit" => &mut params.limit,
                "cursor" => &mut params.cursor,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

#[derive(Debug, Serialize)]
pub struct NewsPage {
    pub category: String,
    pub news: Vec<NewsItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

async fn news_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<NewsPage>, NewsError> {
    counter!("news_requests_total", "route" => "news").increment(1);
    let params = NewsParams::from_pairs(pairs);

    let limit = state.limits.parse_limit(params.limit.as_deref());
    let cursor = query::decode_cursor(params.cursor.as_deref())?;
    let range = query::build(&category, limit, cursor)?;

    let page = state.store.query(&range).await?;
    let (news, next_cursor) = projector::project(page)?;

    histogram!("news_page_items").record(news.len() as f64);
    info!(
        %category,
        limit,
        items = news.len(),
        more = next_cursor.is_some(),
        store = state.store.name(),
        "served news page"
    );

    Ok(Json(NewsPage {
        category,
        news,
        next_cursor,
    }))
}
