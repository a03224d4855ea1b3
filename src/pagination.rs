//! Page-number pagination for list endpoints.
//!
//! Query parameters `page` (1-based, default 1) and `page_size` (default 5,
//! capped at 20) select a window; the envelope carries `next`/`previous`
//! links rebuilt from the endpoint path. Requesting a page past the end is a
//! 404, matching the rest of the not-found taxonomy.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

pub const DEFAULT_PAGE_SIZE: u64 = 5;
pub const MAX_PAGE_SIZE: u64 = 20;

/// Pagination query parameters shared by every list endpoint.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Items per page (default 5, max 20)
    pub page_size: Option<u64>,
}

/// Pagination envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Slice `items` according to `query`, building sibling-page links against
/// `path`.
pub fn paginate<T>(items: Vec<T>, query: &PageQuery, path: &str) -> Result<Page<T>, ApiError> {
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::not_found("invalid page"));
    }

    let total = items.len() as u64;
    // An empty collection still has a valid first page.
    let page_count = total.div_ceil(page_size).max(1);
    if page > page_count {
        return Err(ApiError::not_found("invalid page"));
    }

    let start = ((page - 1) * page_size) as usize;
    let results: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    let link = |p: u64| format!("{path}?page={p}&page_size={page_size}");
    Ok(Page {
        results,
        next: (page < page_count).then(|| link(page + 1)),
        previous: (page > 1).then(|| link(page - 1)),
    })
}
