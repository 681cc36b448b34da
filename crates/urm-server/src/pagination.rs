//! Limit/offset pagination with absolute `next` / `previous` links.

use axum::Json;
use axum::extract::{FromRequestParts, OriginalUri, Query};
use axum::http::header::HOST;
use axum::http::request::Parts;
use serde::Deserialize;
use urm_core::error::UrmError;
use urm_core::repository::{PaginatedResult, Pagination};

use crate::envelope::PageEnvelope;
use crate::error::ApiError;

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 1000;
/// Largest offset the database accepts as a `START` value.
const MAX_OFFSET: u64 = i64::MAX as u64;
const LIMIT_PARAM: &str = "limit";
const OFFSET_PARAM: &str = "offset";

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    limit: Option<u64>,
    offset: Option<u64>,
}

/// Pagination parameters of a list request, plus what is needed to
/// build links to neighbouring pages.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub pagination: Pagination,
    /// `scheme://host/path` of the request.
    base: String,
    query: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for PageRequest {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());

        let Query(params) = Query::<PageParams>::try_from_uri(&uri)
            .map_err(|e| UrmError::validation("limit offset", e.body_text()))?;

        let limit = match params.limit {
            Some(0) | None => DEFAULT_LIMIT,
            Some(limit) => limit.min(MAX_LIMIT),
        };
        let pagination = Pagination {
            offset: params.offset.unwrap_or(0).min(MAX_OFFSET),
            limit,
        };

        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("http");
        let host = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| uri.authority().map(|a| a.to_string()))
            .unwrap_or_else(|| "localhost".into());

        Ok(Self {
            pagination,
            base: format!("{scheme}://{host}{}", uri.path()),
            query: uri.query().map(str::to_string),
        })
    }
}

impl PageRequest {
    pub fn new(pagination: Pagination, base: impl Into<String>, query: Option<String>) -> Self {
        Self {
            pagination,
            base: base.into(),
            query,
        }
    }

    /// Wrap a page of results in the list envelope.
    pub fn respond<T>(&self, page: PaginatedResult<T>) -> Json<PageEnvelope<T>> {
        Json(PageEnvelope {
            is_success: true,
            limit: page.limit,
            offset: page.offset,
            count: page.total,
            next: self.next_link(page.total),
            previous: self.previous_link(),
            data: page.items,
        })
    }

    fn next_link(&self, count: u64) -> Option<String> {
        let Pagination { offset, limit } = self.pagination;
        let next_offset = offset.saturating_add(limit);
        if next_offset >= count {
            return None;
        }
        Some(self.link(&[
            (LIMIT_PARAM, Some(limit)),
            (OFFSET_PARAM, Some(next_offset)),
        ]))
    }

    fn previous_link(&self) -> Option<String> {
        let Pagination { offset, limit } = self.pagination;
        if offset == 0 {
            return None;
        }
        let previous_offset = offset.saturating_sub(limit);
        let offset_param = (previous_offset > 0).then_some(previous_offset);
        Some(self.link(&[(LIMIT_PARAM, Some(limit)), (OFFSET_PARAM, offset_param)]))
    }

    /// The request URL with each of `params` replaced, or removed when
    /// its value is `None`.
    fn link(&self, params: &[(&str, Option<u64>)]) -> String {
        let mut pairs: Vec<String> = self
            .query
            .as_deref()
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter(|pair| {
                let key = pair.split_once('=').map_or(*pair, |(k, _)| k);
                !params.iter().any(|(name, _)| *name == key)
            })
            .map(str::to_string)
            .collect();
        for (name, value) in params {
            if let Some(value) = value {
                pairs.push(format!("{name}={value}"));
            }
        }

        if pairs.is_empty() {
            self.base.clone()
        } else {
            format!("{}?{}", self.base, pairs.join("&"))
        }
    }
}
