//! Stateless request builder and response parser for the blog API.
//!
//! # Design
//! `BlogClient` is built from an `Instance` snapshot and holds only the base
//! URL and API key. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`, so request shaping and failure classification are pure
//! functions. `Plumifly` wires the two halves to a `Transport`.

use std::num::NonZeroU32;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Instance;
use crate::error::{ErrorCode, PlumiflyError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, API_KEY_HEADER};
use crate::types::{Post, PostList, PostStatus};

/// Query filter for `list_posts`. Only the fields that are set are sent; the
/// server applies its own defaults for the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub page: Option<NonZeroU32>,
    pub limit: Option<NonZeroU32>,
    pub status: Option<PostStatus>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: NonZeroU32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: NonZeroU32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Options for `get_post`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetPostOptions {
    /// Ask the server for unpublished drafts as well.
    pub preview: bool,
}

/// Request builder and response parser for the blog API.
#[derive(Clone)]
pub struct BlogClient {
    base_url: Url,
    api_key: String,
}

impl BlogClient {
    pub fn new(instance: &Instance) -> Self {
        Self {
            base_url: instance.base_url().clone(),
            api_key: instance.api_key().to_string(),
        }
    }

    /// `GET {base}/blogs` with `page`, `limit` and `status` in that order,
    /// each only when set.
    pub fn build_list_posts(&self, filter: &ListFilter) -> HttpRequest {
        let mut url = self.endpoint(&["blogs"]);
        {
            let mut query = url.query_pairs_mut();
            if let Some(page) = filter.page {
                query.append_pair("page", &page.to_string());
            }
            if let Some(limit) = filter.limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(status) = filter.status {
                query.append_pair("status", status.as_str());
            }
        }
        self.get(url)
    }

    /// `GET {base}/blog/{idOrSlug}`. The server decides whether the
    /// identifier is an id or a slug.
    pub fn build_get_post(&self, id_or_slug: &str, options: &GetPostOptions) -> Result<HttpRequest> {
        if id_or_slug.trim().is_empty() {
            return Err(PlumiflyError::new(
                ErrorCode::EmptyIdentifier,
                "A post id or slug is required",
            ));
        }
        // Dot segments are normalized away by URL parsing, even when
        // percent-encoded, so they cannot address a post.
        if matches!(id_or_slug, "." | "..") {
            return Err(PlumiflyError::new(
                ErrorCode::InvalidIdentifier,
                format!("{id_or_slug:?} is not a valid post id or slug"),
            ));
        }
        let mut url = self.endpoint(&["blog", id_or_slug]);
        if options.preview {
            url.query_pairs_mut().append_pair("preview", "true");
        }
        Ok(self.get(url))
    }

    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<PostList> {
        parse_json(response)
    }

    pub fn parse_get_post(&self, response: HttpResponse) -> Result<Post> {
        parse_json(response)
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, mut url: Url) -> HttpRequest {
        // An empty query_pairs_mut() leaves a bare "?" behind.
        if url.query() == Some("") {
            url.set_query(None);
        }
        HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: vec![
                (API_KEY_HEADER.to_string(), self.api_key.clone()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
        }
    }
}

impl std::fmt::Debug for BlogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlogClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Classify a response: non-2xx becomes `API_ERROR_<status>`, a 2xx body
/// that does not decode becomes `NETWORK_ERROR`.
fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    if !response.is_success() {
        let body = serde_json::from_str(&response.body)
            .unwrap_or(serde_json::Value::String(response.body));
        return Err(PlumiflyError::api(response.status, body));
    }
    serde_json::from_str(&response.body).map_err(PlumiflyError::network)
}
