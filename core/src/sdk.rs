//! The `Plumifly` facade: one instance store plus one transport.
//!
//! # Design
//! Every fetch reads a single instance snapshot, builds the request with
//! `BlogClient`, runs it through the transport and parses the result. A
//! request failure (`API_ERROR_*` or `NETWORK_ERROR`) is handed to the
//! configured `on_error` hook exactly once before it is returned. There are no
//! retries and no caching; each call is one round-trip.

use std::sync::Arc;
use std::time::Duration;

use crate::client::{BlogClient, GetPostOptions, ListFilter};
use crate::config::{ConfigUpdate, Instance, InstanceStore, PlumiflyConfig};
use crate::error::{PlumiflyError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Post, PostList};

/// Per-call transport options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Upper bound for the whole round-trip. `None` uses the transport's
    /// default behavior.
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Blog API client with an explicit configuration lifecycle.
///
/// Construct one per application and share it (for example behind an `Arc`);
/// `initialize` must be called once before any fetch.
pub struct Plumifly {
    store: InstanceStore,
    transport: Box<dyn Transport>,
}

impl Plumifly {
    pub fn new() -> Self {
        Self::with_transport(UreqTransport::new())
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            store: InstanceStore::new(),
            transport: Box::new(transport),
        }
    }

    pub fn initialize(&self, config: PlumiflyConfig) -> Result<Arc<Instance>> {
        self.store.initialize(config)
    }

    pub fn instance(&self) -> Result<Arc<Instance>> {
        self.store.instance()
    }

    pub fn update_config(&self, update: ConfigUpdate) -> Result<Arc<Instance>> {
        self.store.update_config(update)
    }

    /// Fetch one page of posts together with the project descriptor.
    pub fn list_posts(&self, filter: &ListFilter, options: &FetchOptions) -> Result<PostList> {
        let instance = self.store.instance()?;
        let client = BlogClient::new(&instance);
        let request = client.build_list_posts(filter);
        self.send(&request, options)
            .and_then(|response| client.parse_list_posts(response))
            .inspect_err(|err| notify(&instance, err))
    }

    /// Fetch one post by id or slug. With `preview`, drafts are returned too.
    pub fn get_post(
        &self,
        id_or_slug: &str,
        post_options: &GetPostOptions,
        options: &FetchOptions,
    ) -> Result<Post> {
        let instance = self.store.instance()?;
        let client = BlogClient::new(&instance);
        let request = client.build_get_post(id_or_slug, post_options)?;
        self.send(&request, options)
            .and_then(|response| client.parse_get_post(response))
            .inspect_err(|err| notify(&instance, err))
    }

    /// Hand `post.path()` to the `on_navigate` hook. Returns `false` when no
    /// hook is configured; navigation itself is up to the host.
    pub fn navigate_to_post(&self, post: &Post) -> Result<bool> {
        let instance = self.store.instance()?;
        match &instance.callbacks().on_navigate {
            Some(hook) => {
                hook(post.path().as_str());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn send(&self, request: &HttpRequest, options: &FetchOptions) -> Result<HttpResponse> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self
            .transport
            .execute(request, options.timeout)
            .map_err(PlumiflyError::network)?;
        tracing::debug!(status = response.status, url = %request.url, "received response");
        Ok(response)
    }
}

impl Default for Plumifly {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Plumifly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plumifly")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Log a request failure and pass it to the error hook, if any.
fn notify(instance: &Instance, err: &PlumiflyError) {
    if !err.code().is_request_failure() {
        return;
    }
    tracing::warn!(code = %err.code(), status = ?err.status(), "request failed: {}", err.message());
    if let Some(hook) = &instance.callbacks().on_error {
        hook(err);
    }
}
