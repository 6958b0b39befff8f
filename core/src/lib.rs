//! Client runtime for the Plumifly hosted blog API.
//!
//! # Overview
//! Fetches blog posts and post lists and hands them to rendering code as
//! plain data. Rendering itself (layout, theming, markdown) lives outside this
//! crate and only consumes the types in [`types`].
//!
//! # Design
//! - `InstanceStore` holds the single active configuration (API key, base
//!   URL, hooks) with an explicit initialize / get / update lifecycle.
//! - `BlogClient` splits each operation into `build_*` (produces an
//!   `HttpRequest`) and `parse_*` (classifies an `HttpResponse`), keeping
//!   request shaping and error classification free of I/O.
//! - `Transport` executes requests; `UreqTransport` is the default.
//! - `Plumifly` ties the three together and notifies the `on_error` hook of
//!   request failures.
//!
//! ```no_run
//! use plumifly_core::{FetchOptions, GetPostOptions, ListFilter, Plumifly, PlumiflyConfig};
//!
//! # fn main() -> plumifly_core::Result<()> {
//! let sdk = Plumifly::new();
//! sdk.initialize(PlumiflyConfig::new("my-api-key"))?;
//! let list = sdk.list_posts(&ListFilter::new(), &FetchOptions::default())?;
//! if let Some(first) = list.posts.first() {
//!     let post = sdk.get_post(&first.slug, &GetPostOptions::default(), &FetchOptions::default())?;
//!     println!("{}", post.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod sdk;
pub mod transport;
pub mod types;

pub use client::{BlogClient, GetPostOptions, ListFilter};
pub use config::{Callbacks, ConfigUpdate, Instance, InstanceStore, PlumiflyConfig, DEFAULT_BASE_URL};
pub use error::{ErrorCode, ErrorContext, PlumiflyError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use sdk::{FetchOptions, Plumifly};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    ImageRef, Layout, Pagination, Post, PostList, PostMetadata, PostStatus, Project, ProjectSettings, Seo, Theme,
    ThemeColors, ThemeFonts, ThemeSpacing,
};
