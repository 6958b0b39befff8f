//! Data contracts returned by the fetch layer.
//!
//! # Design
//! The wire format is camelCase JSON throughout. Rendering code consumes
//! these types and nothing else; `content` is raw markdown and is never
//! interpreted here. Beyond JSON decoding no shape validation happens, so a
//! contract violation surfaces as a decode error or as missing optional data.

use serde::{Deserialize, Serialize};
use url::Url;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

/// A single blog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub slug: String,
    pub status: PostStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PostMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
}

/// Borrowed view of a post's cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef<'a> {
    pub url: &'a str,
    /// Alt text, empty when the server sent none.
    pub alt: &'a str,
}

impl Post {
    /// The cover image, if the post has one.
    pub fn image(&self) -> Option<ImageRef<'_>> {
        self.image_url.as_deref().map(|url| ImageRef {
            url,
            alt: self.image_alt.as_deref().unwrap_or(""),
        })
    }

    /// Path a "navigate to post" interaction points at. The slug is
    /// percent-encoded the same way `BlogClient` encodes request paths.
    pub fn path(&self) -> String {
        let Ok(mut url) = Url::parse("http://localhost/blog") else {
            return format!("/blog/{}", self.slug);
        };
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&self.slug);
        }
        url.path().to_string()
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

/// Author-facing metadata. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Estimated reading time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Search/social overrides for a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
}

/// Presentation hints. Values are opaque strings (CSS colors, font stacks,
/// lengths) handed to the renderer untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Theme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<ThemeColors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts: Option<ThemeFonts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<ThemeSpacing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub text: String,
    pub background: String,
    pub accent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeFonts {
    pub primary: String,
    pub secondary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeSpacing {
    pub small: String,
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Grid,
    List,
}

/// The project a post list belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ProjectSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts_per_page: Option<u32>,
}

/// Page position within a post list.
///
/// `has_next_page` and `has_previous_page` are always derived from the page
/// counters, so a decoded value is consistent even if the server's flags are
/// missing or wrong.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "PaginationWire")]
pub struct Pagination {
    current_page: u32,
    total_pages: u32,
    total_posts: u32,
    has_next_page: bool,
    has_previous_page: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaginationWire {
    current_page: u32,
    total_pages: u32,
    #[serde(default)]
    total_posts: u32,
}

impl From<PaginationWire> for Pagination {
    fn from(wire: PaginationWire) -> Self {
        Pagination::new(wire.current_page, wire.total_pages, wire.total_posts)
    }
}

impl Pagination {
    pub fn new(current_page: u32, total_pages: u32, total_posts: u32) -> Self {
        Self {
            current_page,
            total_pages,
            total_posts,
            has_next_page: current_page < total_pages,
            has_previous_page: current_page > 1,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_posts(&self) -> u32 {
        self.total_posts
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn has_previous_page(&self) -> bool {
        self.has_previous_page
    }
}

/// A project descriptor plus one page of its posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostList {
    pub project: Project,
    #[serde(rename = "blogs")]
    pub posts: Vec<Post>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl PostList {
    /// Find a post by id, falling back to slug.
    pub fn find(&self, id_or_slug: &str) -> Option<&Post> {
        self.posts
            .iter()
            .find(|p| p.id == id_or_slug)
            .or_else(|| self.posts.iter().find(|p| p.slug == id_or_slug))
    }
}
