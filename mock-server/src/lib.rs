use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Published,
    Archived,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub slug: String,
    pub status: Status,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_posts: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostList {
    pub project: Project,
    pub blogs: Vec<Post>,
    pub pagination: Pagination,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<Status>,
}

#[derive(Deserialize)]
pub struct PostQuery {
    #[serde(default)]
    pub preview: bool,
}

pub type Db = Arc<RwLock<Vec<Post>>>;

#[derive(Clone)]
pub struct AppState {
    pub api_key: Arc<str>,
    pub project: Project,
    pub db: Db,
}

impl AppState {
    pub fn new(api_key: &str, project: Project, posts: Vec<Post>) -> Self {
        Self {
            api_key: api_key.into(),
            project,
            db: Arc::new(RwLock::new(posts)),
        }
    }

    /// A demo project with two published posts, one draft and one archived
    /// post, newest first.
    pub fn seeded(api_key: &str) -> Self {
        let project = Project {
            id: "demo-project".to_string(),
            name: "Demo Blog".to_string(),
            settings: Some(json!({ "layout": "grid", "postsPerPage": DEFAULT_LIMIT })),
        };
        let posts = vec![
            demo_post(
                "hello-world",
                "Hello, world",
                Status::Published,
                "2024-03-01T09:00:00Z",
                Some(json!({ "author": "Ada", "tags": ["intro"], "readTime": 2 })),
            ),
            demo_post(
                "second-post",
                "A second post",
                Status::Published,
                "2024-02-01T09:00:00Z",
                None,
            ),
            demo_post(
                "work-in-progress",
                "Work in progress",
                Status::Draft,
                "2024-01-15T09:00:00Z",
                None,
            ),
            demo_post(
                "old-news",
                "Old news",
                Status::Archived,
                "2023-06-01T09:00:00Z",
                None,
            ),
        ];
        Self::new(api_key, project, posts)
    }
}

fn demo_post(slug: &str, title: &str, status: Status, at: &str, metadata: Option<Value>) -> Post {
    Post {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: format!("{title} (description)"),
        content: Some(format!("# {title}\n\nBody of {slug}.")),
        slug: slug.to_string(),
        published_at: (status == Status::Published).then(|| at.to_string()),
        status,
        created_at: at.to_string(),
        updated_at: at.to_string(),
        project_id: Some("demo-project".to_string()),
        image_url: Some(format!("https://cdn.example.com/{slug}.png")),
        image_alt: Some(title.to_string()),
        metadata,
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/blogs", get(list_posts))
        .route("/blog/{id_or_slug}", get(get_post))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

type ApiError = (StatusCode, Json<Value>);

fn error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "message": message })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    if key == Some(&*state.api_key) {
        Ok(())
    } else {
        tracing::warn!("rejected request with missing or invalid API key");
        Err(error(StatusCode::UNAUTHORIZED, "Invalid API key"))
    }
}

async fn list_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<PostList>, ApiError> {
    authorize(&state, &headers)?;
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if page == 0 || limit == 0 {
        return Err(error(StatusCode::BAD_REQUEST, "page and limit must be positive"));
    }
    let status = query.status.unwrap_or(Status::Published);

    let posts = state.db.read().await;
    let matching: Vec<&Post> = posts.iter().filter(|p| p.status == status).collect();
    let total_posts = u32::try_from(matching.len()).unwrap_or(u32::MAX);
    let total_pages = total_posts.div_ceil(limit).max(1);
    // Widened and saturating so extreme page/limit values yield an empty page.
    let offset = (page as usize - 1).saturating_mul(limit as usize);
    let blogs = matching
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .cloned()
        .collect();
    tracing::info!(page, limit, ?status, total_posts, "listing posts");

    Ok(Json(PostList {
        project: state.project.clone(),
        blogs,
        pagination: Pagination {
            current_page: page,
            total_pages,
            total_posts,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        },
    }))
}

async fn get_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id_or_slug): Path<String>,
    Query(query): Query<PostQuery>,
) -> Result<Json<Post>, ApiError> {
    authorize(&state, &headers)?;
    let posts = state.db.read().await;
    let post = posts
        .iter()
        .find(|p| p.id == id_or_slug)
        .or_else(|| posts.iter().find(|p| p.slug == id_or_slug))
        .filter(|p| p.status != Status::Draft || query.preview)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "not found"))?;
    tracing::info!(slug = %post.slug, preview = query.preview, "serving post");
    Ok(Json(post.clone()))
}
