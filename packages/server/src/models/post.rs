use chrono::{DateTime, Utc};
use common::{MediaKind, ModerationStatus};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::{double_option, validate_body, validate_title};

pub use super::shared::{LikeResponse, PageQuery, Pagination};

pub const MAX_TAGS: usize = 20;
pub const MAX_MEDIA_ITEMS: usize = 10;
pub const MAX_CONTENT_BYTES: usize = 100_000;

#[derive(Deserialize, Serialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct MediaItem {
    pub url: String,
    pub kind: MediaKind,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub ethnic_group_id: Option<String>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ethnic_group_id: Option<Option<String>>,
    /// Replaces the whole media list when present.
    pub media: Option<Vec<MediaItem>>,
}

/// Post author as embedded in post and comment responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthorResponse {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<crate::entity::user::Model> for AuthorResponse {
    fn from(u: crate::entity::user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            display_name: u.display_name,
            avatar_url: u.avatar_url,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MediaItemResponse {
    pub url: String,
    pub kind: MediaKind,
    pub position: i32,
}

impl From<crate::entity::post_media::Model> for MediaItemResponse {
    fn from(m: crate::entity::post_media::Model) -> Self {
        Self {
            url: m.url,
            kind: m.kind,
            position: m.position,
        }
    }
}

/// A post is never returned bare: every read path carries the author's
/// public fields, live counts, the media list, and — when a viewer is
/// known — whether that viewer has liked it.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub ethnic_group_id: Option<String>,
    /// Resolved catalog name; `null` when the id does not resolve.
    pub ethnic_group_name: Option<String>,
    pub status: ModerationStatus,
    pub author: AuthorResponse,
    pub media: Vec<MediaItemResponse>,
    pub like_count: u64,
    pub comment_count: u64,
    /// Present only when the request carried a valid bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_by_viewer: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PostListResponse {
    pub data: Vec<PostResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct PostListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// `newest` (default) or `popular`.
    pub sort: Option<String>,
    /// Restrict to one ethnic-group slug.
    pub ethnic_group: Option<String>,
    /// Substring filter applied to the already-fetched page (title, author
    /// name, tags, content) — it narrows within a page, it does not search
    /// the whole corpus.
    pub search: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateCommentRequest {
    pub content: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub post_id: i32,
    pub content: String,
    pub author: AuthorResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn from_parts(c: crate::entity::comment::Model, author: AuthorResponse) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            content: c.content,
            author,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ModerateRequest {
    /// `approve` or `reject`.
    #[schema(example = "approve")]
    pub action: String,
}

fn validate_tags(tags: &[String]) -> Result<(), AppError> {
    if tags.len() > MAX_TAGS {
        return Err(AppError::Validation(format!("At most {MAX_TAGS} tags")));
    }
    for tag in tags {
        if tag.trim().is_empty() || tag.chars().count() > 64 {
            return Err(AppError::Validation(
                "Tags must be 1-64 characters".into(),
            ));
        }
    }
    Ok(())
}

fn validate_media(media: &[MediaItem]) -> Result<(), AppError> {
    if media.len() > MAX_MEDIA_ITEMS {
        return Err(AppError::Validation(format!(
            "At most {MAX_MEDIA_ITEMS} media items"
        )));
    }
    for item in media {
        if item.url.trim().is_empty() || item.url.len() > 2048 {
            return Err(AppError::Validation("Media URL must be 1-2048 bytes".into()));
        }
    }
    Ok(())
}

pub fn validate_create_post(req: &CreatePostRequest) -> Result<(), AppError> {
    validate_title(&req.title, "Title")?;
    validate_body(&req.content, "Content", MAX_CONTENT_BYTES)?;
    validate_tags(&req.tags)?;
    validate_media(&req.media)?;
    Ok(())
}

pub fn validate_update_post(req: &UpdatePostRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title, "Title")?;
    }
    if let Some(ref content) = req.content {
        validate_body(content, "Content", MAX_CONTENT_BYTES)?;
    }
    if let Some(ref tags) = req.tags {
        validate_tags(tags)?;
    }
    if let Some(ref media) = req.media {
        validate_media(media)?;
    }
    Ok(())
}

pub fn validate_comment_content(content: &str) -> Result<(), AppError> {
    validate_body(content, "Comment", 10_000)
}
