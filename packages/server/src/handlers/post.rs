use std::collections::{HashMap, HashSet};

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::ModerationStatus;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{comment, post, post_like, post_media, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, OptionalAuthUser};
use crate::extractors::json::AppJson;
use crate::models::post::*;
use crate::models::shared::LikeResponse;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Posts",
    operation_id = "createPost",
    summary = "Create a new post",
    description = "Creates a post in `Pending` status; it enters the public \
        feed only after a moderator approves it.",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_post(&payload)?;

    let now = chrono::Utc::now();
    let tags: Vec<String> = payload
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .collect();

    let txn = state.db.begin().await?;

    let new_post = post::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        content: Set(payload.content),
        tags: Set(serde_json::json!(tags)),
        ethnic_group_id: Set(payload.ethnic_group_id),
        status: Set(ModerationStatus::Pending),
        author_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_post.insert(&txn).await?;

    insert_media(&txn, model.id, &payload.media).await?;

    txn.commit().await?;

    let view = build_post_views(&state.db, vec![model], Some(auth_user.user_id))
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Post view missing after insert".into()))?;

    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Posts",
    operation_id = "listPosts",
    summary = "Public feed with pagination, sorting and filters",
    description = "Returns approved posts. `sort=newest` orders by creation \
        time; `sort=popular` orders by like count. `search` narrows within \
        the already-fetched page only. With a bearer token, items carry \
        `liked_by_viewer`.",
    params(PostListQuery),
    responses(
        (status = 200, description = "Page of posts", body = PostListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, query))]
pub async fn list_posts(
    viewer: OptionalAuthUser,
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut base = post::Entity::find().filter(post::Column::Status.eq(ModerationStatus::Approved));
    if let Some(ref group) = query.ethnic_group {
        base = base.filter(post::Column::EthnicGroupId.eq(group.as_str()));
    }

    // Pagination metadata comes from a COUNT under the same filter, so it is
    // independent of the ordering strategy below.
    let total = base.clone().paginate(&state.db, per_page).num_items().await?;
    let total_pages = total.div_ceil(per_page);

    let posts = match query.sort.as_deref().unwrap_or("newest") {
        "newest" => {
            base.order_by_desc(post::Column::CreatedAt)
                .order_by_desc(post::Column::Id)
                .offset(Some((page - 1) * per_page))
                .limit(Some(per_page))
                .all(&state.db)
                .await?
        }
        "popular" => fetch_popular_page(&state.db, base, page, per_page).await?,
        _ => {
            return Err(AppError::Validation(
                "sort must be one of: newest, popular".into(),
            ));
        }
    };

    let viewer_id = viewer.0.as_ref().map(|v| v.user_id);
    let mut items = build_post_views(&state.db, posts, viewer_id).await?;

    // Page-local search: narrows within the loaded page, by design. Results
    // are bounded by page size; this is not a corpus-wide query.
    if let Some(ref search) = query.search {
        let needle = search.trim().to_lowercase();
        if !needle.is_empty() {
            items.retain(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.author.display_name.to_lowercase().contains(&needle)
                    || p.content.to_lowercase().contains(&needle)
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            });
        }
    }

    Ok(Json(PostListResponse {
        data: items,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/mine",
    tag = "Posts",
    operation_id = "listMyPosts",
    summary = "The caller's own posts, including pending and rejected",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of posts", body = PostListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_posts(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let base = post::Entity::find().filter(post::Column::AuthorId.eq(auth_user.user_id));
    let total = base.clone().paginate(&state.db, per_page).num_items().await?;
    let posts = base
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let items = build_post_views(&state.db, posts, Some(auth_user.user_id)).await?;
    let total_pages = total.div_ceil(per_page);

    Ok(Json(PostListResponse {
        data: items,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Posts",
    operation_id = "getPost",
    summary = "Get a post by ID",
    description = "Approved posts are public. Pending and rejected posts are \
        visible only to their author or a moderator; everyone else gets 404.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostResponse),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(id))]
pub async fn get_post(
    viewer: OptionalAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostResponse>, AppError> {
    let model = find_visible_post(&state.db, id, viewer.0.as_ref()).await?;
    let viewer_id = viewer.0.as_ref().map(|v| v.user_id);

    let view = build_post_views(&state.db, vec![model], viewer_id)
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Post view missing".into()))?;

    Ok(Json(view))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Posts",
    operation_id = "updatePost",
    summary = "Update a post",
    description = "Author only. PATCH semantics; `media` replaces the whole \
        media list when present. Editing does not reset moderation status.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    validate_update_post(&payload)?;

    let txn = state.db.begin().await?;

    let existing = find_post(&txn, id).await?;
    if existing.author_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    if payload == UpdatePostRequest::default() {
        drop(txn);
        let view = build_post_views(&state.db, vec![existing], Some(auth_user.user_id))
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Post view missing".into()))?;
        return Ok(Json(view));
    }

    let post_id = existing.id;
    let mut active: post::ActiveModel = existing.into();
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(ref tags) = payload.tags {
        let tags: Vec<String> = tags.iter().map(|t| t.trim().to_string()).collect();
        active.tags = Set(serde_json::json!(tags));
    }
    match payload.ethnic_group_id {
        Some(Some(group)) => active.ethnic_group_id = Set(Some(group)),
        Some(None) => active.ethnic_group_id = Set(None),
        None => {}
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;

    if let Some(ref media) = payload.media {
        post_media::Entity::delete_many()
            .filter(post_media::Column::PostId.eq(post_id))
            .exec(&txn)
            .await?;
        insert_media(&txn, post_id, media).await?;
    }

    txn.commit().await?;

    let view = build_post_views(&state.db, vec![model], Some(auth_user.user_id))
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Post view missing".into()))?;

    Ok(Json(view))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Posts",
    operation_id = "deletePost",
    summary = "Delete a post with its comments, likes and media",
    description = "Allowed for the author or a holder of `post:moderate`. \
        Child rows are removed in the same transaction as the post.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_post(&txn, id).await?;
    if existing.author_id != auth_user.user_id && !auth_user.has_permission("post:moderate") {
        return Err(AppError::PermissionDenied);
    }

    post_like::Entity::delete_many()
        .filter(post_like::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    comment::Entity::delete_many()
        .filter(comment::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    post_media::Entity::delete_many()
        .filter(post_media::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    post::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/like",
    tag = "Posts",
    operation_id = "togglePostLike",
    summary = "Toggle the caller's like on a post",
    description = "Likes an unliked post, unlikes a liked one. The returned \
        count is recomputed from the ledger, never cached.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "New like state", body = LikeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn toggle_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LikeResponse>, AppError> {
    let post = find_post(&state.db, id).await?;
    if !post.status.is_public() {
        return Err(AppError::NotFound("Post not found".into()));
    }

    let existing = post_like::Entity::find()
        .filter(post_like::Column::UserId.eq(auth_user.user_id))
        .filter(post_like::Column::PostId.eq(id))
        .one(&state.db)
        .await?;

    let liked = match existing {
        Some(row) => {
            post_like::Entity::delete_by_id(row.id).exec(&state.db).await?;
            false
        }
        None => {
            let insert = post_like::ActiveModel {
                user_id: Set(auth_user.user_id),
                post_id: Set(id),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(&state.db)
            .await;
            match insert {
                Ok(_) => true,
                // Two toggles raced; the unique (user, post) index made the
                // second insert fail. Already liked — not an error.
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => true,
                Err(e) => return Err(e.into()),
            }
        }
    };

    let like_count = post_like::Entity::find()
        .filter(post_like::Column::PostId.eq(id))
        .count(&state.db)
        .await?;

    Ok(Json(LikeResponse { liked, like_count }))
}

#[utoipa::path(
    get,
    path = "/{id}/comments",
    tag = "Comments",
    operation_id = "listComments",
    summary = "Comments on a post, oldest first",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Comments", body = Vec<CommentResponse>),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(id))]
pub async fn list_comments(
    viewer: OptionalAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    find_visible_post(&state.db, id, viewer.0.as_ref()).await?;

    let rows = comment::Entity::find()
        .filter(comment::Column::PostId.eq(id))
        .find_also_related(user::Entity)
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
        .all(&state.db)
        .await?;

    let items = rows
        .into_iter()
        .map(|(c, author)| {
            let author = author
                .map(AuthorResponse::from)
                .ok_or_else(|| AppError::Internal("Comment author not found".into()))?;
            Ok(CommentResponse::from_parts(c, author))
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/{id}/comments",
    tag = "Comments",
    operation_id = "createComment",
    summary = "Comment on a post",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn create_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_comment_content(&payload.content)?;
    find_visible_post(&state.db, id, Some(&auth_user)).await?;

    let now = chrono::Utc::now();
    let model = comment::ActiveModel {
        content: Set(payload.content.trim().to_string()),
        post_id: Set(id),
        author_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let author = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Internal("Comment author not found".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::from_parts(model, author.into())),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Comments",
    operation_id = "updateComment",
    summary = "Edit a comment",
    description = "Author only.",
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    validate_comment_content(&payload.content)?;

    let existing = find_comment(&state.db, id).await?;
    if existing.author_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let mut active: comment::ActiveModel = existing.into();
    active.content = Set(payload.content.trim().to_string());
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&state.db).await?;

    let author = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Internal("Comment author not found".into()))?;

    Ok(Json(CommentResponse::from_parts(model, author.into())))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    description = "Author only.",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_comment(&state.db, id).await?;
    if existing.author_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    comment::Entity::delete_by_id(id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Page of popular posts: an id-window over a narrow grouped query, then one
/// wide fetch re-sorted in memory to the grouped order.
///
/// The aggregate sort runs over (id, like_count) only; the wide row fetch is
/// a keyed lookup, so wide rows are never sorted. LEFT JOIN — not grouping
/// the ledger alone — so zero-like posts still page correctly after liked
/// ones.
async fn fetch_popular_page<C: ConnectionTrait>(
    db: &C,
    base: Select<post::Entity>,
    page: u64,
    per_page: u64,
) -> Result<Vec<post::Model>, AppError> {
    let id_rows: Vec<(i32, i64)> = base
        .left_join(post_like::Entity)
        .select_only()
        .column(post::Column::Id)
        .column_as(post_like::Column::Id.count(), "like_count")
        .group_by(post::Column::Id)
        .order_by(post_like::Column::Id.count(), Order::Desc)
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_tuple()
        .all(db)
        .await?;

    let page_ids: Vec<i32> = id_rows.into_iter().map(|(id, _)| id).collect();
    if page_ids.is_empty() {
        return Ok(Vec::new());
    }

    // A `WHERE id IN (...)` fetch does not preserve order; restore it.
    let mut rows = post::Entity::find()
        .filter(post::Column::Id.is_in(page_ids.clone()))
        .all(db)
        .await?;
    let order: HashMap<i32, usize> = page_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    rows.sort_by_key(|p| order.get(&p.id).copied().unwrap_or(usize::MAX));

    Ok(rows)
}

/// Decorate a page of posts with author fields, live counts, media and the
/// viewer's like state — a handful of set queries per page, never one per
/// post.
pub async fn build_post_views<C: ConnectionTrait>(
    db: &C,
    posts: Vec<post::Model>,
    viewer_id: Option<i32>,
) -> Result<Vec<PostResponse>, AppError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
    let author_ids: Vec<i32> = {
        let unique: HashSet<i32> = posts.iter().map(|p| p.author_id).collect();
        unique.into_iter().collect()
    };

    let authors: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let like_counts: HashMap<i32, i64> = post_like::Entity::find()
        .filter(post_like::Column::PostId.is_in(ids.clone()))
        .select_only()
        .column(post_like::Column::PostId)
        .column_as(post_like::Column::Id.count(), "cnt")
        .group_by(post_like::Column::PostId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let comment_counts: HashMap<i32, i64> = comment::Entity::find()
        .filter(comment::Column::PostId.is_in(ids.clone()))
        .select_only()
        .column(comment::Column::PostId)
        .column_as(comment::Column::Id.count(), "cnt")
        .group_by(comment::Column::PostId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let mut media_by_post: HashMap<i32, Vec<MediaItemResponse>> = HashMap::new();
    let media_rows = post_media::Entity::find()
        .filter(post_media::Column::PostId.is_in(ids.clone()))
        .order_by_asc(post_media::Column::PostId)
        .order_by_asc(post_media::Column::Position)
        .all(db)
        .await?;
    for m in media_rows {
        media_by_post.entry(m.post_id).or_default().push(m.into());
    }

    // Viewer state: one membership query scoped to this page's ids.
    let viewer_likes: Option<HashSet<i32>> = match viewer_id {
        Some(uid) => Some(
            post_like::Entity::find()
                .filter(post_like::Column::UserId.eq(uid))
                .filter(post_like::Column::PostId.is_in(ids))
                .select_only()
                .column(post_like::Column::PostId)
                .into_tuple::<i32>()
                .all(db)
                .await?
                .into_iter()
                .collect(),
        ),
        None => None,
    };

    posts
        .into_iter()
        .map(|p| {
            let author = authors
                .get(&p.author_id)
                .cloned()
                .ok_or_else(|| AppError::Internal("Post author not found".into()))?;
            let tags: Vec<String> = serde_json::from_value(p.tags).unwrap_or_default();
            let ethnic_group_name = p
                .ethnic_group_id
                .as_deref()
                .and_then(catalog::find_group)
                .map(|g| g.name.to_string());
            Ok(PostResponse {
                id: p.id,
                title: p.title,
                content: p.content,
                tags,
                ethnic_group_id: p.ethnic_group_id,
                ethnic_group_name,
                status: p.status,
                author: author.into(),
                media: media_by_post.remove(&p.id).unwrap_or_default(),
                like_count: like_counts.get(&p.id).copied().unwrap_or(0) as u64,
                comment_count: comment_counts.get(&p.id).copied().unwrap_or(0) as u64,
                liked_by_viewer: viewer_likes.as_ref().map(|set| set.contains(&p.id)),
                created_at: p.created_at,
                updated_at: p.updated_at,
            })
        })
        .collect()
}

async fn insert_media<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
    media: &[MediaItem],
) -> Result<(), AppError> {
    for (i, item) in media.iter().enumerate() {
        post_media::ActiveModel {
            post_id: Set(post_id),
            position: Set(i as i32),
            url: Set(item.url.clone()),
            kind: Set(item.kind),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

pub async fn find_post<C: ConnectionTrait>(db: &C, id: i32) -> Result<post::Model, AppError> {
    post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

async fn find_comment<C: ConnectionTrait>(db: &C, id: i32) -> Result<comment::Model, AppError> {
    comment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))
}

/// Fetch a post the given viewer is allowed to see. Pending and rejected
/// posts exist only for their author and moderators; for everyone else they
/// are indistinguishable from absent.
async fn find_visible_post<C: ConnectionTrait>(
    db: &C,
    id: i32,
    viewer: Option<&AuthUser>,
) -> Result<post::Model, AppError> {
    let model = find_post(db, id).await?;
    let visible = model.status.is_public()
        || viewer.is_some_and(|v| {
            v.user_id == model.author_id || v.has_permission("post:moderate")
        });
    if !visible {
        return Err(AppError::NotFound("Post not found".into()));
    }
    Ok(model)
}
