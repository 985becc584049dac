use axum::Json;
use axum::extract::{Path, Query, State};
use common::ModerationStatus;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{post, role, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::post::build_post_views;
use crate::models::post::{ModerateRequest, PostListResponse, PostResponse};
use crate::models::shared::{PageQuery, Pagination, escape_like};
use crate::models::user::{
    AdminUserListItem, AdminUserListQuery, AdminUserListResponse, SetRoleRequest,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/posts",
    tag = "Admin",
    operation_id = "listPendingPosts",
    summary = "The moderation queue, oldest first",
    description = "Requires `post:moderate`. Only `Pending` posts appear; \
        approving or rejecting removes a post from this queue.",
    params(PageQuery),
    responses(
        (status = 200, description = "Pending posts", body = PostListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_pending_posts(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    auth_user.require_permission("post:moderate")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let base = post::Entity::find().filter(post::Column::Status.eq(ModerationStatus::Pending));
    let total = base.clone().paginate(&state.db, per_page).num_items().await?;

    let rows = base
        .order_by_asc(post::Column::CreatedAt)
        .order_by_asc(post::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let items = build_post_views(&state.db, rows, Some(auth_user.user_id)).await?;

    Ok(Json(PostListResponse {
        data: items,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    }))
}

#[utoipa::path(
    post,
    path = "/posts/{id}/moderate",
    tag = "Admin",
    operation_id = "moderatePost",
    summary = "Approve or reject a pending post",
    description = "Requires `post:moderate`. Approval publishes the post; \
        rejection is a soft-hide — the post is kept with `Rejected` status \
        and stays visible to its author only. Posts that have already been \
        decided are rejected with CONFLICT.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = ModerateRequest,
    responses(
        (status = 200, description = "Post moderated", body = PostResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Post already moderated (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn moderate_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ModerateRequest>,
) -> Result<Json<PostResponse>, AppError> {
    auth_user.require_permission("post:moderate")?;

    let new_status = match payload.action.as_str() {
        "approve" => ModerationStatus::Approved,
        "reject" => ModerationStatus::Rejected,
        _ => {
            return Err(AppError::Validation(
                "action must be one of: approve, reject".into(),
            ));
        }
    };

    let existing = crate::handlers::post::find_post(&state.db, id).await?;
    if existing.status != ModerationStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Post is already {}",
            existing.status
        )));
    }

    let mut active: post::ActiveModel = existing.into();
    active.status = Set(new_status);
    let model = active.update(&state.db).await?;

    let view = build_post_views(&state.db, vec![model], Some(auth_user.user_id))
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Post view missing".into()))?;

    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Admin",
    operation_id = "listUsers",
    summary = "List accounts with optional username search",
    description = "Requires `user:manage`.",
    params(AdminUserListQuery),
    responses(
        (status = 200, description = "Page of users", body = AdminUserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AdminUserListQuery>,
) -> Result<Json<AdminUserListResponse>, AppError> {
    auth_user.require_permission("user:manage")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = user::Entity::find();
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select.clone().paginate(&state.db, per_page).num_items().await?;

    let rows = select
        .order_by_asc(user::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(AdminUserListResponse {
        data: rows.into_iter().map(AdminUserListItem::from).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    }))
}

#[utoipa::path(
    patch,
    path = "/users/{id}/role",
    tag = "Admin",
    operation_id = "setUserRole",
    summary = "Assign a role to a user",
    description = "Requires `user:manage`. This is the provisioning path for \
        admin accounts — authorization everywhere else derives from the role, \
        never from a special user id.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = AdminUserListItem),
        (status = 400, description = "Unknown role (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn set_user_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SetRoleRequest>,
) -> Result<Json<AdminUserListItem>, AppError> {
    auth_user.require_permission("user:manage")?;

    role::Entity::find_by_id(payload.role.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Unknown role '{}'", payload.role)))?;

    let existing = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut active: user::ActiveModel = existing.into();
    active.role = Set(payload.role);
    let model = active.update(&state.db).await?;

    Ok(Json(AdminUserListItem::from(model)))
}
