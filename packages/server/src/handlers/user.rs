use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{
    comment, media_asset, music_track, music_track_like, post, post_like, post_media,
    quiz_attempt, support_ticket, user,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::user::{PublicUserResponse, UpdateProfileRequest, validate_update_profile};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Public profile of a user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public profile", body = PublicUserResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PublicUserResponse>, AppError> {
    let user = find_user(&state.db, id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    patch,
    path = "/me",
    tag = "Users",
    operation_id = "updateProfile",
    summary = "Update the caller's profile",
    description = "Partially updates profile fields using PATCH semantics. \
        `bio`, `region` and `avatar_url` support three-state updates: omit to \
        leave unchanged, null to clear, or a value to set.",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = PublicUserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<PublicUserResponse>, AppError> {
    validate_update_profile(&payload)?;

    let existing = find_user(&state.db, auth_user.user_id).await?;
    if payload == UpdateProfileRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: user::ActiveModel = existing.into();
    if let Some(ref name) = payload.display_name {
        active.display_name = Set(name.trim().to_string());
    }
    match payload.bio {
        Some(Some(bio)) => active.bio = Set(Some(bio.trim().to_string())),
        Some(None) => active.bio = Set(None),
        None => {}
    }
    match payload.region {
        Some(Some(region)) => active.region = Set(Some(region.trim().to_string())),
        Some(None) => active.region = Set(None),
        None => {}
    }
    match payload.avatar_url {
        Some(Some(url)) => active.avatar_url = Set(Some(url)),
        Some(None) => active.avatar_url = Set(None),
        None => {}
    }

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/me",
    tag = "Users",
    operation_id = "deleteAccount",
    summary = "Delete the caller's account and all owned content",
    description = "Removes the account together with its posts (including \
        their comments, likes and media), the user's own comments and likes \
        elsewhere, support tickets and quiz attempts — one transaction, so a \
        failure partway leaves nothing orphaned.",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = auth_user.user_id;
    let txn = state.db.begin().await?;

    find_user(&txn, user_id).await?;

    let own_post_ids: Vec<i32> = post::Entity::find()
        .filter(post::Column::AuthorId.eq(user_id))
        .select_only()
        .column(post::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;

    // Everything hanging off the user's posts, then the posts themselves.
    if !own_post_ids.is_empty() {
        post_like::Entity::delete_many()
            .filter(post_like::Column::PostId.is_in(own_post_ids.clone()))
            .exec(&txn)
            .await?;
        comment::Entity::delete_many()
            .filter(comment::Column::PostId.is_in(own_post_ids.clone()))
            .exec(&txn)
            .await?;
        post_media::Entity::delete_many()
            .filter(post_media::Column::PostId.is_in(own_post_ids.clone()))
            .exec(&txn)
            .await?;
        post::Entity::delete_many()
            .filter(post::Column::Id.is_in(own_post_ids))
            .exec(&txn)
            .await?;
    }

    // The user's own activity on other people's content.
    post_like::Entity::delete_many()
        .filter(post_like::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    comment::Entity::delete_many()
        .filter(comment::Column::AuthorId.eq(user_id))
        .exec(&txn)
        .await?;

    // Music likes mirror into the denormalized counter, so decrement the
    // affected tracks in the same transaction as the ledger delete.
    let liked_track_ids: Vec<i32> = music_track_like::Entity::find()
        .filter(music_track_like::Column::UserId.eq(user_id))
        .select_only()
        .column(music_track_like::Column::TrackId)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;
    if !liked_track_ids.is_empty() {
        music_track_like::Entity::delete_many()
            .filter(music_track_like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        music_track::Entity::update_many()
            .filter(music_track::Column::Id.is_in(liked_track_ids))
            .col_expr(
                music_track::Column::LikesCount,
                Expr::cust("GREATEST(likes_count - 1, 0)"),
            )
            .exec(&txn)
            .await?;
    }

    support_ticket::Entity::delete_many()
        .filter(support_ticket::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    quiz_attempt::Entity::delete_many()
        .filter(quiz_attempt::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    media_asset::Entity::delete_many()
        .filter(media_asset::Column::UploaderId.eq(user_id))
        .exec(&txn)
        .await?;

    user::Entity::delete_by_id(user_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
