use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{music_track, music_track_like};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, OptionalAuthUser};
use crate::extractors::json::AppJson;
use crate::models::music::*;
use crate::models::shared::{LikeResponse, Pagination};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/search",
    tag = "Music",
    operation_id = "searchMusic",
    summary = "Search the external music service",
    description = "Proxies the external search API and marks which hits are \
        already imported into the local catalog.",
    params(MusicSearchQuery),
    responses(
        (status = 200, description = "Search results", body = Vec<MusicSearchItem>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn search_music(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<MusicSearchQuery>,
) -> Result<Json<Vec<MusicSearchItem>>, AppError> {
    validate_search_query(&query)?;
    let limit = query.limit.unwrap_or(20).clamp(1, 50);

    let hits = state
        .music
        .search(query.q.trim(), limit)
        .await
        .map_err(|e| AppError::Internal(format!("Music search failed: {e}")))?;

    let source_ids: Vec<String> = hits.iter().map(|t| t.source_id.clone()).collect();
    let imported: HashSet<String> = music_track::Entity::find()
        .filter(music_track::Column::SourceId.is_in(source_ids))
        .select_only()
        .column(music_track::Column::SourceId)
        .into_tuple::<String>()
        .all(&state.db)
        .await?
        .into_iter()
        .collect();

    let items = hits
        .into_iter()
        .map(|track| {
            let is_imported = imported.contains(&track.source_id);
            MusicSearchItem {
                track,
                imported: is_imported,
            }
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/tracks",
    tag = "Music",
    operation_id = "importTrack",
    summary = "Import a track from the external service",
    description = "Fetches metadata by source id and stores it. The source \
        id is the dedup key: importing an already-imported track returns the \
        existing row instead of duplicating it.",
    request_body = ImportTrackRequest,
    responses(
        (status = 200, description = "Track was already imported", body = TrackResponse),
        (status = 201, description = "Track imported", body = TrackResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Track not found at the service (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(source_id = %payload.source_id))]
pub async fn import_track(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ImportTrackRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_import_track(&payload)?;
    let source_id = payload.source_id.trim();

    if let Some(existing) = music_track::Entity::find()
        .filter(music_track::Column::SourceId.eq(source_id))
        .one(&state.db)
        .await?
    {
        return Ok((
            StatusCode::OK,
            Json(TrackResponse::from_model(existing, None)),
        ));
    }

    let remote = state
        .music
        .resolve(source_id)
        .await
        .map_err(|e| AppError::Internal(format!("Music lookup failed: {e}")))?
        .ok_or_else(|| AppError::NotFound("Track not found at the music service".into()))?;

    let model = music_track::ActiveModel {
        source_id: Set(remote.source_id.clone()),
        title: Set(remote.title),
        artist: Set(remote.artist),
        artwork_url: Set(remote.artwork_url),
        permalink_url: Set(remote.permalink_url),
        duration_ms: Set(remote.duration_ms),
        likes_count: Set(0),
        playback_count: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    // Concurrent imports of the same source id collapse onto one row.
    music_track::Entity::insert(model)
        .on_conflict(
            OnConflict::column(music_track::Column::SourceId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await
        .or_else(|e| match e {
            DbErr::RecordNotInserted => Ok(0),
            other => Err(other),
        })?;

    let saved = music_track::Entity::find()
        .filter(music_track::Column::SourceId.eq(remote.source_id.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Internal("Track missing after import".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(TrackResponse::from_model(saved, None)),
    ))
}

#[utoipa::path(
    get,
    path = "/tracks",
    tag = "Music",
    operation_id = "listTracks",
    summary = "The imported track catalog",
    description = "`sort=newest` orders by import time, `sort=popular` by the \
        denormalized like counter. With a bearer token, items carry \
        `liked_by_viewer`.",
    params(TrackListQuery),
    responses(
        (status = 200, description = "Page of tracks", body = TrackListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, query))]
pub async fn list_tracks(
    viewer: OptionalAuthUser,
    State(state): State<AppState>,
    Query(query): Query<TrackListQuery>,
) -> Result<Json<TrackListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let base = music_track::Entity::find();
    let total = base.clone().paginate(&state.db, per_page).num_items().await?;

    let select = match query.sort.as_deref().unwrap_or("newest") {
        "newest" => base
            .order_by_desc(music_track::Column::CreatedAt)
            .order_by_desc(music_track::Column::Id),
        "popular" => base
            .order_by_desc(music_track::Column::LikesCount)
            .order_by_desc(music_track::Column::Id),
        _ => {
            return Err(AppError::Validation(
                "sort must be one of: newest, popular".into(),
            ));
        }
    };

    let rows = select
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    // Viewer state in one membership query over this page's ids.
    let viewer_likes: Option<HashSet<i32>> = match viewer.0.as_ref() {
        Some(v) => {
            let ids: Vec<i32> = rows.iter().map(|t| t.id).collect();
            Some(
                music_track_like::Entity::find()
                    .filter(music_track_like::Column::UserId.eq(v.user_id))
                    .filter(music_track_like::Column::TrackId.is_in(ids))
                    .select_only()
                    .column(music_track_like::Column::TrackId)
                    .into_tuple::<i32>()
                    .all(&state.db)
                    .await?
                    .into_iter()
                    .collect(),
            )
        }
        None => None,
    };

    let data = rows
        .into_iter()
        .map(|t| {
            let liked = viewer_likes.as_ref().map(|set| set.contains(&t.id));
            TrackResponse::from_model(t, liked)
        })
        .collect();

    Ok(Json(TrackListResponse {
        data,
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
    path = "/tracks/{id}/like",
    tag = "Music",
    operation_id = "toggleTrackLike",
    summary = "Toggle the caller's like on a track",
    description = "The ledger row and the denormalized `likes_count` change \
        in the same transaction, so the counter cannot drift from the ledger.",
    params(("id" = i32, Path, description = "Track ID")),
    responses(
        (status = 200, description = "New like state", body = LikeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Track not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn toggle_track_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LikeResponse>, AppError> {
    find_track(&state.db, id).await?;

    let txn = state.db.begin().await?;

    let existing = music_track_like::Entity::find()
        .filter(music_track_like::Column::UserId.eq(auth_user.user_id))
        .filter(music_track_like::Column::TrackId.eq(id))
        .one(&txn)
        .await?;

    let liked = match existing {
        Some(row) => {
            music_track_like::Entity::delete_by_id(row.id).exec(&txn).await?;
            music_track::Entity::update_many()
                .filter(music_track::Column::Id.eq(id))
                .col_expr(
                    music_track::Column::LikesCount,
                    Expr::cust("GREATEST(likes_count - 1, 0)"),
                )
                .exec(&txn)
                .await?;
            txn.commit().await?;
            false
        }
        None => {
            let insert = music_track_like::ActiveModel {
                user_id: Set(auth_user.user_id),
                track_id: Set(id),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await;
            match insert {
                Ok(_) => {
                    music_track::Entity::update_many()
                        .filter(music_track::Column::Id.eq(id))
                        .col_expr(
                            music_track::Column::LikesCount,
                            Expr::col(music_track::Column::LikesCount).add(1),
                        )
                        .exec(&txn)
                        .await?;
                    txn.commit().await?;
                    true
                }
                // Lost a race against our own double-click: the other request
                // already inserted the row and bumped the counter. Abandon
                // this transaction; the state is already what we wanted.
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    txn.rollback().await?;
                    true
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    let track = find_track(&state.db, id).await?;
    Ok(Json(LikeResponse {
        liked,
        like_count: std::cmp::Ord::max(track.likes_count, 0) as u64,
    }))
}

#[utoipa::path(
    post,
    path = "/tracks/{id}/play",
    tag = "Music",
    operation_id = "registerPlayback",
    summary = "Count one playback of a track",
    params(("id" = i32, Path, description = "Track ID")),
    responses(
        (status = 200, description = "Updated playback count", body = PlaybackResponse),
        (status = 404, description = "Track not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn register_playback(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PlaybackResponse>, AppError> {
    find_track(&state.db, id).await?;

    music_track::Entity::update_many()
        .filter(music_track::Column::Id.eq(id))
        .col_expr(
            music_track::Column::PlaybackCount,
            Expr::col(music_track::Column::PlaybackCount).add(1),
        )
        .exec(&state.db)
        .await?;

    let track = find_track(&state.db, id).await?;
    Ok(Json(PlaybackResponse {
        playback_count: track.playback_count,
    }))
}

async fn find_track<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<music_track::Model, AppError> {
    music_track::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Track not found".into()))
}
