use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::MediaKind;
use common::storage::ContentHash;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::media_asset;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::media::MediaUploadResponse;
use crate::state::AppState;

/// Body limit layer for media uploads (matches the store's own limit plus
/// multipart framing overhead).
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(96 * 1024 * 1024)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Media",
    operation_id = "uploadMedia",
    summary = "Upload an image or video",
    description = "Stores the `file` multipart field content-addressed and \
        returns the public URL to reference from posts. The media kind is \
        decided here, from the MIME type, and stored — read paths never \
        guess from extensions. Re-uploading identical bytes returns the same \
        URL.",
    request_body(content_type = "multipart/form-data", description = "File upload"),
    responses(
        (status = 201, description = "Uploaded", body = MediaUploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_media(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut declared_type: Option<String> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            declared_type = field.content_type().map(|s| s.to_string());
            file_name = field.file_name().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
            file_bytes = Some(data.to_vec());
            break;
        }
    }

    let data = file_bytes.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    if data.is_empty() {
        return Err(AppError::Validation("File must not be empty".into()));
    }

    // Prefer the declared MIME type; fall back to the filename.
    let content_type = declared_type
        .filter(|t| !t.is_empty() && t != "application/octet-stream")
        .or_else(|| {
            file_name
                .as_deref()
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|m| m.to_string())
        })
        .ok_or_else(|| AppError::Validation("Could not determine media type".into()))?;

    let kind = MediaKind::from_mime(&content_type).ok_or_else(|| {
        AppError::Validation("Only image and video uploads are accepted".into())
    })?;

    let size = data.len() as i64;
    let hash = state.media.put(&data).await?;

    let asset = media_asset::ActiveModel {
        content_hash: Set(hash.to_hex()),
        content_type: Set(content_type.clone()),
        kind: Set(kind),
        size: Set(size),
        uploader_id: Set(auth_user.user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    media_asset::Entity::insert(asset)
        .on_conflict(
            OnConflict::column(media_asset::Column::ContentHash)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await
        .or_else(|e| match e {
            DbErr::RecordNotInserted => Ok(0),
            other => Err(other),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(MediaUploadResponse {
            url: format!("/api/v1/media/{}", hash.to_hex()),
            hash: hash.to_hex(),
            kind,
            content_type,
            size,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{hash}",
    tag = "Media",
    operation_id = "serveMedia",
    summary = "Serve an uploaded blob",
    params(("hash" = String, Path, description = "Content hash from the upload response")),
    responses(
        (status = 200, description = "Blob bytes"),
        (status = 400, description = "Malformed hash (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown media (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(hash = %hash))]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Response, AppError> {
    let content_hash = ContentHash::from_hex(&hash)?;

    let asset = media_asset::Entity::find()
        .filter(media_asset::Column::ContentHash.eq(hash.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".into()))?;

    let reader = state.media.get_stream(&content_hash).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    Ok((
        [
            (header::CONTENT_TYPE, asset.content_type),
            (header::CONTENT_LENGTH, asset.size.to_string()),
        ],
        body,
    )
        .into_response())
}
