use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::Pagination;
use crate::music::RemoteTrack;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct MusicSearchQuery {
    /// Search phrase passed to the external service.
    pub q: String,
    pub limit: Option<u64>,
}

pub fn validate_search_query(query: &MusicSearchQuery) -> Result<(), AppError> {
    if query.q.trim().is_empty() || query.q.chars().count() > 256 {
        return Err(AppError::Validation(
            "Search query must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Search hit: remote metadata plus whether the track is already in the
/// local catalog.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MusicSearchItem {
    #[serde(flatten)]
    pub track: RemoteTrack,
    pub imported: bool,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ImportTrackRequest {
    /// Track id at the external service.
    pub source_id: String,
}

pub fn validate_import_track(req: &ImportTrackRequest) -> Result<(), AppError> {
    let id = req.source_id.trim();
    if id.is_empty() || id.len() > 64 {
        return Err(AppError::Validation("Invalid source id".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TrackResponse {
    pub id: i32,
    pub source_id: String,
    pub title: String,
    pub artist: String,
    pub artwork_url: Option<String>,
    pub permalink_url: Option<String>,
    pub duration_ms: i64,
    pub likes_count: i64,
    pub playback_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_by_viewer: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl TrackResponse {
    pub fn from_model(
        m: crate::entity::music_track::Model,
        liked_by_viewer: Option<bool>,
    ) -> Self {
        Self {
            id: m.id,
            source_id: m.source_id,
            title: m.title,
            artist: m.artist,
            artwork_url: m.artwork_url,
            permalink_url: m.permalink_url,
            duration_ms: m.duration_ms,
            likes_count: m.likes_count,
            playback_count: m.playback_count,
            liked_by_viewer,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TrackListResponse {
    pub data: Vec<TrackResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct TrackListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// `newest` (default) or `popular` (by likes).
    pub sort: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PlaybackResponse {
    pub playback_count: i64,
}
