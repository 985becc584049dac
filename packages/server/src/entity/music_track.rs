use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A track imported from the external music service.
///
/// Unlike post likes, `likes_count` and `playback_count` are denormalized
/// counters. Every mutation of `likes_count` happens in the same transaction
/// as its `music_track_like` ledger write, so the counter cannot drift.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "music_track")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Track id at the external service; dedup key on import.
    #[sea_orm(unique)]
    pub source_id: String,

    pub title: String,
    pub artist: String,
    pub artwork_url: Option<String>,
    pub permalink_url: Option<String>,
    pub duration_ms: i64,

    pub likes_count: i64,
    pub playback_count: i64,

    #[sea_orm(has_many)]
    pub likes: HasMany<super::music_track_like::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
