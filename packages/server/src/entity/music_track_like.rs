use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Like ledger for music tracks. Unique per (user, track) via the composite
/// index created in `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "music_track_like")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub track_id: i32,
    #[sea_orm(belongs_to, from = "track_id", to = "id")]
    pub track: HasOne<super::music_track::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
