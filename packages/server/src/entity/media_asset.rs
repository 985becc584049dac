use common::MediaKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metadata for one uploaded blob in the media store, keyed by content hash.
/// Re-uploading identical content is a no-op upsert.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media_asset")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub content_hash: String,
    pub content_type: String,
    pub kind: MediaKind,
    pub size: i64,

    pub uploader_id: i32,
    #[sea_orm(belongs_to, from = "uploader_id", to = "id")]
    pub uploader: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
