use common::MediaKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One media item attached to a post. `position` preserves the author's
/// ordering; `kind` is stored explicitly instead of being sniffed from the
/// URL at render time.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post_media")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub post_id: i32,
    #[sea_orm(belongs_to, from = "post_id", to = "id")]
    pub post: HasOne<super::post::Entity>,

    pub position: i32,
    pub url: String,
    pub kind: MediaKind,
}

impl ActiveModelBehavior for ActiveModel {}
