use common::ModerationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub content: String,

    /// Free-text tags stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: serde_json::Value,

    /// Slug into the static ethnic-group catalog. May not resolve; readers
    /// degrade to "unknown group".
    pub ethnic_group_id: Option<String>,

    pub status: ModerationStatus,

    /// Immutable after creation.
    pub author_id: i32,
    #[sea_orm(belongs_to, from = "author_id", to = "id")]
    pub author: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub media: HasMany<super::post_media::Entity>,

    #[sea_orm(has_many)]
    pub likes: HasMany<super::post_like::Entity>,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
