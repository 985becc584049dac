use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,

    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub region: Option<String>,

    #[sea_orm(has_many)]
    pub posts: HasMany<super::post::Entity>,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,

    #[sea_orm(has_many)]
    pub tickets: HasMany<super::support_ticket::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
