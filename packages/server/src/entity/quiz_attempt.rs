use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One user's quiz result for one ethnic group. At most one row per
/// (user, group); resubmitting upserts. The raw answer sheet is kept so a
/// result can be re-rendered question by question.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz_attempt")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub ethnic_group_id: String,

    pub completed: bool,
    pub score: i32,
    pub total: i32,

    /// Chosen option index per question, as submitted.
    #[sea_orm(column_type = "JsonBinary")]
    pub answers: serde_json::Value,

    pub completed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
