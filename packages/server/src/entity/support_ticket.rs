use common::TicketStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A persisted, tracked support request. Distinct from the anonymous
/// contact form, which relays straight to the mailer and stores nothing.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "support_ticket")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub subject: String,
    pub message: String,

    pub status: TicketStatus,
    pub answer: Option<String>,
    pub answered_at: Option<DateTimeUtc>,

    /// Read flags are independent per side and never affect `status`.
    pub is_read_by_admin: bool,
    pub is_read_by_user: bool,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
