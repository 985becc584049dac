use chrono::{DateTime, Utc};
use common::TicketStatus;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::post::AuthorResponse;
use crate::models::shared::{Pagination, validate_body, validate_title};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTicketRequest {
    pub subject: String,
    pub message: String,
}

pub fn validate_create_ticket(req: &CreateTicketRequest) -> Result<(), AppError> {
    validate_title(&req.subject, "Subject")?;
    validate_body(&req.message, "Message", 20_000)?;
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AnswerTicketRequest {
    pub answer: String,
}

pub fn validate_answer_ticket(req: &AnswerTicketRequest) -> Result<(), AppError> {
    validate_body(&req.answer, "Answer", 20_000)
}

/// Anonymous contact-form message. Relayed by mail, never persisted.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub fn validate_contact(req: &ContactRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() || req.name.chars().count() > 128 {
        return Err(AppError::Validation("Name must be 1-128 characters".into()));
    }
    let email = req.email.trim();
    if email.len() < 3 || email.len() > 254 || !email.contains('@') {
        return Err(AppError::Validation("Invalid e-mail address".into()));
    }
    validate_body(&req.message, "Message", 20_000)?;
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TicketResponse {
    pub id: i32,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    pub answer: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
    pub is_read_by_admin: bool,
    pub is_read_by_user: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::support_ticket::Model> for TicketResponse {
    fn from(t: crate::entity::support_ticket::Model) -> Self {
        Self {
            id: t.id,
            subject: t.subject,
            message: t.message,
            status: t.status,
            answer: t.answer,
            answered_at: t.answered_at,
            is_read_by_admin: t.is_read_by_admin,
            is_read_by_user: t.is_read_by_user,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TicketListResponse {
    pub data: Vec<TicketResponse>,
    pub pagination: Pagination,
}

/// Admin listing carries the submitter's public fields alongside each ticket.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminTicketListItem {
    #[serde(flatten)]
    pub ticket: TicketResponse,
    pub user: AuthorResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminTicketListResponse {
    pub data: Vec<AdminTicketListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AdminTicketListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Filter by ticket status (`Pending`, `Answered`, `Closed`).
    pub status: Option<String>,
}

/// Derived badge count; recomputed on each fetch, never stored.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UnreadCountResponse {
    #[schema(example = 2)]
    pub unread: u64,
}
