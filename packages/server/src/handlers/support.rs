use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::TicketStatus;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{support_ticket, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{PageQuery, Pagination};
use crate::models::support::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/tickets",
    tag = "Support",
    operation_id = "createTicket",
    summary = "Submit a support ticket",
    description = "Creates a `Pending` ticket. The ticket starts unread on \
        the admin side; the author has obviously seen their own ticket.",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_ticket(&payload)?;

    let now = chrono::Utc::now();
    let model = support_ticket::ActiveModel {
        subject: Set(payload.subject.trim().to_string()),
        message: Set(payload.message.trim().to_string()),
        status: Set(TicketStatus::Pending),
        is_read_by_admin: Set(false),
        is_read_by_user: Set(true),
        user_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(TicketResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/tickets",
    tag = "Support",
    operation_id = "listMyTickets",
    summary = "The caller's tickets, newest first",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of tickets", body = TicketListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_tickets(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<TicketListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let base = support_ticket::Entity::find()
        .filter(support_ticket::Column::UserId.eq(auth_user.user_id));
    let total = base.clone().paginate(&state.db, per_page).num_items().await?;

    let rows = base
        .order_by_desc(support_ticket::Column::CreatedAt)
        .order_by_desc(support_ticket::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    Ok(Json(TicketListResponse {
        data: rows.into_iter().map(TicketResponse::from).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    }))
}

#[utoipa::path(
    get,
    path = "/tickets/{id}",
    tag = "Support",
    operation_id = "getTicket",
    summary = "Get one ticket",
    description = "Visible to the ticket's owner and holders of `support:manage`.",
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket", body = TicketResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = find_ticket(&state.db, id).await?;
    require_owner_or_manager(&ticket, &auth_user)?;
    Ok(Json(TicketResponse::from(ticket)))
}

#[utoipa::path(
    post,
    path = "/tickets/{id}/answer",
    tag = "Support",
    operation_id = "answerTicket",
    summary = "Answer a pending ticket",
    description = "Requires `support:manage`. Sets status to `Answered`, \
        records the answer and its timestamp, and marks the ticket unread \
        for the user — all in one transaction. Tickets that are already \
        answered or closed are rejected with CONFLICT.",
    params(("id" = i32, Path, description = "Ticket ID")),
    request_body = AnswerTicketRequest,
    responses(
        (status = 200, description = "Ticket answered", body = TicketResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Ticket is not pending (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn answer_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AnswerTicketRequest>,
) -> Result<Json<TicketResponse>, AppError> {
    auth_user.require_permission("support:manage")?;
    validate_answer_ticket(&payload)?;

    let txn = state.db.begin().await?;

    let ticket = find_ticket(&txn, id).await?;
    match ticket.status {
        TicketStatus::Pending => {}
        TicketStatus::Answered => {
            return Err(AppError::Conflict("Ticket is already answered".into()));
        }
        TicketStatus::Closed => {
            return Err(AppError::Conflict("Ticket is closed".into()));
        }
    }

    let now = chrono::Utc::now();
    let mut active: support_ticket::ActiveModel = ticket.into();
    active.status = Set(TicketStatus::Answered);
    active.answer = Set(Some(payload.answer.trim().to_string()));
    active.answered_at = Set(Some(now));
    // A fresh answer is unread for the recipient regardless of the admin flag.
    active.is_read_by_user = Set(false);
    active.updated_at = Set(now);

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(TicketResponse::from(model)))
}

#[utoipa::path(
    post,
    path = "/tickets/{id}/close",
    tag = "Support",
    operation_id = "closeTicket",
    summary = "Close a ticket",
    description = "Allowed for the owner (withdrawal) and `support:manage`. \
        Closing is terminal: a closed ticket cannot be answered or reopened.",
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket closed", body = TicketResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Ticket already closed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn close_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = find_ticket(&state.db, id).await?;
    require_owner_or_manager(&ticket, &auth_user)?;

    if ticket.status == TicketStatus::Closed {
        return Err(AppError::Conflict("Ticket is already closed".into()));
    }

    let mut active: support_ticket::ActiveModel = ticket.into();
    active.status = Set(TicketStatus::Closed);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(TicketResponse::from(model)))
}

#[utoipa::path(
    post,
    path = "/tickets/{id}/read",
    tag = "Support",
    operation_id = "markTicketRead",
    summary = "Mark a ticket read for the caller's side",
    description = "The owner flips `is_read_by_user`; `support:manage` flips \
        `is_read_by_admin`. Status is untouched.",
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Flag updated", body = TicketResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn mark_ticket_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = find_ticket(&state.db, id).await?;

    let mut active: support_ticket::ActiveModel = ticket.clone().into();
    if ticket.user_id == auth_user.user_id {
        active.is_read_by_user = Set(true);
    } else if auth_user.has_permission("support:manage") {
        active.is_read_by_admin = Set(true);
    } else {
        return Err(AppError::PermissionDenied);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(TicketResponse::from(model)))
}

#[utoipa::path(
    get,
    path = "/unread-count",
    tag = "Support",
    operation_id = "unreadTicketCount",
    summary = "Unread-ticket badge for the caller's side",
    description = "Derived by COUNT on every call, never stored. Admins see \
        tickets unread on the admin side; users see their own unread tickets.",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn unread_count(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let unread = if auth_user.has_permission("support:manage") {
        support_ticket::Entity::find()
            .filter(support_ticket::Column::IsReadByAdmin.eq(false))
            .count(&state.db)
            .await?
    } else {
        support_ticket::Entity::find()
            .filter(support_ticket::Column::UserId.eq(auth_user.user_id))
            .filter(support_ticket::Column::IsReadByUser.eq(false))
            .count(&state.db)
            .await?
    };

    Ok(Json(UnreadCountResponse { unread }))
}

#[utoipa::path(
    get,
    path = "/support/tickets",
    tag = "Admin",
    operation_id = "listAllTickets",
    summary = "All tickets with submitter info",
    description = "Requires `support:manage`. Optional status filter.",
    params(AdminTicketListQuery),
    responses(
        (status = 200, description = "Page of tickets", body = AdminTicketListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_all_tickets(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AdminTicketListQuery>,
) -> Result<Json<AdminTicketListResponse>, AppError> {
    auth_user.require_permission("support:manage")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut base = support_ticket::Entity::find();
    if let Some(ref status) = query.status {
        let status: TicketStatus = status.parse().map_err(AppError::Validation)?;
        base = base.filter(support_ticket::Column::Status.eq(status));
    }

    let total = base.clone().paginate(&state.db, per_page).num_items().await?;

    let rows = base
        .find_also_related(user::Entity)
        .order_by_desc(support_ticket::Column::CreatedAt)
        .order_by_desc(support_ticket::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let data = rows
        .into_iter()
        .map(|(t, submitter)| {
            let user = submitter
                .map(Into::into)
                .ok_or_else(|| AppError::Internal("Ticket user not found".into()))?;
            Ok(AdminTicketListItem {
                ticket: TicketResponse::from(t),
                user,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(Json(AdminTicketListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    }))
}

#[utoipa::path(
    post,
    path = "/contact",
    tag = "Support",
    operation_id = "sendContactMessage",
    summary = "Anonymous contact form",
    description = "Fire-and-forget relay to the support inbox. Nothing is \
        persisted and no account is required — tracked requests go through \
        tickets instead.",
    request_body = ContactRequest,
    responses(
        (status = 202, description = "Message accepted for delivery"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn contact(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_contact(&payload)?;

    state
        .mailer
        .send_contact_message(
            payload.name.trim(),
            payload.email.trim(),
            payload.message.trim(),
        )
        .await
        .map_err(|e| AppError::Internal(format!("Contact relay failed: {e}")))?;

    Ok(StatusCode::ACCEPTED)
}

async fn find_ticket<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<support_ticket::Model, AppError> {
    support_ticket::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))
}

fn require_owner_or_manager(
    ticket: &support_ticket::Model,
    actor: &AuthUser,
) -> Result<(), AppError> {
    if ticket.user_id == actor.user_id || actor.has_permission("support:manage") {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}
