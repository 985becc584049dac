use axum::Json;
use axum::extract::{Path, State};
use catalog::EthnicGroup;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::quiz_attempt;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::quiz::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Ethnic Groups",
    operation_id = "listGroups",
    summary = "The static catalog of ethnic groups",
    responses(
        (status = 200, description = "All groups", body = Vec<EthnicGroup>),
    ),
)]
#[instrument]
pub async fn list_groups() -> Json<&'static [EthnicGroup]> {
    Json(catalog::all_groups())
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Ethnic Groups",
    operation_id = "getGroup",
    summary = "One catalog entry",
    params(("id" = String, Path, description = "Group slug")),
    responses(
        (status = 200, description = "Group", body = EthnicGroup),
        (status = 404, description = "Group not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument]
pub async fn get_group(Path(id): Path<String>) -> Result<Json<&'static EthnicGroup>, AppError> {
    catalog::find_group(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Ethnic group not found".into()))
}

#[utoipa::path(
    get,
    path = "/{id}/quiz",
    tag = "Quizzes",
    operation_id = "getQuiz",
    summary = "The quiz for a group, without answers",
    params(("id" = String, Path, description = "Group slug")),
    responses(
        (status = 200, description = "Questions", body = QuizResponse),
        (status = 404, description = "No quiz for this group (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument]
pub async fn get_quiz(Path(id): Path<String>) -> Result<Json<QuizResponse>, AppError> {
    let bank = find_bank(&id)?;
    let questions = bank.iter().map(QuizQuestionView::from).collect();
    Ok(Json(QuizResponse {
        group_id: id,
        questions,
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/quiz",
    tag = "Quizzes",
    operation_id = "submitQuiz",
    summary = "Submit quiz answers and record the attempt",
    description = "Grades server-side against the question bank. One attempt \
        row per (user, group); resubmitting replaces the previous result.",
    params(("id" = String, Path, description = "Group slug")),
    request_body = SubmitQuizRequest,
    responses(
        (status = 200, description = "Graded result", body = QuizResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No quiz for this group (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn submit_quiz(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<SubmitQuizRequest>,
) -> Result<Json<QuizResultResponse>, AppError> {
    let bank = find_bank(&id)?;
    validate_submit_quiz(&payload, bank.len())?;

    let correct = catalog::grade(bank, &payload.answers);
    let score = correct.iter().filter(|&&ok| ok).count() as i32;
    let total = bank.len() as i32;
    let now = chrono::Utc::now();

    let attempt = quiz_attempt::ActiveModel {
        user_id: Set(auth_user.user_id),
        ethnic_group_id: Set(id.clone()),
        completed: Set(true),
        score: Set(score),
        total: Set(total),
        answers: Set(serde_json::json!(payload.answers)),
        completed_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    quiz_attempt::Entity::insert(attempt)
        .on_conflict(
            OnConflict::columns([
                quiz_attempt::Column::UserId,
                quiz_attempt::Column::EthnicGroupId,
            ])
            .update_columns([
                quiz_attempt::Column::Completed,
                quiz_attempt::Column::Score,
                quiz_attempt::Column::Total,
                quiz_attempt::Column::Answers,
                quiz_attempt::Column::CompletedAt,
                quiz_attempt::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await?;

    Ok(Json(QuizResultResponse {
        group_id: id,
        score,
        total,
        correct,
        completed_at: Some(now),
    }))
}

#[utoipa::path(
    get,
    path = "/results",
    tag = "Quizzes",
    operation_id = "myQuizResults",
    summary = "The caller's quiz attempts",
    responses(
        (status = 200, description = "Attempts", body = Vec<QuizAttemptResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn my_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuizAttemptResponse>>, AppError> {
    let rows = quiz_attempt::Entity::find()
        .filter(quiz_attempt::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(quiz_attempt::Column::UpdatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

fn find_bank(group_id: &str) -> Result<&'static [catalog::QuizQuestion], AppError> {
    // An unknown group and a group without a bank look the same to clients.
    catalog::find_group(group_id)
        .and_then(|g| catalog::quiz_for(g.id))
        .ok_or_else(|| AppError::NotFound("No quiz for this group".into()))
}
