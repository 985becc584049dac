use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A question as shown to the quiz taker; no correct index.
#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizQuestionView {
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<&catalog::QuizQuestion> for QuizQuestionView {
    fn from(q: &catalog::QuizQuestion) -> Self {
        Self {
            prompt: q.prompt.to_string(),
            options: q.options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizResponse {
    pub group_id: String,
    pub questions: Vec<QuizQuestionView>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitQuizRequest {
    /// Chosen option index per question, in question order.
    pub answers: Vec<usize>,
}

pub fn validate_submit_quiz(req: &SubmitQuizRequest, question_count: usize) -> Result<(), AppError> {
    if req.answers.len() != question_count {
        return Err(AppError::Validation(format!(
            "Expected {question_count} answers, got {}",
            req.answers.len()
        )));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizResultResponse {
    pub group_id: String,
    pub score: i32,
    pub total: i32,
    /// Per-question correctness, in question order.
    pub correct: Vec<bool>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizAttemptResponse {
    pub group_id: String,
    /// Resolved catalog name; `null` when the id no longer resolves.
    pub group_name: Option<String>,
    pub score: i32,
    pub total: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<crate::entity::quiz_attempt::Model> for QuizAttemptResponse {
    fn from(a: crate::entity::quiz_attempt::Model) -> Self {
        let group_name = catalog::find_group(&a.ethnic_group_id).map(|g| g.name.to_string());
        Self {
            group_id: a.ethnic_group_id,
            group_name,
            score: a.score,
            total: a.total,
            completed: a.completed,
            completed_at: a.completed_at,
        }
    }
}
