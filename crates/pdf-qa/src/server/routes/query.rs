//! Question answering endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::Error;
use crate::server::state::AppState;
use crate::types::{query::AskQuestionRequest, response::AnswerResponse};

use super::ApiError;

/// POST /ask-question - Answer a question from the indexed documents
pub async fn ask_question(
    State(state): State<AppState>,
    request: Result<Json<AskQuestionRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let Json(request) = request.map_err(|e| {
        tracing::warn!("Malformed question request: {}", e.body_text());
        ApiError::bad_request(Error::MissingField("question".into()).to_string())
    })?;

    let question = request
        .question
        .ok_or_else(|| ApiError::bad_request(Error::MissingField("question".into()).to_string()))?;

    let answer = state
        .answer()
        .answer(&question)
        .await
        .map_err(|e| ApiError::from_pipeline("Error answering question", e))?;

    Ok(Json(AnswerResponse { answer: answer.text }))
}
