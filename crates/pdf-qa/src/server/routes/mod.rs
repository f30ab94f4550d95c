//! HTTP routes

pub mod ingest;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::error::Error;
use crate::server::state::AppState;
use crate::types::response::{ErrorResponse, MessageResponse};

/// Build the application routes
pub fn routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route(
            "/upload-document",
            post(ingest::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/ask-question", post(query::ask_question))
}

/// GET / - liveness message
async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Backend running successfully!"))
}

/// Error returned by route handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 with `message` as the body
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Map a pipeline error; caller mistakes keep their own message, anything
    /// else is a 500 prefixed with `context`
    pub fn from_pipeline(context: &str, err: Error) -> Self {
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }
        tracing::error!("{}: {}", context, err);
        Self::new(err.status_code(), format!("{}: {}", context, err))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_failure_is_prefixed_500() {
        let err = ApiError::from_pipeline(
            "Error processing document",
            Error::embedding("openai embeddings: HTTP 401"),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message(),
            "Error processing document: Embedding generation failed: openai embeddings: HTTP 401"
        );
    }

    #[test]
    fn test_empty_question_is_400_without_prefix() {
        let err = ApiError::from_pipeline("Error answering question", Error::EmptyQuestion);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Question must not be empty");
    }

    #[test]
    fn test_timeout_is_500() {
        let err = ApiError::from_pipeline(
            "Error answering question",
            Error::ProviderTimeout {
                provider: "pinecone".into(),
                operation: "query".into(),
                timeout: std::time::Duration::from_secs(60),
            },
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().ends_with("pinecone query timed out after 60s"));
    }
}
