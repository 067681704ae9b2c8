//! Error types for the Votes API application.
//! Consolidates errors from configuration, the database pool, the repository
//! and the vote engine, and maps them onto HTTP responses.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;
use votes_engine::VoteError;
use votes_repository::VotesRepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] VotesRepositoryError),
    #[error("Vote error: {0}")]
    Vote(#[from] VoteError),
    #[error("Missing or invalid X-User-Id header")]
    Unauthorized,
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Vote(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Repository(VotesRepositoryError::NotFound { .. })
            | ApiError::Repository(VotesRepositoryError::PostNotFound(_))
            | ApiError::Repository(VotesRepositoryError::UserNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (
            status,
            Json(serde_json::json!({
                "status": "error",
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
