// HTTP request handlers
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::info;
use uuid::Uuid;
use votes_shared::types::{Post, PostId, UserId, VoteValue};

use crate::config::USER_ID_HEADER;
use crate::errors::ApiError;
use crate::server::state::AppState;

/// The user the request acts for, taken from the `X-User-Id` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(AuthenticatedUser)
            .ok_or(ApiError::Unauthorized)
    }
}

fn parse_post_id(raw: &str) -> Result<PostId, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid post id '{raw}'")))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Votes API is running")
}

/// Returns a post and counts the view
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = parse_post_id(&post_id)?;
    let post = state.voting.view_post(post_id).await?;
    Ok(Json(post))
}

pub async fn upvote(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    cast_vote(&state, &post_id, user, VoteValue::Up).await
}

pub async fn downvote(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    cast_vote(&state, &post_id, user, VoteValue::Down).await
}

/// Answers 201 when a new vote was recorded and 200 otherwise, with the
/// post as stored after the vote.
async fn cast_vote(
    state: &AppState,
    post_id: &str,
    AuthenticatedUser(user_id): AuthenticatedUser,
    value: VoteValue,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post_id = parse_post_id(post_id)?;
    let receipt = state.voting.vote(post_id, user_id, value).await?;
    info!(
        post_id = %post_id,
        user_id = %user_id,
        outcome = ?receipt.outcome,
        score = receipt.post.score,
        "Vote request handled"
    );

    let status = if receipt.outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(receipt.post)))
}

pub async fn unvote(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = parse_post_id(&post_id)?;
    let receipt = state.voting.unvote(post_id, user_id).await?;
    info!(
        post_id = %post_id,
        user_id = %user_id,
        score = receipt.post.score,
        "Unvote request handled"
    );
    Ok(Json(receipt.post))
}
