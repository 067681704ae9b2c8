//! Error types for the votes repository.
//! Classifies storage failures so that callers can branch on the conditions
//! that carry meaning (absent rows, lost races) and propagate everything else.
use thiserror::Error;
use votes_shared::types::{InvalidVoteValue, PostId, UserId};

/// Represents errors that can occur within the votes repository.
#[derive(Debug, Error)]
pub enum VotesRepositoryError {
    /// No vote exists for the requested `(post, user)` pair.
    #[error("Vote not found for post {post_id} and user {user_id}")]
    NotFound { post_id: PostId, user_id: UserId },

    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// A concurrent writer got there first: either the unique `(post, user)`
    /// key rejected an insert, or a conditional update/delete matched no row.
    #[error("Conflicting concurrent write: {0}")]
    Conflict(String),

    /// A row references a post or user that does not exist.
    #[error("Missing reference: {0}")]
    MissingReference(String),

    #[error("Invalid vote value: {0}")]
    InvalidVoteValue(#[from] InvalidVoteValue),

    #[error("Invalid post kind: {0}")]
    InvalidPostKind(i16),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl VotesRepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, VotesRepositoryError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, VotesRepositoryError::Conflict(_))
    }
}

/// Unique key of the vote ledger. Only a violation of this key means another
/// writer cast the same `(post, user)` vote first.
pub const VOTE_KEY_CONSTRAINT: &str = "votes_post_user_key";

impl From<sqlx::Error> for VotesRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db)
                if db.is_unique_violation() && db.constraint() == Some(VOTE_KEY_CONSTRAINT) =>
            {
                VotesRepositoryError::Conflict(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                VotesRepositoryError::MissingReference(db.message().to_string())
            }
            _ => VotesRepositoryError::DatabaseError(err),
        }
    }
}
