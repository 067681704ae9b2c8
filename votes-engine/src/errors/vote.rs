//! Error types for the vote and unvote engines.
//! Defines the errors reported to callers once local recovery (retrying a
//! lost race) is no longer possible.
use thiserror::Error;
use votes_repository::VotesRepositoryError;
use votes_shared::types::{PostId, UserId};

/// Represents errors that can occur while voting or unvoting.
///
/// A failed operation never leaves a partial write behind: either both the
/// ledger and the score were updated, or neither was.
#[derive(Debug, Error)]
pub enum VoteError {
    /// The user has no vote on the post. Only reported by unvote.
    #[error("Vote not found for post {post_id} and user {user_id}")]
    NotFound { post_id: PostId, user_id: UserId },

    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Every attempt lost a race against a concurrent writer.
    #[error("Vote on post {post_id} by user {user_id} still conflicting after {attempts} attempts")]
    Contended {
        post_id: PostId,
        user_id: UserId,
        attempts: u32,
    },

    #[error("Storage error: {0}")]
    Storage(#[source] VotesRepositoryError),
}

impl VoteError {
    /// True for the conditions surfaced as "not found" to clients.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            VoteError::NotFound { .. } | VoteError::PostNotFound(_) | VoteError::UserNotFound(_)
        )
    }
}

impl From<VotesRepositoryError> for VoteError {
    fn from(err: VotesRepositoryError) -> Self {
        match err {
            VotesRepositoryError::NotFound { post_id, user_id } => {
                VoteError::NotFound { post_id, user_id }
            }
            VotesRepositoryError::PostNotFound(post_id) => VoteError::PostNotFound(post_id),
            VotesRepositoryError::UserNotFound(user_id) => VoteError::UserNotFound(user_id),
            other => VoteError::Storage(other),
        }
    }
}
