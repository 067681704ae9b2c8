use votes_shared::types::{NewPost, NewUser, Post, PostId, User, UserId};
use crate::errors::VotesRepositoryError;

/// Read and create access to posts.
///
/// Nothing here writes `score`; that column belongs to [`crate::ScoreAggregate`].
#[async_trait::async_trait]
pub trait PostsRepository: Send + Sync {
    async fn create_post(&self, post: &NewPost) -> Result<Post, VotesRepositoryError>;

    /// Returns `VotesRepositoryError::PostNotFound` when the post does not exist.
    async fn get_post(&self, post_id: PostId) -> Result<Post, VotesRepositoryError>;

    /// Atomically increments the views counter and returns the updated post.
    async fn increment_views(&self, post_id: PostId) -> Result<Post, VotesRepositoryError>;
}

#[async_trait::async_trait]
pub trait UsersRepository: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> Result<User, VotesRepositoryError>;

    /// Returns `VotesRepositoryError::UserNotFound` when the user does not exist.
    async fn get_user(&self, user_id: UserId) -> Result<User, VotesRepositoryError>;
}
