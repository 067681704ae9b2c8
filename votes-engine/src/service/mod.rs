//! Post-level facade over the [`VoteEngine`].
//!
//! Callers outside this crate (the HTTP layer) talk to [`PostVoting`], which
//! confirms the post and the user exist, runs the engine and reads the post
//! back so the response carries the score the operation produced.
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use votes_repository::{PostsRepository, ScoreAggregate, UsersRepository, VoteLedger};
use votes_shared::types::{Post, PostId, UserId, VoteOutcome, VoteValue};
use crate::engine::{EngineConfig, VoteEngine};
use crate::errors::VoteError;

/// Result of a vote or unvote: what happened and the post as stored afterwards.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VoteReceipt {
    pub outcome: VoteOutcome,
    pub post: Post,
}

/// Object-safe entry point for voting on posts.
#[async_trait]
pub trait PostVoting: Send + Sync {
    async fn vote(
        &self,
        post_id: PostId,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<VoteReceipt, VoteError>;

    async fn unvote(&self, post_id: PostId, user_id: UserId) -> Result<VoteReceipt, VoteError>;

    /// Returns the post and counts the view.
    async fn view_post(&self, post_id: PostId) -> Result<Post, VoteError>;
}

pub struct VotingService<S> {
    engine: VoteEngine<S>,
    store: Arc<S>,
}

impl<S> VotingService<S>
where
    S: VoteLedger + ScoreAggregate + PostsRepository + UsersRepository,
{
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            engine: VoteEngine::with_config(Arc::clone(&store), config),
            store,
        }
    }

    async fn load_post(&self, post_id: PostId) -> Result<Post, VoteError> {
        Ok(self.store.get_post(post_id).await?)
    }

    /// Fails with `VoteError::PostNotFound` or `VoteError::UserNotFound`
    /// before the engine touches the ledger.
    async fn check_references(&self, post_id: PostId, user_id: UserId) -> Result<(), VoteError> {
        self.load_post(post_id).await?;
        self.store.get_user(user_id).await?;
        Ok(())
    }
}

#[async_trait]
impl<S> PostVoting for VotingService<S>
where
    S: VoteLedger + ScoreAggregate + PostsRepository + UsersRepository + 'static,
{
    #[instrument(skip(self), fields(post_id = %post_id, user_id = %user_id, value = %value))]
    async fn vote(
        &self,
        post_id: PostId,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<VoteReceipt, VoteError> {
        self.check_references(post_id, user_id).await?;
        let outcome = self.engine.vote(post_id, user_id, value).await?;
        let post = self.load_post(post_id).await?;
        debug!(score = post.score, "Post read back after vote");
        Ok(VoteReceipt { outcome, post })
    }

    #[instrument(skip(self), fields(post_id = %post_id, user_id = %user_id))]
    async fn unvote(&self, post_id: PostId, user_id: UserId) -> Result<VoteReceipt, VoteError> {
        self.check_references(post_id, user_id).await?;
        let outcome = self.engine.unvote(post_id, user_id).await?;
        let post = self.load_post(post_id).await?;
        debug!(score = post.score, "Post read back after unvote");
        Ok(VoteReceipt { outcome, post })
    }

    async fn view_post(&self, post_id: PostId) -> Result<Post, VoteError> {
        Ok(self.store.increment_views(post_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votes_repository::InMemoryVotesRepository;
    use votes_shared::types::{NewPost, NewUser, PostKind};

    async fn setup() -> (VotingService<InMemoryVotesRepository>, Post, UserId) {
        let store = Arc::new(InMemoryVotesRepository::new());
        let user = store
            .create_user(&NewUser { username: "alice".to_string() })
            .await
            .unwrap();
        let post = store
            .create_post(&NewPost {
                author_id: user.id,
                title: "Hello".to_string(),
                category: "general".to_string(),
                kind: PostKind::Text,
                body: "first post".to_string(),
            })
            .await
            .unwrap();
        (VotingService::new(store, EngineConfig::default()), post, user.id)
    }

    #[tokio::test]
    async fn test_vote_returns_refreshed_post() {
        let (service, post, user_id) = setup().await;

        let receipt = service.vote(post.id, user_id, VoteValue::Up).await.unwrap();

        assert!(receipt.outcome.is_created());
        assert_eq!(receipt.post.id, post.id);
        assert_eq!(receipt.post.score, 1);
    }

    #[tokio::test]
    async fn test_vote_on_missing_post() {
        let (service, _, user_id) = setup().await;
        let missing = uuid::Uuid::new_v4();

        let err = service.vote(missing, user_id, VoteValue::Up).await.unwrap_err();

        assert!(matches!(err, VoteError::PostNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_unknown_user_is_rejected_before_voting() {
        let (service, post, _) = setup().await;
        let stranger = uuid::Uuid::new_v4();

        let err = service.vote(post.id, stranger, VoteValue::Up).await.unwrap_err();
        assert!(matches!(err, VoteError::UserNotFound(id) if id == stranger));
        assert!(err.is_not_found());

        let err = service.unvote(post.id, stranger).await.unwrap_err();
        assert!(matches!(err, VoteError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_unvote_without_vote_is_not_found() {
        let (service, post, user_id) = setup().await;

        let err = service.unvote(post.id, user_id).await.unwrap_err();

        assert!(matches!(err, VoteError::NotFound { .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_view_post_counts_views_only() {
        let (service, post, user_id) = setup().await;
        service.vote(post.id, user_id, VoteValue::Down).await.unwrap();

        service.view_post(post.id).await.unwrap();
        let viewed = service.view_post(post.id).await.unwrap();

        assert_eq!(viewed.views, 2);
        assert_eq!(viewed.score, -1);
    }

    #[tokio::test]
    async fn test_service_is_usable_as_trait_object() {
        let (service, post, user_id) = setup().await;
        let voting: Arc<dyn PostVoting> = Arc::new(service);

        let receipt = voting.vote(post.id, user_id, VoteValue::Up).await.unwrap();
        assert_eq!(receipt.post.score, 1);
    }
}
