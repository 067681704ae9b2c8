//! In-memory implementation of the votes repository.
//!
//! Transactions are serialized: [`Transactional::begin`] takes an owned lock
//! on the whole state and keeps a snapshot of it. Commit discards the
//! snapshot; rollback, or dropping the transaction for any other reason
//! (including a panic), restores it.
//!
//! Reads outside a transaction wait for the in-flight transaction to finish,
//! so uncommitted writes are never observed.
//!
//! One-shot failures can be injected per [`StoreOperation`] to exercise
//! rollback paths.
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;
use votes_shared::types::{NewPost, NewUser, Post, PostId, User, UserId, Vote, VoteId, VoteValue};
use crate::interfaces::{PostsRepository, ScoreAggregate, Transactional, UsersRepository, VoteLedger};
use crate::VotesRepositoryError;

/// Store operations at which a failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Begin,
    Commit,
    FindVote,
    InsertVote,
    UpdateVote,
    DeleteVote,
    ApplyScoreDelta,
}

#[derive(Debug, Clone, Default)]
struct State {
    users: HashMap<UserId, User>,
    posts: HashMap<PostId, Post>,
    votes: HashMap<VoteId, Vote>,
    vote_keys: HashMap<(PostId, UserId), VoteId>,
}

/// Transaction handle of [`InMemoryVotesRepository`].
pub struct InMemoryTransaction {
    state: OwnedMutexGuard<State>,
    snapshot: Option<State>,
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.state = snapshot;
        }
    }
}

/// Transactional in-memory votes repository.
///
/// Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct InMemoryVotesRepository {
    state: Arc<Mutex<State>>,
    faults: Arc<std::sync::Mutex<HashSet<StoreOperation>>>,
}

impl InMemoryVotesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `operation` fail with `VotesRepositoryError::Storage`.
    pub fn fail_next(&self, operation: StoreOperation) {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(operation);
    }

    /// Returns every live vote, across all posts.
    pub async fn all_votes(&self) -> Vec<Vote> {
        self.state.lock().await.votes.values().cloned().collect()
    }

    fn check_fault(&self, operation: StoreOperation) -> Result<(), VotesRepositoryError> {
        let fired = self
            .faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&operation);
        if fired {
            return Err(VotesRepositoryError::Storage(format!(
                "injected failure at {operation:?}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Transactional for InMemoryVotesRepository {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Transaction, VotesRepositoryError> {
        self.check_fault(StoreOperation::Begin)?;
        let state = self.state.clone().lock_owned().await;
        let snapshot = Some(state.clone());
        Ok(InMemoryTransaction { state, snapshot })
    }

    async fn commit(&self, mut tx: Self::Transaction) -> Result<(), VotesRepositoryError> {
        // An injected commit failure drops `tx` with its snapshot, rolling it back.
        self.check_fault(StoreOperation::Commit)?;
        tx.snapshot = None;
        Ok(())
    }

    async fn rollback(&self, tx: Self::Transaction) -> Result<(), VotesRepositoryError> {
        drop(tx);
        Ok(())
    }
}

#[async_trait]
impl VoteLedger for InMemoryVotesRepository {
    async fn find_vote(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<Vote, VotesRepositoryError> {
        self.check_fault(StoreOperation::FindVote)?;
        let state = self.state.lock().await;
        state
            .vote_keys
            .get(&(post_id, user_id))
            .and_then(|id| state.votes.get(id))
            .cloned()
            .ok_or(VotesRepositoryError::NotFound { post_id, user_id })
    }

    async fn insert_vote_tx(
        &self,
        tx: &mut Self::Transaction,
        post_id: PostId,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<Vote, VotesRepositoryError> {
        self.check_fault(StoreOperation::InsertVote)?;
        let state = &mut *tx.state;
        if !state.posts.contains_key(&post_id) {
            return Err(VotesRepositoryError::MissingReference(format!("post {post_id}")));
        }
        if !state.users.contains_key(&user_id) {
            return Err(VotesRepositoryError::MissingReference(format!("user {user_id}")));
        }
        if state.vote_keys.contains_key(&(post_id, user_id)) {
            return Err(VotesRepositoryError::Conflict(format!(
                "vote for post {post_id} and user {user_id} already exists"
            )));
        }

        let now = OffsetDateTime::now_utc();
        let vote = Vote {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            value,
            created_at: now,
            updated_at: now,
        };
        state.vote_keys.insert((post_id, user_id), vote.id);
        state.votes.insert(vote.id, vote.clone());
        Ok(vote)
    }

    async fn update_vote_tx(
        &self,
        tx: &mut Self::Transaction,
        vote: &Vote,
        value: VoteValue,
    ) -> Result<(), VotesRepositoryError> {
        self.check_fault(StoreOperation::UpdateVote)?;
        match tx.state.votes.get_mut(&vote.id) {
            Some(stored) if stored.value == vote.value => {
                stored.value = value;
                stored.updated_at = OffsetDateTime::now_utc();
                Ok(())
            }
            _ => Err(VotesRepositoryError::Conflict(format!(
                "vote {} changed since it was read",
                vote.id
            ))),
        }
    }

    async fn delete_vote_tx(
        &self,
        tx: &mut Self::Transaction,
        vote: &Vote,
    ) -> Result<(), VotesRepositoryError> {
        self.check_fault(StoreOperation::DeleteVote)?;
        let state = &mut *tx.state;
        match state.votes.get(&vote.id) {
            Some(stored) if stored.value == vote.value => {
                state.votes.remove(&vote.id);
                state.vote_keys.remove(&(vote.post_id, vote.user_id));
                Ok(())
            }
            _ => Err(VotesRepositoryError::Conflict(format!(
                "vote {} changed or was removed since it was read",
                vote.id
            ))),
        }
    }

    async fn list_post_votes(&self, post_id: PostId) -> Result<Vec<Vote>, VotesRepositoryError> {
        let state = self.state.lock().await;
        let mut votes: Vec<Vote> = state
            .votes
            .values()
            .filter(|v| v.post_id == post_id)
            .cloned()
            .collect();
        votes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(votes)
    }
}

#[async_trait]
impl ScoreAggregate for InMemoryVotesRepository {
    async fn apply_score_delta_tx(
        &self,
        tx: &mut Self::Transaction,
        post_id: PostId,
        delta: i64,
    ) -> Result<(), VotesRepositoryError> {
        self.check_fault(StoreOperation::ApplyScoreDelta)?;
        let post = tx
            .state
            .posts
            .get_mut(&post_id)
            .ok_or(VotesRepositoryError::PostNotFound(post_id))?;
        post.score += delta;
        Ok(())
    }

    async fn ledger_score(&self, post_id: PostId) -> Result<i64, VotesRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .votes
            .values()
            .filter(|v| v.post_id == post_id)
            .map(|v| v.value.score())
            .sum())
    }
}

#[async_trait]
impl PostsRepository for InMemoryVotesRepository {
    async fn create_post(&self, post: &NewPost) -> Result<Post, VotesRepositoryError> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&post.author_id) {
            return Err(VotesRepositoryError::MissingReference(format!(
                "user {}",
                post.author_id
            )));
        }
        let now = OffsetDateTime::now_utc();
        let created = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            title: post.title.clone(),
            category: post.category.clone(),
            kind: post.kind,
            body: post.body.clone(),
            score: 0,
            views: 0,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_post(&self, post_id: PostId) -> Result<Post, VotesRepositoryError> {
        self.state
            .lock()
            .await
            .posts
            .get(&post_id)
            .cloned()
            .ok_or(VotesRepositoryError::PostNotFound(post_id))
    }

    async fn increment_views(&self, post_id: PostId) -> Result<Post, VotesRepositoryError> {
        let mut state = self.state.lock().await;
        let post = state
            .posts
            .get_mut(&post_id)
            .ok_or(VotesRepositoryError::PostNotFound(post_id))?;
        post.views += 1;
        Ok(post.clone())
    }
}

#[async_trait]
impl UsersRepository for InMemoryVotesRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User, VotesRepositoryError> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(VotesRepositoryError::Storage(format!(
                "username {} is taken",
                user.username
            )));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, VotesRepositoryError> {
        self.state
            .lock()
            .await
            .users
            .get(&user_id)
            .cloned()
            .ok_or(VotesRepositoryError::UserNotFound(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votes_shared::types::PostKind;

    async fn seed(repo: &InMemoryVotesRepository) -> (Post, User) {
        let user = repo
            .create_user(&NewUser { username: "u42".to_string() })
            .await
            .unwrap();
        let post = repo
            .create_post(&NewPost {
                author_id: user.id,
                title: "hello".to_string(),
                category: "news".to_string(),
                kind: PostKind::Text,
                body: "first".to_string(),
            })
            .await
            .unwrap();
        (post, user)
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let repo = InMemoryVotesRepository::new();
        let (post, user) = seed(&repo).await;

        {
            let mut tx = repo.begin().await.unwrap();
            repo.insert_vote_tx(&mut tx, post.id, user.id, VoteValue::Up).await.unwrap();
            repo.apply_score_delta_tx(&mut tx, post.id, 1).await.unwrap();
        }

        assert!(repo.find_vote(post.id, user.id).await.unwrap_err().is_not_found());
        assert_eq!(repo.get_post(post.id).await.unwrap().score, 0);
    }

    #[tokio::test]
    async fn test_committed_transaction_is_visible() {
        let repo = InMemoryVotesRepository::new();
        let (post, user) = seed(&repo).await;

        let mut tx = repo.begin().await.unwrap();
        let vote = repo.insert_vote_tx(&mut tx, post.id, user.id, VoteValue::Down).await.unwrap();
        repo.apply_score_delta_tx(&mut tx, post.id, -1).await.unwrap();
        repo.commit(tx).await.unwrap();

        assert_eq!(repo.find_vote(post.id, user.id).await.unwrap(), vote);
        assert_eq!(repo.get_post(post.id).await.unwrap().score, -1);
        assert_eq!(repo.ledger_score(post.id).await.unwrap(), -1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_a_conflict() {
        let repo = InMemoryVotesRepository::new();
        let (post, user) = seed(&repo).await;

        let mut tx = repo.begin().await.unwrap();
        repo.insert_vote_tx(&mut tx, post.id, user.id, VoteValue::Up).await.unwrap();
        let err = repo
            .insert_vote_tx(&mut tx, post.id, user.id, VoteValue::Down)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_stale_update_is_a_conflict() {
        let repo = InMemoryVotesRepository::new();
        let (post, user) = seed(&repo).await;

        let mut tx = repo.begin().await.unwrap();
        let vote = repo.insert_vote_tx(&mut tx, post.id, user.id, VoteValue::Up).await.unwrap();
        repo.update_vote_tx(&mut tx, &vote, VoteValue::Down).await.unwrap();

        // `vote` still says Up, the stored row now says Down.
        let err = repo.update_vote_tx(&mut tx, &vote, VoteValue::Down).await.unwrap_err();
        assert!(err.is_conflict());
        let err = repo.delete_vote_tx(&mut tx, &vote).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_vote_requires_existing_post_and_user() {
        let repo = InMemoryVotesRepository::new();
        let (post, _) = seed(&repo).await;

        let mut tx = repo.begin().await.unwrap();
        let err = repo
            .insert_vote_tx(&mut tx, post.id, Uuid::new_v4(), VoteValue::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, VotesRepositoryError::MissingReference(_)));

        let err = repo
            .apply_score_delta_tx(&mut tx, Uuid::new_v4(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, VotesRepositoryError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let repo = InMemoryVotesRepository::new();
        let (post, user) = seed(&repo).await;

        repo.fail_next(StoreOperation::FindVote);
        let err = repo.find_vote(post.id, user.id).await.unwrap_err();
        assert!(matches!(err, VotesRepositoryError::Storage(_)));
        assert!(repo.find_vote(post.id, user.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_views_do_not_touch_score() {
        let repo = InMemoryVotesRepository::new();
        let (post, _) = seed(&repo).await;

        let viewed = repo.increment_views(post.id).await.unwrap();
        assert_eq!(viewed.views, 1);
        assert_eq!(viewed.score, 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_not_a_vote_conflict() {
        let repo = InMemoryVotesRepository::new();
        seed(&repo).await;

        let err = repo
            .create_user(&NewUser { username: "u42".to_string() })
            .await
            .unwrap_err();
        assert!(!err.is_conflict());
        assert!(matches!(err, VotesRepositoryError::Storage(_)));
    }

    #[tokio::test]
    async fn test_get_user() {
        let repo = InMemoryVotesRepository::new();
        let (_, user) = seed(&repo).await;

        assert_eq!(repo.get_user(user.id).await.unwrap(), user);
        let missing = Uuid::new_v4();
        let err = repo.get_user(missing).await.unwrap_err();
        assert!(matches!(err, VotesRepositoryError::UserNotFound(id) if id == missing));
    }
}
