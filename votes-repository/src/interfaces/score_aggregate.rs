use votes_shared::types::PostId;
use crate::errors::VotesRepositoryError;
use crate::interfaces::Transactional;

/// Access to the denormalized `score` counter of a post.
#[async_trait::async_trait]
pub trait ScoreAggregate: Transactional {
    /// Adds `delta` to the score of `post_id` within `tx`.
    ///
    /// Implementations must use an in-store increment so that concurrent
    /// deltas on the same post compose instead of overwriting each other.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The delta was applied
    /// * `Err(VotesRepositoryError::PostNotFound)` - No such post
    async fn apply_score_delta_tx(
        &self,
        tx: &mut Self::Transaction,
        post_id: PostId,
        delta: i64,
    ) -> Result<(), VotesRepositoryError>;

    /// Recomputes the score of `post_id` from the vote ledger.
    ///
    /// Returns 0 for a post without votes. Used to audit the denormalized
    /// counter against the ledger.
    async fn ledger_score(&self, post_id: PostId) -> Result<i64, VotesRepositoryError>;
}
