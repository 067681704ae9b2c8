use tracing::{info, instrument};
use votes_repository::{ScoreAggregate, VoteLedger, VotesRepositoryError};
use votes_shared::types::{PostId, UserId, VoteOutcome};
use crate::engine::VoteEngine;
use crate::errors::VoteError;

impl<S> VoteEngine<S>
where
    S: VoteLedger + ScoreAggregate,
{
    /// Removes the vote of `user_id` on `post_id` and takes its contribution
    /// back out of the score.
    ///
    /// # Returns
    ///
    /// * `Ok(VoteOutcome::Removed)` - The vote was deleted
    /// * `Err(VoteError::NotFound)` - The user has no vote on the post
    /// * `Err(VoteError)` - Any other storage failure; nothing was written
    #[instrument(skip(self), fields(post_id = %post_id, user_id = %user_id))]
    pub async fn unvote(&self, post_id: PostId, user_id: UserId) -> Result<VoteOutcome, VoteError> {
        let outcome = self
            .retry_on_conflict(post_id, user_id, || self.try_unvote(post_id, user_id))
            .await?;
        info!(outcome = ?outcome, "Vote removed");
        Ok(outcome)
    }

    async fn try_unvote(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<VoteOutcome, VotesRepositoryError> {
        let vote = self.store.find_vote(post_id, user_id).await?;
        let delta = -vote.value.score();

        let mut tx = self.store.begin().await?;
        let result: Result<_, VotesRepositoryError> = async {
            self.store.delete_vote_tx(&mut tx, &vote).await?;
            self.store.apply_score_delta_tx(&mut tx, post_id, delta).await?;
            Ok(VoteOutcome::Removed {
                value: vote.value,
                delta,
            })
        }
        .await;
        self.finish(tx, result).await
    }
}
