//! Reconciliation of a requested vote with the ledger.
//!
//! Turns a `vote(post, user, value)` request into the single ledger write
//! (if any) and the exact score delta that make the ledger match the request.
use tracing::{debug, info, instrument};
use votes_repository::{ScoreAggregate, VoteLedger, VotesRepositoryError};
use votes_shared::types::{PostId, UserId, Vote, VoteOutcome, VoteValue};
use crate::engine::VoteEngine;
use crate::errors::VoteError;

/// The write needed to bring the ledger in line with a requested vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VotePlan {
    /// No entry yet: insert one and add `delta` to the score.
    Create { value: VoteValue, delta: i64 },
    /// The entry already holds the requested value.
    Keep { value: VoteValue },
    /// The entry holds the opposite value: flip it to `to` and add `delta`,
    /// which removes the old contribution and adds the new one in one step.
    Flip { vote: Vote, to: VoteValue, delta: i64 },
}

/// Decides how to apply `requested` given the current ledger entry.
///
/// # Arguments
///
/// * `existing` - The stored vote for the `(post, user)` pair, if any
/// * `requested` - The direction the user asked for
///
/// # Returns
///
/// The `VotePlan` with the exact score delta to apply.
pub fn plan_vote(existing: Option<Vote>, requested: VoteValue) -> VotePlan {
    match existing {
        None => VotePlan::Create {
            value: requested,
            delta: requested.score(),
        },
        Some(vote) if vote.value == requested => VotePlan::Keep { value: requested },
        Some(vote) => VotePlan::Flip {
            vote,
            to: requested,
            delta: 2 * requested.score(),
        },
    }
}

impl<S> VoteEngine<S>
where
    S: VoteLedger + ScoreAggregate,
{
    /// Records `value` as the vote of `user_id` on `post_id`.
    ///
    /// Repeating the same vote is a no-op. Changing direction flips the
    /// existing entry. The ledger write and the score delta are committed
    /// together or not at all.
    ///
    /// # Returns
    ///
    /// * `Ok(VoteOutcome)` - What was done and the score delta applied
    /// * `Err(VoteError::Contended)` - Every attempt lost a race
    /// * `Err(VoteError)` - Any other storage failure; nothing was written
    #[instrument(skip(self), fields(post_id = %post_id, user_id = %user_id, value = %value))]
    pub async fn vote(
        &self,
        post_id: PostId,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<VoteOutcome, VoteError> {
        let outcome = self
            .retry_on_conflict(post_id, user_id, || self.try_vote(post_id, user_id, value))
            .await?;
        info!(outcome = ?outcome, "Vote applied");
        Ok(outcome)
    }

    async fn try_vote(
        &self,
        post_id: PostId,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<VoteOutcome, VotesRepositoryError> {
        // A lookup failure other than NotFound aborts before a transaction opens.
        let existing = match self.store.find_vote(post_id, user_id).await {
            Ok(vote) => Some(vote),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        let plan = plan_vote(existing, value);
        debug!(plan = ?plan, "Planned vote");

        match plan {
            VotePlan::Keep { value } => Ok(VoteOutcome::Unchanged { value }),
            VotePlan::Create { value, delta } => {
                let mut tx = self.store.begin().await?;
                let result: Result<_, VotesRepositoryError> = async {
                    self.store.insert_vote_tx(&mut tx, post_id, user_id, value).await?;
                    self.store.apply_score_delta_tx(&mut tx, post_id, delta).await?;
                    Ok(VoteOutcome::Created { value, delta })
                }
                .await;
                self.finish(tx, result).await
            }
            VotePlan::Flip { vote, to, delta } => {
                let mut tx = self.store.begin().await?;
                let result: Result<_, VotesRepositoryError> = async {
                    self.store.update_vote_tx(&mut tx, &vote, to).await?;
                    self.store.apply_score_delta_tx(&mut tx, post_id, delta).await?;
                    Ok(VoteOutcome::Flipped { from: vote.value, to, delta })
                }
                .await;
                self.finish(tx, result).await
            }
        }
    }
}
