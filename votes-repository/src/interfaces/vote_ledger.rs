//! This module defines the `VoteLedger` trait, the interface to the durable
//! record of individual votes. There is at most one entry per `(post, user)`.
use votes_shared::types::{PostId, UserId, Vote, VoteValue};
use crate::errors::VotesRepositoryError;
use crate::interfaces::Transactional;

/// A trait that defines the interface for interacting with the vote ledger.
///
/// Implementors provide a keyed point lookup and identity-based mutations.
/// Mutations run inside a transaction supplied by the caller.
#[async_trait::async_trait]
pub trait VoteLedger: Transactional {
    /// Looks up the vote cast by `user_id` on `post_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vote)` - The live ledger entry
    /// * `Err(VotesRepositoryError::NotFound)` - The user has not voted on the post
    /// * `Err(VotesRepositoryError)` - Any other storage failure
    async fn find_vote(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<Vote, VotesRepositoryError>;

    /// Inserts a new ledger entry within `tx`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vote)` - The stored entry with its assigned identifier
    /// * `Err(VotesRepositoryError::Conflict)` - An entry for the pair already exists
    /// * `Err(VotesRepositoryError::MissingReference)` - The post or user does not exist
    async fn insert_vote_tx(
        &self,
        tx: &mut Self::Transaction,
        post_id: PostId,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<Vote, VotesRepositoryError>;

    /// Changes the value of `vote` to `value` within `tx`.
    ///
    /// The write only applies while the stored entry still holds `vote.value`.
    /// If it was changed or removed since it was read, nothing is written and
    /// `VotesRepositoryError::Conflict` is returned.
    async fn update_vote_tx(
        &self,
        tx: &mut Self::Transaction,
        vote: &Vote,
        value: VoteValue,
    ) -> Result<(), VotesRepositoryError>;

    /// Deletes `vote` within `tx`.
    ///
    /// Same conditional contract as [`VoteLedger::update_vote_tx`]: a stale
    /// `vote` yields `VotesRepositoryError::Conflict`.
    async fn delete_vote_tx(
        &self,
        tx: &mut Self::Transaction,
        vote: &Vote,
    ) -> Result<(), VotesRepositoryError>;

    /// Lists the live votes of a post, oldest first.
    async fn list_post_votes(&self, post_id: PostId) -> Result<Vec<Vote>, VotesRepositoryError>;
}
