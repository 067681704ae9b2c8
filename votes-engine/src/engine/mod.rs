//! This module defines the `VoteEngine`, which applies vote and unvote
//! operations to the ledger and the post score in a single transaction.
//!
//! The read-then-write race on a `(post, user)` pair is handled
//! optimistically. The lookup happens outside the transaction; the writes
//! inside it are conditional (unique key on insert, value predicate on
//! update/delete). A lost race surfaces as `VotesRepositoryError::Conflict`,
//! the transaction is rolled back and the whole operation starts over from
//! the lookup.
mod reconcile;
mod unvote;

pub use reconcile::{VotePlan, plan_vote};

use std::future::Future;
use std::sync::Arc;
use tracing::warn;
use votes_repository::{ScoreAggregate, Transactional, VoteLedger, VotesRepositoryError};
use votes_shared::types::{PostId, UserId};
use crate::errors::VoteError;

/// Default number of attempts before a conflicting operation gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Tuning knobs for [`VoteEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Attempts per operation, including the first one. Values below 1 are
    /// treated as 1.
    pub max_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Applies votes and unvotes while keeping `Post.score` equal to the sum of
/// the post's live votes.
///
/// The engine holds no state of its own between calls; everything durable
/// lives in the store.
pub struct VoteEngine<S> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S> Clone for VoteEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
        }
    }
}

impl<S> VoteEngine<S>
where
    S: VoteLedger + ScoreAggregate,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Runs `attempt` until it returns something other than a conflict, or
    /// the attempt budget is spent.
    async fn retry_on_conflict<T, F, Fut>(
        &self,
        post_id: PostId,
        user_id: UserId,
        mut attempt: F,
    ) -> Result<T, VoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, VotesRepositoryError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        for attempt_number in 1..=max_attempts {
            match attempt().await {
                Err(VotesRepositoryError::Conflict(reason)) => {
                    warn!(
                        post_id = %post_id,
                        user_id = %user_id,
                        attempt = attempt_number,
                        reason = %reason,
                        "Concurrent vote write detected, retrying"
                    );
                }
                other => return other.map_err(VoteError::from),
            }
        }
        Err(VoteError::Contended {
            post_id,
            user_id,
            attempts: max_attempts,
        })
    }

    /// Commits `tx` if `result` is a success, rolls it back otherwise.
    ///
    /// A rollback failure is logged and the original error is returned; the
    /// store discards the transaction either way.
    async fn finish<T>(
        &self,
        tx: <S as Transactional>::Transaction,
        result: Result<T, VotesRepositoryError>,
    ) -> Result<T, VotesRepositoryError> {
        match result {
            Ok(value) => {
                self.store.commit(tx).await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_error) = self.store.rollback(tx).await {
                    warn!(error = %rollback_error, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}
