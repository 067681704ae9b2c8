use crate::errors::VotesRepositoryError;

/// A store that can open transactions spanning several writes.
///
/// Ledger and score mutations never open their own transaction; they take a
/// `&mut Self::Transaction` opened by the caller, so one unit of work can
/// cover both the ledger write and the score update.
///
/// Dropping a transaction without calling [`Transactional::commit`] must roll
/// it back. This is what keeps a panic inside the unit of work from leaving a
/// half-applied mutation behind.
#[async_trait::async_trait]
pub trait Transactional: Send + Sync {
    /// Transaction handle passed to the `*_tx` methods.
    type Transaction: Send;

    /// Opens a new transaction.
    async fn begin(&self) -> Result<Self::Transaction, VotesRepositoryError>;

    /// Commits every write made through `tx`.
    async fn commit(&self, tx: Self::Transaction) -> Result<(), VotesRepositoryError>;

    /// Discards every write made through `tx`.
    async fn rollback(&self, tx: Self::Transaction) -> Result<(), VotesRepositoryError>;
}
