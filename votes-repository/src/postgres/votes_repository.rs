//! PostgreSQL implementation of the votes repository.
//!
//! Provides the vote ledger, the post score aggregate and post/user lookups
//! on top of a `sqlx::PgPool`.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - Ledger and score writes share a caller-supplied transaction
//! - Score updates use `score = score + $1`, never read-modify-write
//! - Flips and deletes are conditioned on the value that was read, so a
//!   concurrent writer turns into a `Conflict` instead of a lost update
//!
//! ## Database Tables
//!
//! - `users`: Registered users
//! - `posts`: Posts with the denormalized `score` and `views` counters
//! - `votes`: One row per `(post_id, user_id)` with `value` in {-1, 1}
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;
use votes_shared::types::{NewPost, NewUser, Post, PostId, User, UserId, Vote, VoteValue};
use crate::interfaces::{PostsRepository, ScoreAggregate, Transactional, UsersRepository, VoteLedger};
use crate::postgres::rows::{PostRow, UserRow, VoteRow};
use crate::postgres::MIGRATOR;
use crate::VotesRepositoryError;

const VOTE_COLUMNS: &str = "id, post_id, user_id, value, created_at, updated_at";
const POST_COLUMNS: &str =
    "id, author_id, title, category, kind, body, score, views, created_at, updated_at";

/// PostgreSQL implementation of the votes repository.
///
/// Every ledger mutation takes a `sqlx::Transaction` opened through
/// [`Transactional::begin`]. A transaction dropped without commit is rolled
/// back by sqlx.
#[derive(Clone)]
pub struct PostgresVotesRepository {
    pool: sqlx::PgPool,
}

impl PostgresVotesRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with required schema
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresVotesRepository)` - Ready-to-use repository instance
    /// * `Err(VotesRepositoryError)` - Future validation errors (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VotesRepositoryError> {
        Ok(Self { pool })
    }

    /// Applies the embedded migrations.
    pub async fn run_migrations(&self) -> Result<(), VotesRepositoryError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| VotesRepositoryError::Storage(format!("migration failed: {e}")))
    }

    /// Checks if the tables are created in the database.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If every table exists
    /// * `Ok(false)` - If at least one table is missing
    pub async fn check_tables_created(&self) -> Result<bool, VotesRepositoryError> {
        let tables = ["users", "posts", "votes"];
        for table in tables {
            let table_exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
            if !table_exists {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl Transactional for PostgresVotesRepository {
    type Transaction = sqlx::Transaction<'static, sqlx::Postgres>;

    async fn begin(&self) -> Result<Self::Transaction, VotesRepositoryError> {
        Ok(self.pool.begin().await?)
    }

    async fn commit(&self, tx: Self::Transaction) -> Result<(), VotesRepositoryError> {
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&self, tx: Self::Transaction) -> Result<(), VotesRepositoryError> {
        tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl VoteLedger for PostgresVotesRepository {
    /// Keyed lookup on the unique `(post_id, user_id)` pair.
    async fn find_vote(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<Vote, VotesRepositoryError> {
        let row: Option<VoteRow> = sqlx::query_as(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE post_id = $1 AND user_id = $2"
        ))
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(VotesRepositoryError::NotFound { post_id, user_id }),
        }
    }

    /// Inserts a vote within an active transaction.
    ///
    /// A unique violation on `votes_post_user_key` is reported as
    /// `VotesRepositoryError::Conflict`. The transaction is unusable afterwards
    /// and must be rolled back.
    async fn insert_vote_tx(
        &self,
        tx: &mut Self::Transaction,
        post_id: PostId,
        user_id: UserId,
        value: VoteValue,
    ) -> Result<Vote, VotesRepositoryError> {
        let row: VoteRow = sqlx::query_as(&format!(
            "INSERT INTO votes (id, post_id, user_id, value) VALUES ($1, $2, $3, $4) RETURNING {VOTE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .bind(value.as_i16())
        .fetch_one(&mut **tx)
        .await?;

        debug!(vote_id = %row.id, post_id = %post_id, user_id = %user_id, value = row.value, "Inserted vote");
        row.try_into()
    }

    /// Flips a vote within an active transaction.
    ///
    /// The `value = $3` predicate makes the write conditional on the row
    /// still holding what the caller read. Under READ COMMITTED a concurrent
    /// writer blocks this statement until it commits, after which the
    /// predicate is re-evaluated against the new row version.
    async fn update_vote_tx(
        &self,
        tx: &mut Self::Transaction,
        vote: &Vote,
        value: VoteValue,
    ) -> Result<(), VotesRepositoryError> {
        let result = sqlx::query(
            "UPDATE votes SET value = $1, updated_at = now() WHERE id = $2 AND value = $3",
        )
        .bind(value.as_i16())
        .bind(vote.id)
        .bind(vote.value.as_i16())
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(VotesRepositoryError::Conflict(format!(
                "vote {} changed since it was read",
                vote.id
            )));
        }
        Ok(())
    }

    async fn delete_vote_tx(
        &self,
        tx: &mut Self::Transaction,
        vote: &Vote,
    ) -> Result<(), VotesRepositoryError> {
        let result = sqlx::query("DELETE FROM votes WHERE id = $1 AND value = $2")
            .bind(vote.id)
            .bind(vote.value.as_i16())
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(VotesRepositoryError::Conflict(format!(
                "vote {} changed or was removed since it was read",
                vote.id
            )));
        }
        Ok(())
    }

    async fn list_post_votes(&self, post_id: PostId) -> Result<Vec<Vote>, VotesRepositoryError> {
        let rows: Vec<VoteRow> = sqlx::query_as(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE post_id = $1 ORDER BY created_at, id"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Vote::try_from).collect()
    }
}

#[async_trait]
impl ScoreAggregate for PostgresVotesRepository {
    /// Adds `delta` to the post score with a single in-place increment.
    async fn apply_score_delta_tx(
        &self,
        tx: &mut Self::Transaction,
        post_id: PostId,
        delta: i64,
    ) -> Result<(), VotesRepositoryError> {
        let result = sqlx::query("UPDATE posts SET score = score + $1 WHERE id = $2")
            .bind(delta)
            .bind(post_id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(VotesRepositoryError::PostNotFound(post_id));
        }
        Ok(())
    }

    async fn ledger_score(&self, post_id: PostId) -> Result<i64, VotesRepositoryError> {
        let score: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(value), 0)::BIGINT FROM votes WHERE post_id = $1",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(score)
    }
}

#[async_trait]
impl PostsRepository for PostgresVotesRepository {
    async fn create_post(&self, post: &NewPost) -> Result<Post, VotesRepositoryError> {
        let row: PostRow = sqlx::query_as(&format!(
            "INSERT INTO posts (id, author_id, title, category, kind, body) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.category)
        .bind(post.kind.as_i16())
        .bind(&post.body)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get_post(&self, post_id: PostId) -> Result<Post, VotesRepositoryError> {
        let row: Option<PostRow> =
            sqlx::query_as(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
                .bind(post_id)
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or(VotesRepositoryError::PostNotFound(post_id))?
            .try_into()
    }

    async fn increment_views(&self, post_id: PostId) -> Result<Post, VotesRepositoryError> {
        let row: Option<PostRow> = sqlx::query_as(&format!(
            "UPDATE posts SET views = views + 1 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(VotesRepositoryError::PostNotFound(post_id))?
            .try_into()
    }
}

#[async_trait]
impl UsersRepository for PostgresVotesRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User, VotesRepositoryError> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (id, username) VALUES ($1, $2) RETURNING id, username, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, VotesRepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, created_at FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::from)
            .ok_or(VotesRepositoryError::UserNotFound(user_id))
    }
}
