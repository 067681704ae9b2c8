//! Integration tests for the PostgreSQL votes repository implementation.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup. They are ignored by default.
//!
//! Run with: `DATABASE_URL=postgres://... cargo test --test postgres_votes -- --ignored`

use sqlx::Row;
use uuid::Uuid;
use votes_repository::{
    PostgresVotesRepository, PostsRepository, ScoreAggregate, Transactional, UsersRepository,
    VoteLedger, VotesRepositoryError,
};
use votes_shared::types::{NewPost, NewUser, Post, PostKind, User, VoteValue};

/// Creates a user and a post authored by that user.
async fn seed(repository: &PostgresVotesRepository, username: &str) -> (Post, User) {
    let user = repository
        .create_user(&NewUser { username: username.to_string() })
        .await
        .unwrap();
    let post = repository
        .create_post(&NewPost {
            author_id: user.id,
            title: "A link worth sharing".to_string(),
            category: "programming".to_string(),
            kind: PostKind::Link,
            body: "https://example.com".to_string(),
        })
        .await
        .unwrap();
    (post, user)
}

// ============================================================================
// Vote Ledger Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_find_missing_vote_is_not_found(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (post, user) = seed(&repository, "reader").await;

    let err = repository.find_vote(post.id, user.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_insert_and_find_vote(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (post, user) = seed(&repository, "voter").await;

    let mut tx = repository.begin().await.unwrap();
    let inserted = repository
        .insert_vote_tx(&mut tx, post.id, user.id, VoteValue::Up)
        .await
        .unwrap();
    repository.commit(tx).await.unwrap();

    let found = repository.find_vote(post.id, user.id).await.unwrap();
    assert_eq!(found.id, inserted.id);
    assert_eq!(found.value, VoteValue::Up);

    let row = sqlx::query("SELECT value FROM votes WHERE id = $1")
        .bind(inserted.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.get::<i16, _>("value"), 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_duplicate_insert_is_conflict(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (post, user) = seed(&repository, "twice").await;

    let mut tx = repository.begin().await.unwrap();
    repository.insert_vote_tx(&mut tx, post.id, user.id, VoteValue::Up).await.unwrap();
    repository.commit(tx).await.unwrap();

    let mut tx = repository.begin().await.unwrap();
    let err = repository
        .insert_vote_tx(&mut tx, post.id, user.id, VoteValue::Down)
        .await
        .unwrap_err();
    repository.rollback(tx).await.unwrap();
    assert!(err.is_conflict());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_insert_for_missing_user_is_missing_reference(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (post, _) = seed(&repository, "author").await;

    let mut tx = repository.begin().await.unwrap();
    let err = repository
        .insert_vote_tx(&mut tx, post.id, Uuid::new_v4(), VoteValue::Up)
        .await
        .unwrap_err();
    assert!(matches!(err, VotesRepositoryError::MissingReference(_)));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_stale_update_and_delete_are_conflicts(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (post, user) = seed(&repository, "flipper").await;

    let mut tx = repository.begin().await.unwrap();
    let vote = repository
        .insert_vote_tx(&mut tx, post.id, user.id, VoteValue::Up)
        .await
        .unwrap();
    repository.update_vote_tx(&mut tx, &vote, VoteValue::Down).await.unwrap();
    repository.commit(tx).await.unwrap();

    let mut tx = repository.begin().await.unwrap();
    let err = repository.update_vote_tx(&mut tx, &vote, VoteValue::Down).await.unwrap_err();
    assert!(err.is_conflict());
    let err = repository.delete_vote_tx(&mut tx, &vote).await.unwrap_err();
    assert!(err.is_conflict());
    repository.rollback(tx).await.unwrap();

    let current = repository.find_vote(post.id, user.id).await.unwrap();
    let mut tx = repository.begin().await.unwrap();
    repository.delete_vote_tx(&mut tx, &current).await.unwrap();
    repository.commit(tx).await.unwrap();
    assert!(repository.find_vote(post.id, user.id).await.unwrap_err().is_not_found());
}

// ============================================================================
// Score Aggregate Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_score_delta_rolls_back_with_transaction(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (post, user) = seed(&repository, "undecided").await;

    let mut tx = repository.begin().await.unwrap();
    repository.insert_vote_tx(&mut tx, post.id, user.id, VoteValue::Up).await.unwrap();
    repository.apply_score_delta_tx(&mut tx, post.id, 1).await.unwrap();
    repository.rollback(tx).await.unwrap();

    assert_eq!(repository.get_post(post.id).await.unwrap().score, 0);
    assert!(repository.find_vote(post.id, user.id).await.unwrap_err().is_not_found());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_score_delta_on_missing_post(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();

    let mut tx = repository.begin().await.unwrap();
    let err = repository
        .apply_score_delta_tx(&mut tx, Uuid::new_v4(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, VotesRepositoryError::PostNotFound(_)));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_ledger_score_matches_votes(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (post, author) = seed(&repository, "author").await;
    let other = repository
        .create_user(&NewUser { username: "other".to_string() })
        .await
        .unwrap();

    assert_eq!(repository.ledger_score(post.id).await.unwrap(), 0);

    let mut tx = repository.begin().await.unwrap();
    repository.insert_vote_tx(&mut tx, post.id, author.id, VoteValue::Up).await.unwrap();
    repository.insert_vote_tx(&mut tx, post.id, other.id, VoteValue::Down).await.unwrap();
    repository.commit(tx).await.unwrap();

    assert_eq!(repository.ledger_score(post.id).await.unwrap(), 0);
    assert_eq!(repository.list_post_votes(post.id).await.unwrap().len(), 2);
}

// ============================================================================
// Posts Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_increment_views(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (post, _) = seed(&repository, "viewer").await;

    repository.increment_views(post.id).await.unwrap();
    let viewed = repository.increment_views(post.id).await.unwrap();
    assert_eq!(viewed.views, 2);
    assert_eq!(viewed.score, 0);
}

// ============================================================================
// Users Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_get_user(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let (_, user) = seed(&repository, "lookup").await;

    assert_eq!(repository.get_user(user.id).await.unwrap().username, "lookup");
    let err = repository.get_user(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, VotesRepositoryError::UserNotFound(_)));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_duplicate_username_is_not_a_vote_conflict(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    seed(&repository, "taken").await;

    let err = repository
        .create_user(&NewUser { username: "taken".to_string() })
        .await
        .unwrap_err();
    assert!(!err.is_conflict());
    assert!(matches!(err, VotesRepositoryError::DatabaseError(_)));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_tables_created(pool: sqlx::PgPool) {
    let repository = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    assert!(repository.check_tables_created().await.unwrap());
}
