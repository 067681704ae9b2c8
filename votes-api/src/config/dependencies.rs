use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use votes_engine::{EngineConfig, PostVoting, VotingService};
use votes_repository::PostgresVotesRepository;
use crate::config::Config;
use crate::errors::ApiError;

/// `Dependencies` struct holds the components the HTTP server runs on.
pub struct Dependencies {
    pub pool: sqlx::PgPool,
    pub voting: Arc<dyn PostVoting>,
}

impl Dependencies {
    /// Creates a new `Dependencies` instance.
    ///
    /// Builds the PostgreSQL pool, prepares the schema and wires the voting
    /// service on top of the repository.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or an
    /// `ApiError` if any dependency fails to initialize.
    pub async fn new(config: &Config) -> Result<Self, ApiError> {
        let connect_options = PgConnectOptions::from_str(&config.database_url)?.options([(
            "statement_timeout",
            config.db_statement_timeout_ms.to_string(),
        )]);

        info!(
            max_connections = config.db_max_connections,
            acquire_timeout_secs = config.db_acquire_timeout_secs,
            statement_timeout_ms = config.db_statement_timeout_ms,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect_with(connect_options)
            .await?;

        let repository = PostgresVotesRepository::new(pool.clone()).await?;
        if config.run_migrations {
            repository.run_migrations().await?;
            info!("Migrations applied");
        } else if !repository.check_tables_created().await? {
            warn!("Vote tables are missing and RUN_MIGRATIONS is disabled");
            return Err(ApiError::Config(
                "database schema is missing; enable RUN_MIGRATIONS or migrate manually".to_string(),
            ));
        }

        let engine_config = EngineConfig {
            max_attempts: config.vote_max_attempts,
        };
        let voting: Arc<dyn PostVoting> =
            Arc::new(VotingService::new(Arc::new(repository), engine_config));

        Ok(Dependencies { pool, voting })
    }
}
