use std::{path::Path, str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use tracing::info;

pub mod models;

/// Pool tuning for [`DBService`]
#[derive(Debug, Clone)]
pub struct DBOptions {
    pub max_connections: u32,
    /// How long a writer waits for SQLite's write lock before giving up with `SQLITE_BUSY`
    pub busy_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for DBOptions {
    fn default() -> Self {
        Self {
            max_connections: 8,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    /// Connect using a `sqlite:` URL and run pending migrations.
    pub async fn new(database_url: &str, options: &DBOptions) -> Result<Self, sqlx::Error> {
        let connect_options = SqliteConnectOptions::from_str(database_url)?;
        Self::connect(connect_options, options).await
    }

    /// Open (or create) the database file at `path` and run pending migrations.
    pub async fn open(path: impl AsRef<Path>, options: &DBOptions) -> Result<Self, sqlx::Error> {
        let connect_options = SqliteConnectOptions::new().filename(path.as_ref());
        Self::connect(connect_options, options).await
    }

    async fn connect(
        connect_options: SqliteConnectOptions,
        options: &DBOptions,
    ) -> Result<Self, sqlx::Error> {
        // WAL lets readers (previews, listings) proceed while a writer holds the lock.
        let connect_options = connect_options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(options.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_with(connect_options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(
            max_connections = options.max_connections,
            "Database ready, migrations applied"
        );

        Ok(Self { pool })
    }
}
