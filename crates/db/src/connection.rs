//! Pool construction. Sizing and timeouts come from the database section of
//! the application config; sqlite-level behavior (WAL, foreign keys, busy
//! handling) is fixed here because the repositories depend on it.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use gather_core::config::DatabaseConfig;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbPool = sqlx::SqlitePool;

pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_with(options)
        .await
}

#[cfg(test)]
mod tests {
    use gather_core::config::DatabaseConfig;

    use super::connect;

    #[tokio::test]
    async fn connect_applies_the_config_and_pragmas() {
        let pool = connect(&DatabaseConfig {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
            timeout_secs: 5,
        })
        .await
        .expect("pool");

        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("pragma");
        assert_eq!(foreign_keys, 1);
        assert_eq!(pool.options().get_max_connections(), 1);

        pool.close().await;
    }

    #[tokio::test]
    async fn connect_rejects_a_malformed_url() {
        let result = connect(&DatabaseConfig {
            url: "postgres://not-sqlite".to_owned(),
            max_connections: 1,
            timeout_secs: 1,
        })
        .await;

        assert!(result.is_err());
    }
}
