use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use gather_core::config::{AppConfig, ConfigError};
use gather_db::{connect, migrations, DbPool, SqlEventRepository, SqlWorkspaceRepository};
use gather_places::{GooglePlacesClient, PlaceError};
use gather_slack::socket::{NoopSocketTransport, ReconnectPolicy, SocketModeRunner};
use gather_slack::SlackApiClient;

use crate::service::LifecycleService;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runner: SocketModeRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("place search client failed to build: {0}")]
    Places(#[source] PlaceError),
}

pub async fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let repository = Arc::new(SqlEventRepository::new(db_pool.clone()));
    let workspaces = Arc::new(SqlWorkspaceRepository::new(db_pool.clone()));
    let places = Arc::new(GooglePlacesClient::new(&config.places).map_err(BootstrapError::Places)?);
    let chat = SlackApiClient::new(config.slack.bot_token.clone());

    let service = Arc::new(LifecycleService::new(&config, repository, workspaces, places, chat));
    let runner = SocketModeRunner::new(
        Arc::new(NoopSocketTransport),
        service,
        ReconnectPolicy::default(),
    );

    Ok(Application { config, db_pool, runner })
}

#[cfg(test)]
mod tests {
    use gather_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use super::bootstrap;

    fn memory_config() -> AppConfig {
        AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:?cache=shared".to_owned()),
                slack_app_token: Some("xapp-test".to_owned()),
                slack_bot_token: Some("xoxb-test".to_owned()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("config")
    }

    #[tokio::test]
    async fn bootstrap_connects_and_applies_migrations() {
        let app = bootstrap(memory_config()).await.expect("bootstrap");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('events', 'workspaces')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("table lookup");
        assert_eq!(table_count, 2, "bootstrap should create the event and workspace tables");

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_fails_with_an_unreachable_database() {
        let mut config = memory_config();
        config.database.url = "sqlite:///nonexistent/path/events.db".to_owned();
        config.database.timeout_secs = 1;

        let result = bootstrap(config).await;
        assert!(result.is_err());
    }
}
