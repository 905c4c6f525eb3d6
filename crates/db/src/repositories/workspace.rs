use sqlx::Row;

use gather_core::domain::workspace::WorkspaceCredential;

use super::{RepositoryError, WorkspaceRepository};
use crate::DbPool;

pub struct SqlWorkspaceRepository {
    pool: DbPool,
}

impl SqlWorkspaceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Upserts the credentials recorded when a workspace installs the app.
    pub async fn install(&self, credential: &WorkspaceCredential) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO workspaces (team_id, bot_token, app_id) VALUES (?, ?, ?) \
             ON CONFLICT (team_id) DO UPDATE SET bot_token = excluded.bot_token, app_id = excluded.app_id",
        )
        .bind(&credential.team_id)
        .bind(&credential.bot_token)
        .bind(&credential.app_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl WorkspaceRepository for SqlWorkspaceRepository {
    async fn get_workspace(
        &self,
        team_id: &str,
    ) -> Result<Option<WorkspaceCredential>, RepositoryError> {
        let row = sqlx::query("SELECT team_id, bot_token, app_id FROM workspaces WHERE team_id = ?")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(row) => Some(WorkspaceCredential {
                team_id: row.try_get("team_id")?,
                bot_token: row.try_get("bot_token")?,
                app_id: row.try_get("app_id")?,
            }),
            None => None,
        })
    }
}
