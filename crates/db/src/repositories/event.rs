use sqlx::Row;
use uuid::Uuid;

use gather_core::domain::event::{Event, EventDocument, EventId};

use super::{EventRepository, RepositoryError};
use crate::DbPool;

pub struct SqlEventRepository {
    pool: DbPool,
}

impl SqlEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_event(id: String, raw_document: &str) -> Result<Event, RepositoryError> {
    let document: EventDocument = serde_json::from_str(raw_document)
        .map_err(|error| RepositoryError::Decode(format!("event {id}: {error}")))?;
    Ok(Event::from_document(Some(EventId(id)), document))
}

#[async_trait::async_trait]
impl EventRepository for SqlEventRepository {
    async fn insert_event(&self, event: Event) -> Result<EventId, RepositoryError> {
        let id = EventId(Uuid::new_v4().to_string());
        let document = serde_json::to_string(&event.to_document())
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO events (id, team_id, date, time, author, document) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id.0)
        .bind(&event.team_id)
        .bind(&event.date)
        .bind(&event.time)
        .bind(&event.author)
        .bind(&document)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        let row = sqlx::query("SELECT id, document FROM events WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let id: String = row.try_get("id")?;
                let document: String = row.try_get("document")?;
                decode_event(id, &document).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn list_events(
        &self,
        team_id: &str,
        from_date: &str,
    ) -> Result<Vec<Event>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, document FROM events WHERE team_id = ? AND date >= ? ORDER BY date, time",
        )
        .bind(team_id)
        .bind(from_date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let document: String = row.try_get("document")?;
                decode_event(id, &document)
            })
            .collect()
    }

    async fn join_event(&self, id: &EventId, user: &str) -> Result<bool, RepositoryError> {
        // Read-modify-write inside one transaction: the participant check
        // and the document update commit together or not at all.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT document FROM events WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(false);
        };

        let raw: String = row.try_get("document")?;
        let mut event = decode_event(id.0.clone(), &raw)?;
        if event.participants.iter().any(|participant| participant == user) {
            return Ok(false);
        }
        event.participants.push(user.to_owned());

        let updated = serde_json::to_string(&event.to_document())
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        sqlx::query("UPDATE events SET document = ? WHERE id = ?")
            .bind(&updated)
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn leave_event(&self, id: &EventId, user: &str) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT document FROM events WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(false);
        };

        let raw: String = row.try_get("document")?;
        let mut event = decode_event(id.0.clone(), &raw)?;
        let before = event.participants.len();
        event.participants.retain(|participant| participant != user);
        if event.participants.len() == before {
            return Ok(false);
        }

        let updated = serde_json::to_string(&event.to_document())
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        sqlx::query("UPDATE events SET document = ? WHERE id = ?")
            .bind(&updated)
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_event(&self, id: &EventId, author: &str) -> Result<bool, RepositoryError> {
        // Author check and delete are one conditional statement.
        let result = sqlx::query("DELETE FROM events WHERE id = ? AND author = ?")
            .bind(&id.0)
            .bind(author)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
