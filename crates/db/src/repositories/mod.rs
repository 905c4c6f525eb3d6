use async_trait::async_trait;
use thiserror::Error;

use gather_core::domain::event::{Event, EventId};
use gather_core::domain::workspace::WorkspaceCredential;

pub mod event;
pub mod memory;
pub mod workspace;

pub use event::SqlEventRepository;
pub use memory::{InMemoryEventRepository, InMemoryWorkspaceRepository};
pub use workspace::SqlWorkspaceRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Persistence capability for events.
///
/// The mutation methods carry the atomicity contract the handler relies on:
/// `join_event` adds a participant iff not already present, `leave_event`
/// removes iff present, and `delete_event` deletes iff the stored author
/// matches — each as a single conditional update, so concurrent clicks on
/// the same event cannot double-join or race an authorization check.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persists a new event and returns the generated identity.
    async fn insert_event(&self, event: Event) -> Result<EventId, RepositoryError>;

    async fn get_event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError>;

    /// Events for a team with `date >= from_date` (inclusive), ordered by
    /// date then time.
    async fn list_events(
        &self,
        team_id: &str,
        from_date: &str,
    ) -> Result<Vec<Event>, RepositoryError>;

    async fn join_event(&self, id: &EventId, user: &str) -> Result<bool, RepositoryError>;

    async fn leave_event(&self, id: &EventId, user: &str) -> Result<bool, RepositoryError>;

    async fn delete_event(&self, id: &EventId, author: &str) -> Result<bool, RepositoryError>;
}

/// Read-only lookup of per-workspace installation credentials.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn get_workspace(
        &self,
        team_id: &str,
    ) -> Result<Option<WorkspaceCredential>, RepositoryError>;
}
