pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use repositories::{
    EventRepository, InMemoryEventRepository, InMemoryWorkspaceRepository, RepositoryError,
    SqlEventRepository, SqlWorkspaceRepository, WorkspaceRepository,
};
