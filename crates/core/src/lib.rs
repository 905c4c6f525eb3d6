//! Core domain types and shared utilities for gatherbot.
//!
//! Everything here is free of I/O: event and place records, workspace
//! credentials, calendar helpers and the application configuration. The
//! integration crates (`gather-db`, `gather-places`, `gather-slack`) build
//! on these types.

pub mod config;
pub mod dates;
pub mod domain;
pub mod errors;

pub use domain::event::{Event, EventDocument, EventId};
pub use domain::place::{PlaceRecord, PlaceSummary};
pub use domain::workspace::WorkspaceCredential;
pub use errors::DomainError;
