pub mod event;
pub mod place;
pub mod workspace;
