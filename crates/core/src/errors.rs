use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid calendar date: `{value}` (expected YYYY-MM-DD)")]
    InvalidDate { value: String },
}
